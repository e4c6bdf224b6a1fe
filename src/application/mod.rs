//! Application layer managing state and business workflows.
//!
//! This module coordinates between the domain layer and presentation layer,
//! managing the wizard state, step transitions and background network work.

pub mod state;
pub mod jobs;

#[cfg(test)]
pub(crate) mod testing;

pub use state::*;
pub use jobs::*;
