//! Infrastructure layer providing external service integrations.
//!
//! This module contains local persistence, the category cache, the HTTP
//! gateway, configuration, logging and the clock.

pub mod persistence;
pub mod cache;
pub mod gateway;
pub mod clock;
pub mod config;
pub mod logging;

pub use persistence::*;
pub use cache::*;
pub use gateway::*;
pub use clock::*;
pub use config::*;
pub use logging::*;
