//! loan-wizard - Terminal Loan Application Library
//!
//! The wizard state machine, its validation rules and guards, local
//! persistence and the HTTP gateway, usable without a terminal.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
