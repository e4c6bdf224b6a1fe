pub mod models;
pub mod validation;
pub mod navigation;
pub mod errors;

pub use models::*;
pub use validation::*;
pub use navigation::*;
pub use errors::*;
