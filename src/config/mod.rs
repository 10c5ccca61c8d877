//! Configuration module
//!
//! Loading and validation of site descriptions and scroll traces.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
