//! Configuration model, registries and shared utilities.
//!
//! Everything in this module is produced before generation begins and is only
//! read afterwards.

pub mod config;
pub mod directive;
pub mod error;
pub mod registry;
pub mod utils;

pub use config::*;
pub use directive::{DirectiveValue, Directives};
pub use error::Error;
pub use registry::{ModelRegistry, Registries, TagRegistry};
