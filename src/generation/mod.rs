//! Generation domain module - orchestrates code generation workflow
//!
//! This module implements the target rendering engine: resolving versioned
//! templates, expanding macros and snippets, rendering, running plugins and
//! writing files under a read-only permission discipline.

pub mod context;
pub mod errors;
pub mod orchestrator;
pub mod path_template;
pub mod preprocessor;
pub mod snippets;
pub mod traits;
pub mod version;

pub use context::*;
pub use errors::*;
pub use orchestrator::*;
pub use traits::*;
