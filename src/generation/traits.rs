//! Port interfaces for the generation domain

use std::path::Path;

use crate::generation::{GenerationError, RenderContext};

/// Renders preprocessed template text against a render context
pub trait TargetRenderer: Send + Sync {
    /// Short engine name for logs
    fn engine(&self) -> &'static str;

    fn render(&self, template: &str, context: &RenderContext) -> Result<String, GenerationError>;
}

/// Transforms rendered content before it is written
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the content to write to `path`; an error aborts the write
    fn pre_write_file(&self, path: &Path, content: String) -> Result<String, GenerationError>;
}
