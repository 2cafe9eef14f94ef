//! Handlebars-based template renderer implementation

use handlebars::Handlebars;

use crate::generation::{GenerationError, RenderContext, TargetRenderer};

use super::functions;

/// Handlebars renderer with HTML escaping disabled and strict mode on, so a
/// missing variable fails the render. Output is written as rendered.
pub struct HandlebarsTemplateRenderer {
    registry: Handlebars<'static>,
}

impl HandlebarsTemplateRenderer {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);
        functions::register_handlebars(&mut registry);
        Self { registry }
    }
}

impl Default for HandlebarsTemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetRenderer for HandlebarsTemplateRenderer {
    fn engine(&self) -> &'static str {
        "handlebars"
    }

    fn render(&self, template: &str, context: &RenderContext) -> Result<String, GenerationError> {
        self.registry
            .render_template(template, &context.data)
            .map_err(|e| GenerationError::Render(format!("Failed to render template: {e}")))
    }
}
