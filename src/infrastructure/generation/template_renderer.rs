//! Tera-based template renderer implementation

use std::error::Error as _;

use tera::Tera;

use crate::generation::{GenerationError, RenderContext, TargetRenderer};

use super::functions;

const TEMPLATE_NAME: &str = "target";

/// Tera-based renderer. Surrounding whitespace is trimmed, keeping a single
/// trailing newline when the rendered output ended with one.
pub struct TeraTemplateRenderer;

impl TeraTemplateRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TeraTemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetRenderer for TeraTemplateRenderer {
    fn engine(&self) -> &'static str {
        "tera"
    }

    fn render(&self, template: &str, context: &RenderContext) -> Result<String, GenerationError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        functions::register_tera(&mut tera);

        tera.add_raw_template(TEMPLATE_NAME, template).map_err(|e| {
            GenerationError::Render(format!("Failed to parse template: {}", tera_message(&e)))
        })?;

        let tera_context = context
            .to_tera_context()
            .map_err(|e| GenerationError::Render(format!("Invalid render context: {e}")))?;

        let rendered = tera.render(TEMPLATE_NAME, &tera_context).map_err(|e| {
            GenerationError::Render(format!("Failed to render template: {}", tera_message(&e)))
        })?;

        Ok(trim_keeping_newline(&rendered))
    }
}

fn trim_keeping_newline(rendered: &str) -> String {
    let trimmed = rendered.trim();
    if !trimmed.is_empty() && rendered.ends_with('\n') {
        format!("{trimmed}\n")
    } else {
        trimmed.to_string()
    }
}

/// Tera nests the useful detail in the source chain
pub(crate) fn tera_message(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::ErrorKind;
    use serde_json::json;

    fn ctx(data: serde_json::Value) -> RenderContext {
        RenderContext { data }
    }

    #[test]
    fn test_tera_renderer_trims_output_keeping_final_newline() {
        let renderer = TeraTemplateRenderer::new();
        let context = ctx(json!({"Api": {"LabelSnake": "billing"}}));

        let out = renderer
            .render("\n\npackage {{ Api.LabelSnake }}\n\n", &context)
            .unwrap();
        assert_eq!(out, "package billing\n");

        let out = renderer.render("  package {{ Api.LabelSnake }}", &context).unwrap();
        assert_eq!(out, "package billing");

        let out = renderer.render("{% if false %}x{% endif %}\n", &context).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_tera_renderer_functions_and_filters() {
        let renderer = TeraTemplateRenderer::new();
        let out = renderer
            .render(
                r#"{{ go_type(type=Type) }} {{ Name | go_field_case }} {{ Type | go_type_with_prefix(prefix="pb.") }}"#,
                &ctx(json!({"Type": "Status", "Name": "ownerId"})),
            )
            .unwrap();
        assert_eq!(out, "Status OwnerID pb.Status");
    }

    #[test]
    fn test_tera_renderer_does_not_escape() {
        let renderer = TeraTemplateRenderer::new();
        let out = renderer
            .render("{{ v }}", &ctx(json!({"v": "a < b && \"c\""})))
            .unwrap();
        assert_eq!(out, "a < b && \"c\"");
    }

    #[test]
    fn test_tera_renderer_parse_failure() {
        let renderer = TeraTemplateRenderer::new();
        let err = renderer.render("{{ unclosed", &ctx(json!({}))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RenderFailure);
    }

    #[test]
    fn test_tera_renderer_add_overflow_is_render_failure() {
        let renderer = TeraTemplateRenderer::new();
        let err = renderer
            .render("{{ add(a=9223372036854775807, b=1) }}", &ctx(json!({})))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RenderFailure);
        assert!(err.to_string().contains("add overflowed"));
    }

    #[test]
    fn test_tera_renderer_missing_variable_fails() {
        let renderer = TeraTemplateRenderer::new();
        let err = renderer.render("{{ Nope.Name }}", &ctx(json!({}))).unwrap_err();
        assert!(err.to_string().contains("Failed to render template"));
    }
}
