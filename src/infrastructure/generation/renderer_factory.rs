//! Factory for selecting the renderer that matches a template file

use std::path::Path;
use std::sync::Arc;

use crate::generation::TargetRenderer;

use super::{HandlebarsTemplateRenderer, TeraTemplateRenderer};

/// Template suffixes probed, in order, when locating a versioned template
pub const TEMPLATE_EXTENSIONS: [&str; 5] = ["template", "tera", "gotemplate", "hbs", "handlebars"];

/// Select the renderer for a template path by its suffix. Unknown suffixes use Tera.
pub fn select_renderer(template_path: &Path) -> Arc<dyn TargetRenderer> {
    match template_path.extension().and_then(|e| e.to_str()) {
        Some("hbs") | Some("handlebars") => Arc::new(HandlebarsTemplateRenderer::new()),
        _ => Arc::new(TeraTemplateRenderer::new()),
    }
}
