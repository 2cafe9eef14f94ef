//! Generation infrastructure implementations

pub mod functions;
pub mod handlebars_renderer;
pub mod renderer_factory;
pub mod template_renderer;

pub use handlebars_renderer::HandlebarsTemplateRenderer;
pub use renderer_factory::{TEMPLATE_EXTENSIONS, select_renderer};
pub use template_renderer::TeraTemplateRenderer;
