//! Output path templates
//!
//! A `TargetApi.outPath` is a Tera template compiled once per target/api pair and
//! executed once per microservice (each mode) or once per API (single mode). The
//! rendered string is then expanded for `~` and environment variables.

use std::path::PathBuf;

use tera::Tera;

use crate::core::utils::expand_path;
use crate::core::{ApiDefinition, MicroserviceDefinition};
use crate::generation::{GenerationError, RenderContext, Result};
use crate::infrastructure::generation::functions;
use crate::infrastructure::generation::template_renderer::tera_message;

const NAME: &str = "out_path";

pub struct PathTemplate {
    raw: String,
    tera: Tera,
}

impl PathTemplate {
    pub fn compile(raw: &str) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        functions::register_tera(&mut tera);
        tera.add_raw_template(NAME, raw)
            .map_err(|e| GenerationError::PathTemplate {
                template: raw.to_string(),
                message: tera_message(&e),
            })?;

        Ok(Self {
            raw: raw.to_string(),
            tera,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Path for one microservice: inputs `Api`, `Microservice`, `Label`
    pub fn execute_microservice(
        &self,
        api: &ApiDefinition,
        ms: &MicroserviceDefinition,
    ) -> Result<PathBuf> {
        self.execute(&RenderContext::for_microservice(api, ms))
    }

    /// Path for a whole API: inputs `Api`, `Label`
    pub fn execute_api(&self, api: &ApiDefinition) -> Result<PathBuf> {
        self.execute(&RenderContext::for_api(api))
    }

    fn execute(&self, context: &RenderContext) -> Result<PathBuf> {
        let error = |message: String| GenerationError::PathTemplate {
            template: self.raw.clone(),
            message,
        };
        let tera_context = context.to_tera_context().map_err(|e| error(e.to_string()))?;
        let rendered = self
            .tera
            .render(NAME, &tera_context)
            .map_err(|e| error(tera_message(&e)))?;
        Ok(expand_path(rendered.trim()))
    }
}
