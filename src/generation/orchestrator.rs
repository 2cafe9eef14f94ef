//! Generation orchestration - coordinates the generation workflow
//!
//! [`Generator`] owns the state built once per run (registries, plugins) and walks
//! the selected targets. [`TargetProcessor`] handles a single target and renders
//! one target/api pair at a time:
//!
//! path -> snippets -> macros -> render -> plugins -> write
//!
//! Everything up to and including the plugins happens before the output file is
//! touched; only its parent directory is created ahead of the plugins. The first
//! error aborts the run; files already written stay written.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::{
    ApiDefinition, Config, MicroserviceDefinition, Registries, TagRegistry, Target, TargetApi,
};
use crate::generation::path_template::PathTemplate;
use crate::generation::preprocessor::MacroPreprocessor;
use crate::generation::snippets::SnippetInjector;
use crate::generation::{GenerationError, RenderContext, Result, TargetRenderer, version};
use crate::infrastructure::generation::select_renderer;
use crate::infrastructure::output::FileWriter;
use crate::infrastructure::plugins::PluginRegistry;

/// Which targets a run renders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TargetSelection {
    #[default]
    All,
    Only(Vec<String>),
}

impl TargetSelection {
    /// `*` selects every target, otherwise a comma separated list of labels
    pub fn parse(raw: &str) -> Self {
        if raw.trim() == "*" {
            return Self::All;
        }
        Self::Only(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn includes(&self, label: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(labels) => labels.iter().any(|l| l == label),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::All => "ALL".to_string(),
            Self::Only(labels) => labels.join(", "),
        }
    }
}

/// Outcome of a generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    pub file_count: usize,
    pub rendered_targets: Vec<String>,
    /// Requested labels with no matching target
    pub undefined_targets: Vec<String>,
}

/// Renders every target/api pair of one target
pub struct TargetProcessor<'a> {
    apis: &'a [ApiDefinition],
    target: &'a Target,
    templates_dir: &'a Path,
    plugins: &'a PluginRegistry,
    tags: &'a TagRegistry,
}

/// Template text and renderer resolved once per target/api pair
struct ResolvedTemplate {
    raw: String,
    renderer: Arc<dyn TargetRenderer>,
}

impl<'a> TargetProcessor<'a> {
    pub fn new(
        apis: &'a [ApiDefinition],
        target: &'a Target,
        templates_dir: &'a Path,
        plugins: &'a PluginRegistry,
        tags: &'a TagRegistry,
    ) -> Self {
        Self {
            apis,
            target,
            templates_dir,
            plugins,
            tags,
        }
    }

    /// Render one target/api pair and return the number of files written
    pub fn process_target_api(&self, target_api: &TargetApi) -> Result<usize> {
        let api = self
            .apis
            .iter()
            .find(|a| a.label == target_api.label)
            .ok_or_else(|| GenerationError::ApiNotFound(target_api.label.clone()))?;

        let out_path = PathTemplate::compile(&target_api.out_path)?;
        let template = self.resolve_template(target_api)?;

        if !self.target.each {
            let path = out_path.execute_api(api)?;
            self.render_file(&path, &template, RenderContext::for_api(api), None)?;
            return Ok(1);
        }

        let mut file_count = 0;
        for ms in &api.microservices {
            if target_api.skips(&ms.label) {
                debug!(
                    target = %self.target.label,
                    microservice = %ms.label,
                    "Skipping microservice"
                );
                continue;
            }
            let path = out_path.execute_microservice(api, ms)?;
            self.render_file(&path, &template, RenderContext::for_microservice(api, ms), Some(ms))?;
            file_count += 1;
        }
        Ok(file_count)
    }

    fn resolve_template(&self, target_api: &TargetApi) -> Result<ResolvedTemplate> {
        let path = version::template_path(self.templates_dir, self.target, target_api)?;
        let raw = std::fs::read_to_string(&path).map_err(|e| GenerationError::io(&path, e))?;
        let renderer = select_renderer(&path);
        debug!(
            target = %self.target.label,
            api = %target_api.label,
            template = %path.display(),
            engine = renderer.engine(),
            "Loaded template"
        );
        Ok(ResolvedTemplate { raw, renderer })
    }

    fn render_file(
        &self,
        path: &Path,
        template: &ResolvedTemplate,
        context: RenderContext,
        ms: Option<&MicroserviceDefinition>,
    ) -> Result<()> {
        let injected = SnippetInjector::new(self.templates_dir, &self.target.label)
            .inject(&template.raw, ms)?;
        let expanded = MacroPreprocessor::new(self.tags)
            .preprocess(&injected, ms.map(|m| &m.primary_model));
        let rendered = template.renderer.render(&expanded, &context)?;

        // plugins run in the output directory
        let writer = FileWriter::new(self.target.options.file_mode);
        writer.prepare(path)?;
        let content = self.plugins.run(&self.target.label, path, rendered)?;

        writer.write(path, &content)?;
        debug!(target = %self.target.label, path = %path.display(), "Rendered file");
        Ok(())
    }
}

/// One generation run over a loaded config
pub struct Generator<'a> {
    config: &'a Config,
    templates_dir: PathBuf,
    registries: Registries,
    plugins: PluginRegistry,
}

impl<'a> Generator<'a> {
    /// Build registries, validate field types and resolve every target's plugins
    pub fn new(config: &'a Config, templates_dir: impl Into<PathBuf>) -> Result<Self> {
        let registries = Registries::build(config)?;
        config.validate(&registries.models)?;
        let plugins = PluginRegistry::from_targets(&config.targets)?;

        Ok(Self {
            config,
            templates_dir: templates_dir.into(),
            registries,
            plugins,
        })
    }

    /// Replace the plugin registry, e.g. to register custom plugins
    pub fn with_plugins(mut self, plugins: PluginRegistry) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    pub fn run(&self, selection: &TargetSelection) -> Result<GenerationSummary> {
        info!(targets = %selection.describe(), "Will render target(s)");
        let mut summary = GenerationSummary::default();

        for target in self.config.targets.iter().filter(|t| selection.includes(&t.label)) {
            let processor = TargetProcessor::new(
                &self.config.apis,
                target,
                &self.templates_dir,
                &self.plugins,
                &self.registries.tags,
            );

            let mut target_file_count = 0;
            for target_api in &target.apis {
                info!(target = %target.label, api = %target_api.label, "Rendering target for api");
                let file_count = processor
                    .process_target_api(target_api)
                    .map_err(|e| e.for_target_api(&target.label, &target_api.label))?;
                info!(
                    target = %target.label,
                    api = %target_api.label,
                    file_count,
                    "Rendered target for api"
                );
                target_file_count += file_count;
            }

            info!(
                target = %target.label,
                api_count = target.apis.len(),
                file_count = target_file_count,
                "Rendered target"
            );
            summary.file_count += target_file_count;
            summary.rendered_targets.push(target.label.clone());
        }

        if let TargetSelection::Only(labels) = selection {
            for label in labels {
                if !summary.rendered_targets.contains(label) {
                    warn!(target = %label, "Skipped target because it was not defined");
                    summary.undefined_targets.push(label.clone());
                }
            }
        }

        info!(file_count = summary.file_count, "Rendered files");
        Ok(summary)
    }
}
