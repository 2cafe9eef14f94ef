//! Function-implementation snippet injection.
//!
//! Templates mark insertion points with comment markers, optionally wrapped in
//! `{{ }}`:
//!
//! - `/* FUNCTION_IMPLEMENTATIONS */` receives each implementation's content
//! - `/* FUNCTION_IMPORTS */` receives each implementation's imports
//! - `/* FUNCTION_IMPLEMENTATIONS hook="name" */` receives the hook file `name`
//!
//! Content is inserted in front of the marker and the marker is kept, so later
//! implementations append after earlier ones. Once every implementation has been
//! applied the markers are removed.

use std::borrow::Cow;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::core::{MicroserviceDefinition, SnippetPaths};
use crate::generation::version::under_templates;
use crate::generation::{GenerationError, Result};

static IMPLEMENTATIONS_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\{\{\s*/\* FUNCTION_IMPLEMENTATIONS \*/\s*\}\}",
        r"|/\* FUNCTION_IMPLEMENTATIONS \*/",
    ))
    .expect("implementations marker pattern is valid")
});

static IMPORTS_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*/\* FUNCTION_IMPORTS \*/\s*\}\}|/\* FUNCTION_IMPORTS \*/")
        .expect("imports marker pattern is valid")
});

static HOOK_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:\{\{\s*)?/\* FUNCTION_IMPLEMENTATIONS\s+hook="(\w+)"\s+\*/(?:\s*\}\})?"#)
        .expect("hook marker pattern is valid")
});

/// Splices snippet files for one target into raw template text
pub struct SnippetInjector<'a> {
    templates_dir: &'a Path,
    target_label: &'a str,
}

impl<'a> SnippetInjector<'a> {
    pub fn new(templates_dir: &'a Path, target_label: &'a str) -> Self {
        Self {
            templates_dir,
            target_label,
        }
    }

    /// Inject every implementation of `ms` that has snippets for this target, then
    /// collapse the remaining markers. With no microservice only the collapse runs.
    pub fn inject(&self, template: &str, ms: Option<&MicroserviceDefinition>) -> Result<String> {
        let mut out = template.to_string();

        for implementation in ms.iter().flat_map(|ms| &ms.function_implementations) {
            let Some(paths) = implementation.target_snippets.get(self.target_label) else {
                continue;
            };
            debug!(
                target = %self.target_label,
                function = %implementation.function.name,
                "Injecting function implementation"
            );
            out = self.apply(&out, paths)?;
        }

        Ok(collapse_markers(&out))
    }

    fn apply(&self, template: &str, paths: &SnippetPaths) -> Result<String> {
        let with_hooks = match non_empty(&paths.hooks_directory) {
            Some(dir) => self.inject_hooks(template, &under_templates(self.templates_dir, dir)),
            None => template.to_string(),
        };

        let content = match non_empty(&paths.content_path) {
            Some(rel) => {
                let path = under_templates(self.templates_dir, rel);
                std::fs::read_to_string(&path)
                    .map_err(|source| GenerationError::SnippetNotFound { path, source })?
            }
            None => String::new(),
        };

        let imports = match non_empty(&paths.imports_path) {
            Some(rel) => read_optional(&under_templates(self.templates_dir, rel)),
            None => String::new(),
        };

        let with_content = insert_before(&IMPLEMENTATIONS_MARKER, &with_hooks, &content);
        Ok(insert_before(&IMPORTS_MARKER, &with_content, &imports).into_owned())
    }

    fn inject_hooks(&self, template: &str, hooks_dir: &Path) -> String {
        HOOK_MARKER
            .replace_all(template, |caps: &Captures<'_>| {
                let hook_path = hooks_dir.join(&caps[1]);
                match std::fs::read_to_string(&hook_path) {
                    Ok(hook) => format!("{hook}{}", &caps[0]),
                    Err(e) => {
                        debug!(path = %hook_path.display(), error = %e, "No hook file");
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Imports are optional; a missing file contributes nothing
fn read_optional(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == IoErrorKind::NotFound => {
            warn!(path = %path.display(), "Imports file not found, continuing without it");
            String::new()
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Failed to read imports file, continuing without it"
            );
            String::new()
        }
    }
}

fn insert_before<'t>(marker: &Regex, template: &'t str, content: &str) -> Cow<'t, str> {
    marker.replace_all(template, |caps: &Captures<'_>| format!("{content}{}", &caps[0]))
}

/// Remove every snippet marker
pub fn collapse_markers(template: &str) -> String {
    let without_hooks = HOOK_MARKER.replace_all(template, "");
    let without_impls = IMPLEMENTATIONS_MARKER.replace_all(&without_hooks, "");
    IMPORTS_MARKER.replace_all(&without_impls, "").into_owned()
}
