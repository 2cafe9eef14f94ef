//! Template version resolution and template file lookup

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::{Target, TargetApi};
use crate::generation::{GenerationError, Result};
use crate::infrastructure::generation::TEMPLATE_EXTENSIONS;

/// The api version wins when non-empty, otherwise the target default
pub fn resolve<'a>(default_version: &'a str, api_version: &'a str) -> &'a str {
    if api_version.is_empty() {
        default_version
    } else {
        api_version
    }
}

/// Locate the template file for a target/api pair.
///
/// Targets with a `templateDir` address `<templates>/<templateDir>/<version>.<ext>`
/// and require a resolvable version. Targets without one fall back to the legacy
/// `templatePath`, and no version is resolved.
pub fn template_path(
    templates_dir: &Path,
    target: &Target,
    target_api: &TargetApi,
) -> Result<PathBuf> {
    if target.template_dir.is_empty() {
        let legacy = under_templates(templates_dir, &target.template_path);
        debug!(target = %target.label, path = %legacy.display(), "Using legacy template path");
        return existing(legacy);
    }

    let version = resolve(&target.default_version, &target_api.version);
    if version.is_empty() {
        return Err(GenerationError::VersionUnresolved {
            target: target.label.clone(),
            api: target_api.label.clone(),
        });
    }

    let base = under_templates(templates_dir, &target.template_dir).join(version);
    for ext in TEMPLATE_EXTENSIONS {
        let candidate = append_extension(&base, ext);
        if candidate.is_file() {
            debug!(
                target = %target.label,
                api = %target_api.label,
                version,
                path = %candidate.display(),
                "Resolved template"
            );
            return Ok(candidate);
        }
    }

    Err(GenerationError::TemplateNotFound {
        path: append_extension(&base, TEMPLATE_EXTENSIONS[0]),
    })
}

/// `v1.2` + `template` is `v1.2.template`, not `v1.template`
fn append_extension(base: &Path, ext: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Join a config-relative path onto the templates root. A leading `/` does not
/// make the path absolute.
pub(crate) fn under_templates(templates_dir: &Path, relative: &str) -> PathBuf {
    templates_dir.join(relative.trim_start_matches('/'))
}

fn existing(path: PathBuf) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(GenerationError::TemplateNotFound { path })
    }
}
