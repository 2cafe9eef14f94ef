//! Configuration model for codema.
//!
//! A [`Config`] describes the APIs, microservices and models to generate from, and
//! the targets (template + output path + plugins) to generate. It is loaded once
//! by [`ConfigLoader`] before any rendering and is read-only afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use tracing::debug;

use super::directive::{self, DirectiveValue, Directives};
use super::error::{Error, Result};
use super::registry::ModelRegistry;

/// Primitive field type keywords
pub const PRIMITIVE_TYPES: [&str; 6] = ["ID", "String", "Int", "Float", "Boolean", "DateTime"];

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "codema.yaml";

/// Semantic role of a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagType {
    Owner,
    Parent,
    #[default]
    Unspecified,
}

impl TagType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Parent => "PARENT",
            Self::Unspecified => "UNSPECIFIED",
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named semantic role attachable to a field.
///
/// The default value (empty name) is the "not found" sentinel returned by
/// [`TagRegistry::lookup`](super::registry::TagRegistry::lookup).
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TagDefinition {
    pub name: String,
    #[serde(rename = "type", default)]
    pub tag_type: TagType,
}

impl TagDefinition {
    pub fn new(name: impl Into<String>, tag_type: TagType) -> Self {
        Self {
            name: name.into(),
            tag_type,
        }
    }

    /// True for the registry's "not found" sentinel
    pub fn is_sentinel(&self) -> bool {
        self.name.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub directives: Directives,
    #[serde(default)]
    pub tags: Vec<TagDefinition>,
}

impl FieldDefinition {
    pub fn has_tag(&self, tag_name: &str) -> bool {
        self.tags.iter().any(|t| t.name == tag_name)
    }

    pub fn directive_string(&self, name: &str) -> Option<&str> {
        directive::string_directive(&self.directives, name)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EnumDefinition {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub description: String,
}

/// The default value (empty name) is the model registry's "not found" sentinel.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ModelDefinition {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub enums: Vec<EnumDefinition>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub directives: Directives,
}

impl ModelDefinition {
    pub fn is_sentinel(&self) -> bool {
        self.name.is_empty()
    }

    /// Name of the first field carrying `tag_name`
    pub fn tagged_field(&self, tag_name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.has_tag(tag_name))
    }

    pub fn directive_string(&self, name: &str) -> Option<&str> {
        directive::string_directive(&self.directives, name)
    }

    pub fn directive_list(&self, name: &str) -> &[DirectiveValue] {
        directive::list_directive(&self.directives, name)
    }

    fn has_enum(&self, name: &str) -> bool {
        self.enums.iter().any(|e| e.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub description: String,
}

/// Locations of the snippet files backing one function implementation for one target.
///
/// Paths are relative to the templates root.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetPaths {
    #[serde(default)]
    pub content_path: Option<String>,
    #[serde(default)]
    pub imports_path: Option<String>,
    #[serde(default)]
    pub hooks_directory: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionImplementation {
    pub function: FunctionDefinition,
    #[serde(default)]
    pub target_snippets: BTreeMap<String, SnippetPaths>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicroserviceDefinition {
    pub label: String,
    pub primary_model: ModelDefinition,
    #[serde(default)]
    pub secondary_models: Vec<ModelDefinition>,
    #[serde(default)]
    pub function_implementations: Vec<FunctionImplementation>,
}

impl MicroserviceDefinition {
    /// Primary model followed by secondary models, in declaration order
    pub fn models(&self) -> impl Iterator<Item = &ModelDefinition> {
        std::iter::once(&self.primary_model).chain(self.secondary_models.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ApiDefinition {
    pub label: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub microservices: Vec<MicroserviceDefinition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetOptions {
    /// Unix mode applied to written files; 0 selects the read-only default
    #[serde(default, deserialize_with = "deserialize_file_mode")]
    pub file_mode: u32,
}

/// Binding of a target to one declared API
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetApi {
    pub label: String,
    pub out_path: String,
    #[serde(default, alias = "versionPath")]
    pub version: String,
    #[serde(default)]
    pub skip_labels: Vec<String>,
}

impl TargetApi {
    pub fn skips(&self, microservice_label: &str) -> bool {
        self.skip_labels.iter().any(|l| l == microservice_label)
    }
}

/// A named generation profile
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub label: String,
    #[serde(default)]
    pub template_path: String,
    #[serde(default)]
    pub template_dir: String,
    #[serde(default)]
    pub apis: Vec<TargetApi>,
    #[serde(default)]
    pub each: bool,
    #[serde(default, alias = "defaultVersionPath")]
    pub default_version: String,
    #[serde(default)]
    pub plugins: Vec<String>,
    #[serde(default)]
    pub options: TargetOptions,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub apis: Vec<ApiDefinition>,
    #[serde(default)]
    pub template_dir: String,
    #[serde(default)]
    pub targets: Vec<Target>,
}

impl Config {
    /// Check every field type against primitives, the owning model's enums and the
    /// registered models.
    pub fn validate(&self, models: &ModelRegistry) -> Result<()> {
        for api in &self.apis {
            for ms in &api.microservices {
                for model in ms.models() {
                    for field in &model.fields {
                        if !field_type_resolves(&field.field_type, model, models) {
                            return Err(Error::config(format!(
                                "Field '{}.{}' in microservice '{}' of api '{}' has unresolved type '{}'",
                                model.name, field.name, ms.label, api.label, field.field_type
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// True if `field_type` is a primitive keyword, possibly wrapped in `[...]`
pub fn is_primitive_field_type(field_type: &str) -> bool {
    if PRIMITIVE_TYPES.contains(&field_type) {
        return true;
    }
    match unwrap_array(field_type) {
        Some(inner) => is_primitive_field_type(inner),
        None => false,
    }
}

/// Inner type of an `[T]` array type
pub fn unwrap_array(field_type: &str) -> Option<&str> {
    field_type
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
}

fn field_type_resolves(field_type: &str, owner: &ModelDefinition, models: &ModelRegistry) -> bool {
    if let Some(inner) = unwrap_array(field_type) {
        return field_type_resolves(inner, owner, models);
    }
    PRIMITIVE_TYPES.contains(&field_type)
        || owner.has_enum(field_type)
        || !models.lookup(field_type).is_sentinel()
}

fn deserialize_file_mode<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawMode {
        Int(u32),
        Str(String),
    }

    match RawMode::deserialize(deserializer)? {
        RawMode::Int(mode) => Ok(mode),
        RawMode::Str(s) => {
            let digits = s.trim().trim_start_matches("0o");
            u32::from_str_radix(digits, 8)
                .map_err(|e| serde::de::Error::custom(format!("invalid fileMode '{s}': {e}")))
        }
    }
}

/// Supported config file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            other => Err(Error::config(format!(
                "Unsupported config format '{}' for {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }
}

/// Loads a [`Config`] from a YAML or TOML file
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Config> {
        let format = ConfigFormat::from_path(&self.path)?;
        debug!(path = %self.path.display(), ?format, "Reading config");
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::config(format!(
                "Failed to read config {}: {e}",
                self.path.display()
            ))
        })?;
        Self::parse(&content, format)
    }

    pub fn parse(content: &str, format: ConfigFormat) -> Result<Config> {
        let config = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Toml => toml::from_str(content)?,
        };
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::from_path(DEFAULT_CONFIG_FILE)
    }
}
