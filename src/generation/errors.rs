//! Error types for the generation domain

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal error categories, for callers that react to the kind rather than the detail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    VersionUnresolved,
    RenderFailure,
    PluginFailure,
    IoFailure,
    Configuration,
    DuplicateKey,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not found",
            Self::VersionUnresolved => "version unresolved",
            Self::RenderFailure => "render failure",
            Self::PluginFailure => "plugin failure",
            Self::IoFailure => "I/O failure",
            Self::Configuration => "configuration",
            Self::DuplicateKey => "duplicate key",
        };
        write!(f, "{s}")
    }
}

/// Errors that abort processing of a target/api pair
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Could not find api: {0}")]
    ApiNotFound(String),

    #[error("Template file not found: {}", path.display())]
    TemplateNotFound { path: PathBuf },

    #[error("Error reading snippet file: {}: {source}", path.display())]
    SnippetNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Failed to render target: {target} for api: {api}. Message: You specified templateDir without specifying a template version! You must specify either Target.defaultVersion or a TargetApi.version"
    )]
    VersionUnresolved { target: String, api: String },

    #[error("Path template error for '{template}': {message}")]
    PathTemplate { template: String, message: String },

    #[error("Render error: {0}")]
    Render(String),

    #[error("Plugin {plugin} failed for {}: {message}", path.display())]
    Plugin {
        plugin: String,
        path: PathBuf,
        message: String,
    },

    #[error("Unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("Output path is a directory: {}", .0.display())]
    OutputIsDirectory(PathBuf),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] crate::core::Error),

    #[error("Failed to render target: {target} for api: {api}: {source}")]
    Target {
        target: String,
        api: String,
        #[source]
        source: Box<GenerationError>,
    },
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ApiNotFound(_) | Self::TemplateNotFound { .. } | Self::SnippetNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::VersionUnresolved { .. } => ErrorKind::VersionUnresolved,
            Self::PathTemplate { .. } | Self::Render(_) => ErrorKind::RenderFailure,
            Self::Plugin { .. } => ErrorKind::PluginFailure,
            Self::UnknownPlugin(_) => ErrorKind::Configuration,
            Self::OutputIsDirectory(_) | Self::Io { .. } => ErrorKind::IoFailure,
            Self::Config(crate::core::Error::DuplicateKey { .. }) => ErrorKind::DuplicateKey,
            Self::Config(_) => ErrorKind::Configuration,
            Self::Target { source, .. } => source.kind(),
        }
    }

    /// Attach the target/api pair being processed
    pub fn for_target_api(self, target: &str, api: &str) -> Self {
        Self::Target {
            target: target.to_string(),
            api: api.to_string(),
            source: Box::new(self),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn plugin(plugin: &str, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Plugin {
            plugin: plugin.to_string(),
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for generation operations
pub type Result<T> = std::result::Result<T, GenerationError>;
