//! Post-render plugin chain
//!
//! Plugins are registered per target label and run in registration order on the
//! rendered content of every file the target writes.

pub mod builtin;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::core::Target;
use crate::generation::{GenerationError, Plugin, Result};

pub use builtin::{CommandPlugin, resolve_builtin};

#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Vec<Arc<dyn Plugin>>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the built-in plugins named by every target.
    ///
    /// An unknown plugin name fails the whole load.
    pub fn from_targets(targets: &[Target]) -> Result<Self> {
        let mut registry = Self::new();
        for target in targets {
            for name in &target.plugins {
                let plugin = resolve_builtin(name)
                    .ok_or_else(|| GenerationError::UnknownPlugin(name.clone()))?;
                registry.register(&target.label, plugin);
            }
        }
        Ok(registry)
    }

    pub fn register(&mut self, target_label: &str, plugin: Arc<dyn Plugin>) {
        debug!(target = %target_label, plugin = %plugin.name(), "Registered plugin");
        self.plugins
            .entry(target_label.to_string())
            .or_default()
            .push(plugin);
    }

    pub fn plugins(&self, target_label: &str) -> &[Arc<dyn Plugin>] {
        self.plugins
            .get(target_label)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Thread `content` through every plugin of the target. The first failure
    /// aborts the chain.
    pub fn run(&self, target_label: &str, path: &Path, content: String) -> Result<String> {
        self.plugins(target_label)
            .iter()
            .try_fold(content, |content, plugin| {
                debug!(plugin = %plugin.name(), path = %path.display(), "Running plugin");
                plugin.pre_write_file(path, content)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::ErrorKind;

    struct Suffix(&'static str);

    impl Plugin for Suffix {
        fn name(&self) -> &str {
            self.0
        }

        fn pre_write_file(&self, _path: &Path, content: String) -> Result<String> {
            Ok(format!("{content}{}", self.0))
        }
    }

    struct Failing;

    impl Plugin for Failing {
        fn name(&self) -> &str {
            "Failing"
        }

        fn pre_write_file(&self, path: &Path, _content: String) -> Result<String> {
            Err(GenerationError::plugin(self.name(), path, "refused"))
        }
    }

    #[test]
    fn test_plugins_run_in_registration_order() {
        let mut registry = PluginRegistry::new();
        registry.register("go", Arc::new(Suffix("-a")));
        registry.register("go", Arc::new(Suffix("-b")));
        registry.register("ts", Arc::new(Suffix("-ts")));

        let out = registry.run("go", Path::new("x.go"), "src".into()).unwrap();
        assert_eq!(out, "src-a-b");
        assert_eq!(registry.run("docs", Path::new("x.md"), "same".into()).unwrap(), "same");
    }

    #[test]
    fn test_failure_stops_chain() {
        let mut registry = PluginRegistry::new();
        registry.register("go", Arc::new(Failing));
        registry.register("go", Arc::new(Suffix("-never")));

        let err = registry.run("go", Path::new("x.go"), "src".into()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PluginFailure);
        assert!(err.to_string().contains("Failing"));
    }

    #[test]
    fn test_from_targets_rejects_unknown_plugin() {
        let targets = vec![Target {
            label: "go".into(),
            plugins: vec!["GoImports".into(), "Prettier".into()],
            ..Default::default()
        }];
        let err = PluginRegistry::from_targets(&targets).err().unwrap();
        assert!(matches!(err, GenerationError::UnknownPlugin(ref name) if name == "Prettier"));
    }

    #[test]
    fn test_from_targets_registers_builtins() {
        let targets = vec![Target {
            label: "go".into(),
            plugins: vec!["GoImports".into(), "GoFmt".into()],
            ..Default::default()
        }];
        let registry = PluginRegistry::from_targets(&targets).unwrap();
        let names: Vec<&str> = registry.plugins("go").iter().map(|p| p.name()).collect();
        assert_eq!(names, ["GoImports", "GoFmt"]);
    }
}
