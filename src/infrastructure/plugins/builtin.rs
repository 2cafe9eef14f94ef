//! Built-in formatter plugins

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::generation::{GenerationError, Plugin, Result};
use crate::infrastructure::shell::{CommandExecutor, ShellCommandExecutor};

/// Plugin that pipes content through an external formatter
pub struct CommandPlugin {
    name: &'static str,
    program: &'static str,
    args: &'static [&'static str],
    executor: Arc<dyn CommandExecutor>,
}

impl CommandPlugin {
    pub fn new(
        name: &'static str,
        program: &'static str,
        args: &'static [&'static str],
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        Self {
            name,
            program,
            args,
            executor,
        }
    }

    pub fn go_imports() -> Self {
        Self::new("GoImports", "goimports", &[], Arc::new(ShellCommandExecutor::new()))
    }

    pub fn go_fmt() -> Self {
        Self::new("GoFmt", "gofmt", &[], Arc::new(ShellCommandExecutor::new()))
    }

    pub fn rust_fmt() -> Self {
        Self::new(
            "RustFmt",
            "rustfmt",
            &["--edition", "2021", "--emit", "stdout"],
            Arc::new(ShellCommandExecutor::new()),
        )
    }
}

/// Built-in plugin registered under `name`, if any
pub fn resolve_builtin(name: &str) -> Option<Arc<dyn Plugin>> {
    let plugin = match name {
        "GoImports" => CommandPlugin::go_imports(),
        "GoFmt" => CommandPlugin::go_fmt(),
        "RustFmt" => CommandPlugin::rust_fmt(),
        _ => return None,
    };
    Some(Arc::new(plugin))
}

impl Plugin for CommandPlugin {
    fn name(&self) -> &str {
        self.name
    }

    fn pre_write_file(&self, path: &Path, content: String) -> Result<String> {
        // runs in the output directory once it exists
        let working_dir = path
            .parent()
            .filter(|dir| dir.is_dir())
            .unwrap_or_else(|| Path::new("."));

        let result = self
            .executor
            .execute(self.program, self.args, &content, working_dir)
            .map_err(|e| GenerationError::plugin(self.name, path, e.to_string()))?;

        if !result.is_success() {
            return Err(GenerationError::plugin(
                self.name,
                path,
                format!(
                    "{} exited with code {}: {}",
                    self.program,
                    result.exit_code,
                    result.stderr.trim()
                ),
            ));
        }

        debug!(plugin = %self.name, path = %path.display(), "Formatted content");
        Ok(result.stdout)
    }
}
