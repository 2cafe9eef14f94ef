//! Command executor for running external formatters
//!
//! Plugins hand rendered content to an external program on stdin and take the
//! program's stdout as the new content.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::generation::GenerationError;

/// Trait for executing an external program
pub trait CommandExecutor: Send + Sync {
    /// Run `program` with `args` in `working_dir`, feeding `stdin` to it
    fn execute(
        &self,
        program: &str,
        args: &[&str],
        stdin: &str,
        working_dir: &Path,
    ) -> Result<CommandResult, GenerationError>;
}

/// Result of command execution
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    /// Check if the command was successful
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Default command executor using std::process
pub struct ShellCommandExecutor;

impl ShellCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ShellCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor for ShellCommandExecutor {
    fn execute(
        &self,
        program: &str,
        args: &[&str],
        stdin: &str,
        working_dir: &Path,
    ) -> Result<CommandResult, GenerationError> {
        let spawn_error = |e: std::io::Error| {
            GenerationError::io(
                working_dir,
                std::io::Error::new(
                    e.kind(),
                    format!("Failed to execute command '{program}': {e}"),
                ),
            )
        };

        let mut child = Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        // stdin is written while stdout is drained
        let writer = child.stdin.take().map(|mut pipe| {
            let input = stdin.to_owned();
            std::thread::spawn(move || pipe.write_all(input.as_bytes()))
        });

        let output = child.wait_with_output().map_err(spawn_error)?;

        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                // exit status reports a child that stopped reading early
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => return Err(spawn_error(e)),
                Err(_) => {
                    return Err(spawn_error(std::io::Error::other("stdin writer panicked")));
                }
            }
        }

        Ok(CommandResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Mock command executor for testing
#[cfg(test)]
pub struct MockCommandExecutor {
    pub results: std::collections::HashMap<String, CommandResult>,
}

#[cfg(test)]
impl MockCommandExecutor {
    pub fn new() -> Self {
        Self {
            results: std::collections::HashMap::new(),
        }
    }

    pub fn with_result(
        mut self,
        program: &str,
        exit_code: i32,
        stdout: &str,
        stderr: &str,
    ) -> Self {
        self.results.insert(
            program.to_string(),
            CommandResult {
                exit_code,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
        );
        self
    }
}

#[cfg(test)]
impl CommandExecutor for MockCommandExecutor {
    fn execute(
        &self,
        program: &str,
        _args: &[&str],
        _stdin: &str,
        working_dir: &Path,
    ) -> Result<CommandResult, GenerationError> {
        self.results.get(program).cloned().ok_or_else(|| {
            GenerationError::io(
                working_dir,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Mock executor has no result for command: {program}"),
                ),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[cfg(unix)]
    #[test]
    fn test_shell_command_executor_pipes_stdin() {
        let executor = ShellCommandExecutor::new();
        let dir = tempdir().unwrap();

        let result = executor.execute("cat", &[], "hello\n", dir.path()).unwrap();

        assert!(result.is_success());
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "hello\n");
        assert!(result.stderr.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_command_executor_failure() {
        let executor = ShellCommandExecutor::new();
        let dir = tempdir().unwrap();

        let result = executor
            .execute("sh", &["-c", "exit 3"], "", dir.path())
            .unwrap();

        assert!(!result.is_success());
        assert_eq!(result.exit_code, 3);
    }

    #[test]
    fn test_shell_command_executor_missing_program() {
        let executor = ShellCommandExecutor::new();
        let dir = tempdir().unwrap();

        let result = executor.execute("codema-no-such-formatter", &[], "", dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_mock_command_executor() {
        let executor = MockCommandExecutor::new()
            .with_result("gofmt", 0, "package main\n", "")
            .with_result("goimports", 2, "", "syntax error");

        let dir = tempdir().unwrap();

        let ok = executor.execute("gofmt", &[], "", dir.path()).unwrap();
        assert!(ok.is_success());
        assert_eq!(ok.stdout, "package main\n");

        let failed = executor.execute("goimports", &[], "", dir.path()).unwrap();
        assert!(!failed.is_success());
        assert_eq!(failed.stderr, "syntax error");
    }
}
