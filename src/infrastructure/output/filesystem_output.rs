//! Filesystem output with a read-only-by-default permission cycle

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::generation::{GenerationError, Result};

/// Mode applied when a target configures none
pub const DEFAULT_FILE_MODE: u32 = 0o444;

const WRITABLE_MODE: u32 = 0o666;

/// Writes generated files.
///
/// Each write makes an existing file writable, truncates it, writes the new
/// content and then applies the final mode, so generated files stay read-only
/// between runs unless the target asks otherwise.
#[derive(Debug, Clone, Copy)]
pub struct FileWriter {
    mode: u32,
}

impl FileWriter {
    /// `file_mode` of 0 selects [`DEFAULT_FILE_MODE`]
    pub fn new(file_mode: u32) -> Self {
        let mode = if file_mode == 0 {
            DEFAULT_FILE_MODE
        } else {
            file_mode
        };
        Self { mode }
    }

    pub fn mode(&self) -> u32 {
        self.mode
    }

    /// Reject a directory at `path` and create its parent directories.
    ///
    /// Creates no file, so it can run before plugins that need the output
    /// directory as their working directory.
    pub fn prepare(&self, path: &Path) -> Result<()> {
        if path.is_dir() {
            return Err(GenerationError::OutputIsDirectory(path.to_path_buf()));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| GenerationError::io(parent, e))?;
        }
        Ok(())
    }

    pub fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.prepare(path)?;

        if path.exists() {
            set_mode(path, WRITABLE_MODE)?;
        }

        fs::write(path, content).map_err(|e| GenerationError::io(path, e))?;
        set_mode(path, self.mode)?;

        debug!(path = %path.display(), mode = %format!("{:o}", self.mode), "Wrote file");
        Ok(())
    }
}

impl Default for FileWriter {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| GenerationError::io(path, e))
}

#[cfg(not(unix))]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    let mut permissions = fs::metadata(path)
        .map_err(|e| GenerationError::io(path, e))?
        .permissions();
    permissions.set_readonly(mode & 0o222 == 0);
    fs::set_permissions(path, permissions).map_err(|e| GenerationError::io(path, e))
}
