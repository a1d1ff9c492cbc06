// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration write transactions
//!
//! Content is generated into a temporary file in the target's directory
//! and then copied onto the target. The copy rewrites the target in place
//! (open + truncate + write) instead of renaming over it, so symlinks
//! pointing at the target, hard links and the file's mode and owner all
//! survive the save.

use log::{debug, info};
use std::{
    fs::{self, OpenOptions},
    io::{self, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};
use tempfile::{Builder, NamedTempFile};

use crate::config::ConfigError;

/// Single write to a config file
///
/// # Lifecycle
///
/// 1. `begin()` - Creates the temp file next to the target
/// 2. `commit()` - Writes the content to the temp file, then copies it onto
///    the target
/// 3. The temp file is removed when the transaction is dropped, whether
///    the commit succeeded, failed or never happened
///
/// # Example
///
/// ```no_run
/// use hypr_config_tui::config::ConfigTransaction;
/// use std::path::Path;
///
/// let tx = ConfigTransaction::begin(Path::new("/etc/systemd/logind.conf"))?;
/// tx.commit("[Login]\nIdleAction=suspend\n")?;
/// # Ok::<(), hypr_config_tui::config::ConfigError>(())
/// ```
pub struct ConfigTransaction {
    target: PathBuf,
    temp: NamedTempFile,
}

impl ConfigTransaction {
    /// Begins a transaction by creating the temp file.
    ///
    /// The temp file lives in the same directory as the target so both sit
    /// on the same filesystem. Symlinked targets are resolved first, so the
    /// temp file lands next to the real file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the target does not exist and
    /// `ConfigError::TempFileFailed` if the directory is not writable.
    pub fn begin(target: &Path) -> Result<Self, ConfigError> {
        if !target.exists() {
            return Err(ConfigError::NotFound(target.to_path_buf()));
        }

        let resolved = fs::canonicalize(target)?;
        let dir = resolved
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let prefix = format!(
            ".{}.",
            resolved
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "config".to_string())
        );

        let temp = Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|_| ConfigError::TempFileFailed(dir.clone()))?;

        debug!("temp file for {} at {}", target.display(), temp.path().display());

        Ok(Self {
            target: target.to_path_buf(),
            temp,
        })
    }

    /// Path of the temporary file (removed on drop)
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Writes `new_content` and copies it onto the target.
    ///
    /// Consumes the transaction; the temp file is deleted on return.
    ///
    /// # Errors
    ///
    /// Any failure while filling the temp file aborts before the target is
    /// opened, leaving it untouched.
    pub fn commit(mut self, new_content: &str) -> Result<(), ConfigError> {
        self.temp
            .write_all(new_content.as_bytes())
            .and_then(|_| self.temp.flush())
            .map_err(|e| ConfigError::WriteFailed(format!("Failed to write temp file: {}", e)))?;

        let mut source = self.temp.as_file();
        source
            .seek(SeekFrom::Start(0))
            .map_err(|e| ConfigError::WriteFailed(format!("Failed to rewind temp file: {}", e)))?;

        let mut target = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.target)
            .map_err(|_| ConfigError::NotWritable(self.target.clone()))?;

        io::copy(&mut source, &mut target)
            .and_then(|_| target.sync_all())
            .map_err(|e| ConfigError::WriteFailed(format!("Failed to copy onto target: {}", e)))?;

        info!("wrote {} bytes to {}", new_content.len(), self.target.display());
        Ok(())
    }
}

/// Writes `content` to `target` only if it differs from what is on disk
///
/// Returns `true` when a write happened.
pub fn write_if_changed(target: &Path, content: &str) -> Result<bool, ConfigError> {
    let current = fs::read_to_string(target)?;
    if current == content {
        debug!("{} unchanged, skipping write", target.display());
        return Ok(false);
    }

    ConfigTransaction::begin(target)?.commit(content)?;
    Ok(true)
}

/// Checks that a file exists and can be opened for writing
///
/// The file is opened without truncation, so nothing changes on disk.
pub fn ensure_writable(path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    OpenOptions::new()
        .write(true)
        .open(path)
        .map(|_| ())
        .map_err(|_| ConfigError::NotWritable(path.to_path_buf()))
}

/// Reads a file, mapping a missing file to `ConfigError::NotFound`
pub fn read_config(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    fs::read_to_string(path).map_err(|_| ConfigError::NotReadable(path.to_path_buf()))
}
