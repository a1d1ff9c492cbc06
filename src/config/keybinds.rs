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

//! Keybind files on disk
//!
//! The editor works with two files:
//! - **overlay**: the user's override file. All writes go here.
//! - **base**: the original bind file. Read only; edits to its lines are
//!   expressed as `unbind` + new `bind` in the overlay.

use log::info;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::config::{
    transaction::{ensure_writable, read_config},
    ConfigError, ConfigTransaction,
};
use crate::core::{
    conflict::{BindSource, CommitPlan, ConflictChecker},
    parser::{collect_variables, parse_binds, ParsedLine},
};

/// One bind file, read fully into memory
#[derive(Clone, Debug)]
pub struct BindFile {
    pub source: BindSource,
    pub path: PathBuf,
    pub content: String,
    pub lines: Vec<ParsedLine>,
}

impl BindFile {
    pub fn load(source: BindSource, path: &Path) -> Result<Self, ConfigError> {
        let content = read_config(path)?;
        let lines = parse_binds(&content);

        Ok(Self {
            source,
            path: path.to_path_buf(),
            content,
            lines,
        })
    }
}

/// Overlay and base files plus the variables they define
#[derive(Clone, Debug)]
pub struct KeybindConfig {
    pub overlay: BindFile,
    pub base: BindFile,
    pub variables: HashMap<String, String>,
}

impl KeybindConfig {
    /// Loads both files.
    ///
    /// # Errors
    ///
    /// Either file missing or unreadable, or the overlay not writable.
    pub fn load(overlay: &Path, base: &Path) -> Result<Self, ConfigError> {
        ensure_writable(overlay)?;

        let overlay = BindFile::load(BindSource::Overlay, overlay)?;
        let base = BindFile::load(BindSource::Base, base)?;

        // Overlay definitions win, it is sourced last
        let mut variables = collect_variables(&base.content);
        variables.extend(collect_variables(&overlay.content));

        info!(
            "loaded {} overlay and {} base directives",
            overlay.lines.len(),
            base.lines.len()
        );

        Ok(Self {
            overlay,
            base,
            variables,
        })
    }

    pub fn checker(&self) -> ConflictChecker<'_> {
        ConflictChecker::new(&self.overlay.lines, &self.base.lines, &self.variables)
    }

    pub fn file(&self, source: BindSource) -> &BindFile {
        match source {
            BindSource::Overlay => &self.overlay,
            BindSource::Base => &self.base,
        }
    }

    /// Appends an accepted plan to the overlay and reloads both files
    pub fn commit(&mut self, plan: &CommitPlan, stamp: &str) -> Result<(), ConfigError> {
        let new_content = plan.render(&self.overlay.content, stamp);
        ConfigTransaction::begin(&self.overlay.path)?.commit(&new_content)?;

        let overlay = self.overlay.path.clone();
        let base = self.base.path.clone();
        *self = Self::load(&overlay, &base)?;
        Ok(())
    }
}
