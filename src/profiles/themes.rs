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

//! Theme switcher

use log::info;
use std::path::{Path, PathBuf};

use crate::config::{
    theme::{apply_theme, current_theme, read_preview, scan_themes},
    transaction::{ensure_writable, read_config},
    ConfigError, ThemeEntry,
};
use crate::core::{Item, Tab, Value, ValueKind};

#[derive(Clone, Debug)]
pub struct ThemeProfile {
    root: PathBuf,
    target: PathBuf,
    entries: Vec<ThemeEntry>,
    active: Option<usize>,
    tabs: Vec<Tab>,
}

impl ThemeProfile {
    /// # Errors
    ///
    /// The registry must be a directory and the target a writable file.
    /// An empty registry is not an error.
    pub fn load(root: &Path, target: &Path) -> Result<Self, ConfigError> {
        ensure_writable(target)?;
        let entries = scan_themes(root)?;
        let active = current_theme(&read_config(target)?, root, &entries);

        info!("{} themes, active: {:?}", entries.len(), active);

        let mut profile = Self {
            root: root.to_path_buf(),
            target: target.to_path_buf(),
            entries,
            active,
            tabs: Vec::new(),
        };
        profile.rebuild();
        Ok(profile)
    }

    fn rebuild(&mut self) {
        let mut tab = Tab::new("Themes");
        for (idx, entry) in self.entries.iter().enumerate() {
            let mut item = Item::new(entry.name.clone(), ValueKind::Line)
                .with_value(Value::Text(entry.group.clone()));
            item.marked = self.active == Some(idx);
            tab.push(item);
        }
        self.tabs = vec![tab];
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn entries(&self) -> &[ThemeEntry] {
        &self.entries
    }

    /// Index of the theme currently sourced by the target
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Point the target at theme `idx`
    ///
    /// Returns the theme applied, or `None` when `idx` is out of range
    /// (including any index into an empty registry).
    pub fn apply(&mut self, idx: usize) -> Result<Option<&ThemeEntry>, ConfigError> {
        let Some(entry) = self.entries.get(idx) else {
            return Ok(None);
        };

        apply_theme(&self.target, &self.root, entry)?;
        self.active = Some(idx);
        self.rebuild();
        Ok(self.entries.get(idx))
    }

    pub fn preview(&self, idx: usize, max_lines: usize) -> Vec<String> {
        self.entries
            .get(idx)
            .map(|e| read_preview(&e.fragment, max_lines))
            .unwrap_or_default()
    }
}
