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

//! Keybind editor
//!
//! Two tabs, one per file. Rows are bind lines only; unbinds are generated
//! by the editor and not edited directly.

use chrono::Local;
use std::path::Path;

use crate::config::{ConfigError, KeybindConfig};
use crate::core::{
    BindLine, BindSource, CommitPlan, ConflictChecker, Item, KeyCombo, Origin, Tab, Value,
    ValueKind,
};

/// Seed text for a brand-new bind
pub const NEW_BIND_TEMPLATE: &str = "bindd = ";

/// Timestamp written into generated header comments
pub fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[derive(Clone, Debug)]
pub struct KeybindProfile {
    config: KeybindConfig,
    tabs: Vec<Tab>,
    /// Line each row was built from, parallel to `tabs`
    rows: Vec<Vec<(Origin, BindLine)>>,
}

impl KeybindProfile {
    /// # Errors
    ///
    /// Both files must exist; the overlay must be writable.
    pub fn load(overlay: &Path, base: &Path) -> Result<Self, ConfigError> {
        let config = KeybindConfig::load(overlay, base)?;
        let mut profile = Self {
            config,
            tabs: Vec::new(),
            rows: Vec::new(),
        };
        profile.rebuild();
        Ok(profile)
    }

    fn rebuild(&mut self) {
        self.tabs.clear();
        self.rows.clear();

        for (name, source) in [("Overlay", BindSource::Overlay), ("Source", BindSource::Base)] {
            let mut tab = Tab::new(name);
            let mut rows = Vec::new();

            for parsed in self.config.file(source).lines.iter().filter(|p| !p.bind.is_unbind()) {
                let combo = KeyCombo::from_line(&parsed.bind, &self.config.variables);
                tab.push(
                    Item::new(combo.to_string(), ValueKind::Line)
                        .with_value(Value::Text(parsed.bind.summary())),
                );
                rows.push((
                    Origin {
                        source,
                        line_number: parsed.line_number,
                    },
                    parsed.bind.clone(),
                ));
            }

            self.tabs.push(tab);
            self.rows.push(rows);
        }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn config(&self) -> &KeybindConfig {
        &self.config
    }

    pub fn checker(&self) -> ConflictChecker<'_> {
        self.config.checker()
    }

    /// The line behind a row
    pub fn line_at(&self, tab: usize, row: usize) -> Option<&(Origin, BindLine)> {
        self.rows.get(tab)?.get(row)
    }

    /// Append an accepted edit to the overlay and refresh the rows
    pub fn commit(&mut self, plan: &CommitPlan) -> Result<(), ConfigError> {
        self.config.commit(plan, &timestamp())?;
        self.rebuild();
        Ok(())
    }
}
