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

//! `logind.conf` settings editor
//!
//! Every key lives in the `[Login]` section. Values are diffed against the
//! state loaded from disk; only keys the user actually changed are written.

use log::info;
use std::path::{Path, PathBuf};

use crate::config::{
    transaction::{ensure_writable, read_config},
    Change, ConfigError, ConfigTransaction, FileCache, PatchSet,
};
use crate::core::{Item, Tab, Value, ValueKind};

pub const SECTION: &str = "Login";

/// Actions accepted by the `Handle*` and `IdleAction` keys
const ACTIONS: &[&str] = &[
    "ignore",
    "poweroff",
    "reboot",
    "halt",
    "kexec",
    "suspend",
    "hibernate",
    "hybrid-sleep",
    "suspend-then-hibernate",
    "sleep",
    "lock",
    "factory-reset",
];

/// Actions that end the session or wipe the machine
const DESTRUCTIVE: &[&str] = &["poweroff", "reboot", "halt", "kexec", "factory-reset"];

fn action(key: &str, default: &str) -> Item {
    let kind = ValueKind::Cycle {
        options: ACTIONS,
        destructive: DESTRUCTIVE,
    };
    let item = Item::new(key, kind).with_key(key);
    match item.parse_literal(default) {
        Some(value) => item.with_default(value),
        None => item,
    }
}

fn flag(key: &str, default: bool) -> Item {
    Item::new(key, ValueKind::Boolean)
        .with_key(key)
        .with_default(Value::Bool(default))
}

fn number(key: &str, min: i64, max: i64, default: i64) -> Item {
    Item::new(key, ValueKind::IntRange { min, max })
        .with_key(key)
        .with_default(Value::Int(default))
}

/// Tabs and items, in display order, with systemd's defaults
pub fn schema() -> Vec<Tab> {
    let mut power = Tab::new("Power");
    power
        .push(action("HandlePowerKey", "poweroff"))
        .push(action("HandlePowerKeyLongPress", "ignore"))
        .push(action("HandleRebootKey", "reboot"))
        .push(action("HandleRebootKeyLongPress", "poweroff"))
        .push(action("HandleSuspendKey", "suspend"))
        .push(action("HandleHibernateKey", "hibernate"))
        .push(flag("PowerKeyIgnoreInhibited", false))
        .push(flag("SuspendKeyIgnoreInhibited", false))
        .push(flag("HibernateKeyIgnoreInhibited", false));

    let mut lid = Tab::new("Lid");
    lid.push(action("HandleLidSwitch", "suspend"))
        .push(action("HandleLidSwitchExternalPower", "suspend"))
        .push(action("HandleLidSwitchDocked", "ignore"))
        .push(flag("LidSwitchIgnoreInhibited", true))
        .push(number("HoldoffTimeoutSec", 0, 3600, 30));

    let mut idle = Tab::new("Idle");
    idle.push(action("IdleAction", "ignore"))
        .push(number("IdleActionSec", 0, 86_400, 1800))
        .push(number("InhibitDelayMaxSec", 0, 3600, 5))
        .push(number("UserStopDelaySec", 0, 3600, 10));

    let mut session = Tab::new("Session");
    session
        .push(number("NAutoVTs", 0, 63, 6))
        .push(number("ReserveVT", 0, 63, 6))
        .push(flag("KillUserProcesses", false))
        .push(flag("RemoveIPC", true));

    vec![power, lid, idle, session]
}

/// Fill item values from the cache; unknown or absent values stay unset
pub fn load_values(tabs: &mut [Tab], cache: &FileCache) {
    for item in tabs.iter_mut().flat_map(|t| t.items.iter_mut()) {
        item.value = item
            .key
            .as_deref()
            .and_then(|key| cache.get_in(Some(SECTION), key))
            .and_then(|literal| item.parse_literal(literal));
    }
}

/// Settings file plus the editable view of it
#[derive(Clone, Debug)]
pub struct SettingsProfile {
    path: PathBuf,
    content: String,
    cache: FileCache,
    tabs: Vec<Tab>,
    /// Values as loaded, parallel to `tabs`
    baseline: Vec<Vec<Option<Value>>>,
}

impl SettingsProfile {
    /// # Errors
    ///
    /// The file must exist and be writable.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        ensure_writable(path)?;
        let content = read_config(path)?;
        let cache = FileCache::parse(&content);

        let mut tabs = schema();
        load_values(&mut tabs, &cache);
        let baseline = snapshot(&tabs);

        info!("loaded {} settings from {}", cache.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            content,
            cache,
            tabs,
            baseline,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tabs_mut(&mut self) -> &mut [Tab] {
        &mut self.tabs
    }

    /// Keys whose value differs from what was loaded
    pub fn pending(&self) -> PatchSet {
        let mut patch = PatchSet::new();

        for (tab, loaded) in self.tabs.iter().zip(&self.baseline) {
            for (item, before) in tab.items.iter().zip(loaded) {
                if item.value == *before {
                    continue;
                }
                if let (Some(key), Some(literal)) = (&item.key, item.literal()) {
                    patch.push(Change::new(Some(SECTION), key, &literal));
                }
            }
        }

        patch.without_noops(&self.cache)
    }

    /// Write changed keys; returns how many were written
    ///
    /// On failure nothing in memory changes, so a retry writes the same set.
    pub fn save(&mut self) -> Result<usize, ConfigError> {
        let patch = self.pending();
        if patch.is_empty() {
            self.baseline = snapshot(&self.tabs);
            return Ok(0);
        }

        let updated = patch.apply(&self.content);
        ConfigTransaction::begin(&self.path)?.commit(&updated)?;

        self.cache = FileCache::parse(&updated);
        self.content = updated;
        self.baseline = snapshot(&self.tabs);

        info!("saved {} settings to {}", patch.len(), self.path.display());
        Ok(patch.len())
    }
}

fn snapshot(tabs: &[Tab]) -> Vec<Vec<Option<Value>>> {
    tabs.iter()
        .map(|t| t.items.iter().map(|i| i.value.clone()).collect())
        .collect()
}
