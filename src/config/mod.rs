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

//! Configuration file management with crash-safe writes.
//!
//! This module owns every byte that goes to or comes from disk:
//!
//! - **Transactions**: temp file next to the target, then an in-place copy
//!   so symlinks and hard links keep pointing at the same file
//! - **INI patching**: key/value replacement that leaves comments, sections
//!   and unrelated lines alone
//! - **Keybind files**: overlay + base loading and commit of accepted edits
//! - **Theme registry**: directory scan and `source =` line replacement
//!
//! # Example
//!
//! ```no_run
//! use hypr_config_tui::config::{Change, ConfigTransaction, PatchSet};
//! use std::path::Path;
//!
//! let path = Path::new("/etc/systemd/logind.conf");
//! let content = std::fs::read_to_string(path)?;
//!
//! let mut patch = PatchSet::new();
//! patch.push(Change::new(Some("Login"), "IdleAction", "suspend"));
//!
//! ConfigTransaction::begin(path)?.commit(&patch.apply(&content))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod ini;
pub mod keybinds;
pub mod theme;
pub mod transaction;

pub use error::ConfigError;
pub use ini::{Change, FileCache, PatchSet};
pub use keybinds::{BindFile, KeybindConfig};
pub use theme::ThemeEntry;
pub use transaction::ConfigTransaction;

#[cfg(test)]
mod tests;
