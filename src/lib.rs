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

//! Hyprland config TUI
//!
//! Terminal editors for the files a Hyprland desktop is built from:
//! keybind overlays, the systemd-logind power settings and the active
//! theme fragment.
//!
//! # Features
//!
//! - **Keybind editor:** Conflict-checked edits written to an overlay file
//!   as `unbind` + `bind` pairs, so the original file is never touched
//! - **Settings editor:** Typed values (booleans, ranges, choices) patched
//!   into INI files without disturbing comments or layout
//! - **Theme switcher:** Rewrites the `source =` line of a theme fragment
//! - **Safe writes:** Temp file next to the target, then an in-place copy
//!   that keeps symlinks, hard links and permissions intact
//! - **Mouse support:** SGR mouse reports for tabs, rows and values
//!
//! # Architecture
//!
//! - **`core`:** Pure logic (bind lines, conflicts, items, scrolling)
//! - **`config`:** File operations (transactions, INI patches, keybind
//!   and theme files)
//! - **`profiles`:** The three editors built on the shared item model
//! - **`ui`:** Terminal session, input decoding, rendering and routing
//!
//! # Examples
//!
//! ## Checking a bind for conflicts
//!
//! ```no_run
//! use hypr_config_tui::config::KeybindConfig;
//! use hypr_config_tui::core::{EditSession, Submission};
//! use std::path::Path;
//!
//! let config = KeybindConfig::load(
//!     Path::new("/tmp/custom/keybinds.conf"),
//!     Path::new("/tmp/hyprland/keybinds.conf"),
//! )?;
//!
//! let mut session = EditSession::create();
//! match session.submit("bind = SUPER, Q, exec, kitty", &config.checker())? {
//!     Submission::Clean(plan) => println!("free: {}", plan.accepted),
//!     Submission::Conflict(found) => println!("taken at {}", found.origin),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Running an editor
//!
//! ```no_run
//! use hypr_config_tui::profiles::{Profile, SettingsProfile};
//! use hypr_config_tui::ui::{terminal, App};
//! use std::path::Path;
//!
//! let profile = SettingsProfile::load(Path::new("/etc/systemd/logind.conf"))?;
//! let mut app = App::new(Profile::Settings(profile));
//!
//! let (mut session, mut input) = terminal::open()?;
//! let code = app.run(&mut session, &mut input)?;
//! drop(session);
//! std::process::exit(code);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod core;
pub mod profiles;
pub mod ui;

// Re-export commonly used types for convenience
pub use core::{BindLine, EditSession, Item, KeyCombo, Tab};
pub use profiles::Profile;
