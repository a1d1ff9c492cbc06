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

//! The three editors built on the shared terminal engine
//!
//! Each profile owns its files and exposes its rows as `Tab`s of `Item`s;
//! the UI only ever sees tabs plus the handful of profile-specific actions
//! dispatched through `Profile`.

pub mod keybinds;
pub mod logind;
pub mod themes;

pub use keybinds::KeybindProfile;
pub use logind::SettingsProfile;
pub use themes::ThemeProfile;

use crate::core::Tab;

#[derive(Clone, Debug)]
pub enum Profile {
    Settings(SettingsProfile),
    Keybinds(KeybindProfile),
    Themes(ThemeProfile),
}

impl Profile {
    pub fn title(&self) -> &'static str {
        match self {
            Profile::Settings(_) => "logind settings",
            Profile::Keybinds(_) => "keybinds",
            Profile::Themes(_) => "themes",
        }
    }

    pub fn tabs(&self) -> &[Tab] {
        match self {
            Profile::Settings(p) => p.tabs(),
            Profile::Keybinds(p) => p.tabs(),
            Profile::Themes(p) => p.tabs(),
        }
    }

    /// Only the settings editor has values adjustable in place
    pub fn tabs_mut(&mut self) -> Option<&mut [Tab]> {
        match self {
            Profile::Settings(p) => Some(p.tabs_mut()),
            _ => None,
        }
    }

    /// Footer help for browsing mode
    pub fn help(&self) -> &'static str {
        match self {
            Profile::Settings(_) => {
                "↑↓ move  ←→ change  Tab section  r reset  s save  q quit"
            }
            Profile::Keybinds(_) => "↑↓ move  Enter edit  n new  Tab file  q quit",
            Profile::Themes(_) => "↑↓ move  Enter apply  p preview  q quit",
        }
    }
}

#[cfg(test)]
mod tests;
