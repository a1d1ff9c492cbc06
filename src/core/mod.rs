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

//! src/core/mod.rs
//!
//! Core logic module
//!
//! This module contains the data structures and algorithms shared by the
//! three editors, including:
//! - Editable items, value kinds and tabs
//! - The scroll window model
//! - Keybind line types and the nom parser
//! - Conflict detection and stacked edit resolution
//!
//! Nothing here touches the terminal or the filesystem, so every rule can
//! be unit tested directly.

pub mod conflict;
pub mod item;
pub mod parser;
pub mod scroll;
pub mod types;

pub use conflict::{
    BindSource, CommitPlan, ConflictChecker, ConflictMatch, EditBlock, EditSession, Origin,
    PendingEditStack, Submission, SubmitError,
};
pub use item::{Item, Step, Tab, Value, ValueKind};
pub use scroll::{scroll_window, ScrollWindow};
pub use types::*;

#[cfg(test)]
mod tests;
