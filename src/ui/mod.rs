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

//! Terminal user interface
//!
//! # Architecture
//!
//! - **Model**: profiles and their tabs (in `profiles` and `core`)
//! - **View**: `render`, a pure function from state to a frame
//! - **Controller**: `app`, the input router and event loop
//!
//! # Module Structure
//!
//! ```text
//! ui/
//! ├── mod.rs          // This file - exports
//! ├── app.rs          // Router, state machine, event loop
//! ├── input.rs        // Byte stream → keys, mouse, signals
//! ├── line_editor.rs  // Single-line text entry
//! ├── render.rs       // Frame and hitbox layout
//! ├── style.rs        // Colour roles
//! └── terminal.rs     // Raw mode, alternate screen, input threads
//! ```

pub mod app;
pub mod input;
pub mod line_editor;
pub mod render;
pub mod style;
pub mod terminal;

pub use app::{App, AppState, Flow, Mode};
pub use terminal::{ChannelSource, TerminalSession};

#[cfg(test)]
mod tests;
