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

//! Input router and event loop
//!
//! # States
//!
//! ```text
//!            Enter / n                 conflict
//! Browsing ───────────▶ Editing ───────────────▶ ConflictPrompt
//!    ▲  │                 ▲  │ clean: write          │ y: write
//!    │  │ q (dirty)       │  └─────────▶ Browsing    │ e / n: back to Editing
//!    │  ▼                 └──────────────────────────┘
//! ConfirmExit
//! ```
//!
//! All state lives in `AppState`; the renderer reads it, only the router
//! changes it. Nothing here touches the terminal, so the whole state
//! machine runs in tests from scripted events.

use log::{debug, info, warn};
use std::io;

use crate::core::{
    scroll::move_selection, scroll_window, CommitPlan, EditSession, KeyCombo, Step, Submission,
};
use crate::profiles::{
    keybinds::{timestamp, NEW_BIND_TEMPLATE},
    Profile,
};
use crate::ui::{
    input::{read_event, ByteSource, Event, Key, MouseEvent, MouseKind},
    line_editor::LineEditor,
    render::{render, Frame, Layout},
    terminal::TerminalSession,
};

/// Rows assumed for paging before the first frame is drawn
const DEFAULT_VIEWPORT: usize = 10;

/// Lines of a theme fragment loaded for the preview pane
const PREVIEW_LINES: usize = 64;

/// What the event loop does after an event
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Flow {
    Continue,
    Exit(i32),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    Browsing,
    /// Free-form line entry (keybind editor)
    Editing(LineEditor),
    /// Waiting for y / e / n after a keybind conflict
    ConflictPrompt,
    /// Quit requested with unsaved changes
    ConfirmExit,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Status {
    pub text: String,
    pub error: bool,
}

/// Transient view state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewState {
    pub selected: usize,
    pub offset: usize,
    pub active_tab: usize,
    /// In-memory values differ from what was last written
    pub dirty: bool,
    /// Preview pane contents; `None` when the pane is closed
    pub preview: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct AppState {
    pub profile: Profile,
    pub view: ViewState,
    pub mode: Mode,
    pub status: Option<Status>,
    /// Keybind edit in progress, including stashed edits
    pub session: Option<EditSession>,
    /// Layout of the last frame drawn, for mouse mapping
    pub layout: Option<Layout>,
}

pub struct App {
    state: AppState,
}

impl App {
    /// Creates the router for a loaded profile
    ///
    /// The theme switcher starts with the active theme selected.
    pub fn new(profile: Profile) -> Self {
        let selected = match &profile {
            Profile::Themes(themes) => themes.active().unwrap_or(0),
            _ => 0,
        };

        Self {
            state: AppState {
                profile,
                view: ViewState {
                    selected,
                    ..ViewState::default()
                },
                mode: Mode::Browsing,
                status: None,
                session: None,
                layout: None,
            },
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Render the current state and remember its layout
    pub fn frame(&mut self, width: u16, height: u16) -> Frame {
        let frame = render(&self.state, width, height);
        self.state.view.selected = frame.layout.window.selected;
        self.state.view.offset = frame.layout.window.offset;
        self.state.layout = Some(frame.layout.clone());
        frame
    }

    /// Render → read one event → dispatch, until an exit
    ///
    /// # Returns
    ///
    /// * `Ok(code)` - Process exit status (0, or 128 + signal number)
    /// * `Err(io::Error)` - Drawing to the terminal failed
    pub fn run<S: ByteSource>(
        &mut self,
        terminal: &mut TerminalSession,
        source: &mut S,
    ) -> io::Result<i32> {
        loop {
            let (width, height) = terminal.size();
            let frame = self.frame(width, height);
            terminal.draw(&frame)?;

            let Some(event) = read_event(source) else {
                info!("input closed");
                return Ok(0);
            };

            if let Flow::Exit(code) = self.handle_event(event) {
                return Ok(code);
            }
        }
    }

    pub fn handle_event(&mut self, event: Event) -> Flow {
        match event {
            Event::Signal(signo) => {
                warn!("exiting on signal {}", signo);
                Flow::Exit(128 + signo)
            }
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => {
                if self.state.mode == Mode::Browsing {
                    self.handle_mouse(mouse);
                }
                Flow::Continue
            }
            Event::None => Flow::Continue,
        }
    }

    fn handle_key(&mut self, key: Key) -> Flow {
        match self.state.mode {
            Mode::Browsing => self.browse_key(key),
            Mode::Editing(_) => {
                self.edit_key(key);
                Flow::Continue
            }
            Mode::ConflictPrompt => {
                self.conflict_key(key);
                Flow::Continue
            }
            Mode::ConfirmExit => self.confirm_key(key),
        }
    }

    // ------------------------------------------------------------------
    // Browsing
    // ------------------------------------------------------------------

    fn browse_key(&mut self, key: Key) -> Flow {
        let page = isize::try_from(self.viewport()).unwrap_or(1);

        match key {
            Key::Up | Key::Char('k') => self.move_by(-1),
            Key::Down | Key::Char('j') => self.move_by(1),
            Key::PageUp => self.move_by(-page),
            Key::PageDown => self.move_by(page),
            Key::Home | Key::Char('g') => self.select(0),
            Key::End | Key::Char('G') => self.select(usize::MAX),
            Key::Left | Key::Char('h') => self.adjust(Step::Backward),
            Key::Right | Key::Char('l') => self.adjust(Step::Forward),
            Key::Tab => self.switch_tab(1),
            Key::BackTab => self.switch_tab(-1),
            Key::Enter | Key::Char(' ') => self.activate(),
            Key::Char('n') => self.start_create(),
            Key::Char('p') => self.toggle_preview(),
            Key::Char('r') => self.reset_tab(),
            Key::Char('s') | Key::Ctrl('s') => {
                self.save();
            }
            Key::Char('q') | Key::Esc | Key::Ctrl('c') => return self.request_quit(),
            _ => {}
        }
        Flow::Continue
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let Some(layout) = self.state.layout.clone() else {
            return;
        };

        match mouse.kind {
            MouseKind::ScrollUp => self.move_by(-1),
            MouseKind::ScrollDown => self.move_by(1),
            MouseKind::Press => {
                if let Some(tab) = layout.tab_at(mouse.col, mouse.row) {
                    self.set_tab(tab);
                } else if let Some(idx) = layout.item_at(mouse.col, mouse.row) {
                    self.select(idx);
                    if mouse.col >= layout.value_col {
                        // Left half of the value steps back, right half forward
                        let threshold = layout.value_col + layout.value_width / 2;
                        let step = if mouse.col < threshold {
                            Step::Backward
                        } else {
                            Step::Forward
                        };
                        self.adjust(step);
                    }
                }
            }
            MouseKind::Drag => {
                if let Some(idx) = layout.item_at(mouse.col, mouse.row) {
                    self.select(idx);
                }
            }
        }
    }

    fn viewport(&self) -> usize {
        self.state
            .layout
            .as_ref()
            .map_or(DEFAULT_VIEWPORT, |l| l.list_rows)
    }

    fn item_count(&self) -> usize {
        self.state
            .profile
            .tabs()
            .get(self.state.view.active_tab)
            .map_or(0, |t| t.len())
    }

    fn select(&mut self, idx: usize) {
        let window = scroll_window(idx, self.item_count(), self.viewport(), self.state.view.offset);
        self.state.view.selected = window.selected;
        self.state.view.offset = window.offset;

        if self.state.view.preview.is_some() {
            self.refresh_preview();
        }
    }

    fn move_by(&mut self, delta: isize) {
        self.select(move_selection(self.state.view.selected, delta));
    }

    fn set_tab(&mut self, tab: usize) {
        if tab == self.state.view.active_tab || tab >= self.state.profile.tabs().len() {
            return;
        }
        self.state.view.active_tab = tab;
        self.state.view.offset = 0;
        self.select(0);
    }

    fn switch_tab(&mut self, direction: isize) {
        let count = self.state.profile.tabs().len();
        if count <= 1 {
            return;
        }
        let current = self.state.view.active_tab;
        let next = if direction < 0 {
            (current + count - 1) % count
        } else {
            (current + 1) % count
        };
        self.set_tab(next);
    }

    fn adjust(&mut self, step: Step) {
        let (tab, row) = (self.state.view.active_tab, self.state.view.selected);
        let Some(tabs) = self.state.profile.tabs_mut() else {
            return;
        };

        if let Some(item) = tabs.get_mut(tab).and_then(|t| t.items.get_mut(row)) {
            if item.adjust(step) {
                debug!("{} -> {:?}", item.label, item.literal());
                self.state.view.dirty = true;
                self.state.status = None;
            }
        }
    }

    fn reset_tab(&mut self) {
        let tab = self.state.view.active_tab;
        let Some(tabs) = self.state.profile.tabs_mut() else {
            return;
        };

        let changed = tabs.get_mut(tab).map_or(0, |t| t.reset_all());
        if changed > 0 {
            self.state.view.dirty = true;
        }
        self.info(format!("Reset {} value(s) to defaults", changed));
    }

    /// Enter / space on the selected row
    fn activate(&mut self) {
        match &self.state.profile {
            Profile::Settings(_) => self.adjust(Step::Forward),
            Profile::Keybinds(_) => self.start_edit(),
            Profile::Themes(_) => self.apply_theme(),
        }
    }

    fn apply_theme(&mut self) {
        let selected = self.state.view.selected;
        let Profile::Themes(themes) = &mut self.state.profile else {
            return;
        };

        match themes.apply(selected).map(|entry| entry.map(|e| e.name.clone())) {
            Ok(Some(name)) => self.info(format!("Applied {}", name)),
            Ok(None) => debug!("no theme at row {}", selected),
            Err(e) => self.error(format!("Could not apply theme: {}", e)),
        }
    }

    fn toggle_preview(&mut self) {
        if !matches!(self.state.profile, Profile::Themes(_)) {
            return;
        }

        if self.state.view.preview.take().is_none() {
            self.refresh_preview();
        }
    }

    fn refresh_preview(&mut self) {
        if let Profile::Themes(themes) = &self.state.profile {
            self.state.view.preview = Some(themes.preview(self.state.view.selected, PREVIEW_LINES));
        }
    }

    /// Write pending settings; returns whether the file is now up to date
    fn save(&mut self) -> bool {
        let result = match &mut self.state.profile {
            Profile::Settings(settings) => settings.save(),
            _ => {
                self.info("Edits are written as soon as they are accepted".to_string());
                return true;
            }
        };

        match result {
            Ok(0) => {
                self.state.view.dirty = false;
                self.info("No changes to write".to_string());
                true
            }
            Ok(count) => {
                self.state.view.dirty = false;
                self.info(format!("Saved {} change(s)", count));
                true
            }
            Err(e) => {
                self.error(format!("Save failed: {}", e));
                false
            }
        }
    }

    fn request_quit(&mut self) -> Flow {
        if !self.state.view.dirty {
            return Flow::Exit(0);
        }
        self.state.mode = Mode::ConfirmExit;
        self.info("Unsaved changes".to_string());
        Flow::Continue
    }

    // ------------------------------------------------------------------
    // Editing (keybinds)
    // ------------------------------------------------------------------

    fn start_edit(&mut self) {
        let (tab, row) = (self.state.view.active_tab, self.state.view.selected);
        let Profile::Keybinds(keybinds) = &self.state.profile else {
            return;
        };

        if let Some((origin, bind)) = keybinds.line_at(tab, row) {
            let seed = bind.to_string();
            self.state.session = Some(EditSession::edit(*origin, bind.clone()));
            self.state.mode = Mode::Editing(LineEditor::new(&seed));
            self.state.status = None;
        }
    }

    fn start_create(&mut self) {
        if !matches!(self.state.profile, Profile::Keybinds(_)) {
            return;
        }
        self.state.session = Some(EditSession::create());
        self.state.mode = Mode::Editing(LineEditor::new(NEW_BIND_TEMPLATE));
        self.state.status = None;
    }

    fn edit_key(&mut self, key: Key) {
        match key {
            Key::Enter => self.submit(),
            Key::Esc | Key::Ctrl('c') => self.cancel_edit(),
            _ => {
                if let Mode::Editing(editor) = &mut self.state.mode {
                    editor.handle(key);
                }
            }
        }
    }

    fn cancel_edit(&mut self) {
        self.state.session = None;
        self.state.mode = Mode::Browsing;
        self.info("Edit cancelled".to_string());
    }

    fn submit(&mut self) {
        let Mode::Editing(editor) = &self.state.mode else {
            return;
        };
        let text = editor.text();

        let (Profile::Keybinds(keybinds), Some(session)) =
            (&self.state.profile, self.state.session.as_mut())
        else {
            return;
        };

        let outcome = session.submit(&text, &keybinds.checker()).map(|submission| {
            let message = match &submission {
                Submission::Conflict(conflict) => {
                    let combo = KeyCombo::from_line(&conflict.bind, &keybinds.config().variables);
                    Some(format!(
                        "{} is already bound at {}: {}",
                        combo, conflict.origin, conflict.bind
                    ))
                }
                Submission::Clean(_) => None,
            };
            (submission, message)
        });

        match outcome {
            Err(e) => self.error(e.to_string()),
            Ok((Submission::Clean(plan), _)) => self.commit(plan),
            Ok((Submission::Conflict(_), message)) => {
                self.state.mode = Mode::ConflictPrompt;
                self.error(message.unwrap_or_default());
            }
        }
    }

    fn commit(&mut self, plan: CommitPlan) {
        let Profile::Keybinds(keybinds) = &mut self.state.profile else {
            return;
        };

        match keybinds.commit(&plan) {
            Ok(()) => {
                self.state.session = None;
                self.state.mode = Mode::Browsing;
                self.info(format!("Saved: {}", plan.accepted));
            }
            Err(e) => {
                // Back to the editor so the line can be retried or abandoned
                self.state.mode = Mode::Editing(LineEditor::new(&plan.accepted.to_string()));
                self.error(format!("Save failed: {}", e));
            }
        }
    }

    fn conflict_key(&mut self, key: Key) {
        let Some(session) = self.state.session.as_mut() else {
            self.state.mode = Mode::Browsing;
            return;
        };

        match key {
            Key::Char('y') | Key::Char('Y') => {
                if let Some(plan) = session.overwrite() {
                    self.commit(plan);
                }
            }
            Key::Char('e') | Key::Char('E') => {
                if let Some(seed) = session.edit_conflict(&timestamp()) {
                    let stacked = session.stack().len();
                    self.state.mode = Mode::Editing(LineEditor::new(&seed));
                    self.info(format!("Editing the conflicting line ({} edit(s) stashed)", stacked));
                }
            }
            Key::Char('n') | Key::Char('N') => {
                if let Some(seed) = session.retry() {
                    self.state.mode = Mode::Editing(LineEditor::new(&seed));
                    self.state.status = None;
                }
            }
            Key::Esc | Key::Ctrl('c') => self.cancel_edit(),
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Exit prompt
    // ------------------------------------------------------------------

    fn confirm_key(&mut self, key: Key) -> Flow {
        match key {
            Key::Char('s') | Key::Char('y') | Key::Ctrl('s') => {
                if self.save() {
                    return Flow::Exit(0);
                }
                self.state.mode = Mode::Browsing;
            }
            Key::Char('d') | Key::Char('n') => return Flow::Exit(0),
            Key::Ctrl('c') => return Flow::Exit(130),
            Key::Esc | Key::Char('c') => {
                self.state.mode = Mode::Browsing;
                self.state.status = None;
            }
            _ => {}
        }
        Flow::Continue
    }

    fn info(&mut self, text: String) {
        self.state.status = Some(Status { text, error: false });
    }

    fn error(&mut self, text: String) {
        self.state.status = Some(Status { text, error: true });
    }
}
