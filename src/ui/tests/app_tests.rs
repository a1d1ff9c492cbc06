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

use std::{fs, path::PathBuf};
use tempfile::TempDir;

use crate::core::Value;
use crate::profiles::{KeybindProfile, Profile, SettingsProfile, ThemeProfile};
use crate::ui::{
    app::{App, Flow, Mode},
    input::{Event, Key, MouseEvent, MouseKind},
};

fn settings_app(content: &str) -> (TempDir, App, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("logind.conf");
    fs::write(&path, content).unwrap();
    let profile = SettingsProfile::load(&path).unwrap();
    (temp_dir, App::new(Profile::Settings(profile)), path)
}

fn keybind_app(overlay: &str, base: &str) -> (TempDir, App, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let overlay_path = temp_dir.path().join("custom.conf");
    let base_path = temp_dir.path().join("keybinds.conf");
    fs::write(&overlay_path, overlay).unwrap();
    fs::write(&base_path, base).unwrap();
    let profile = KeybindProfile::load(&overlay_path, &base_path).unwrap();
    (
        temp_dir,
        App::new(Profile::Keybinds(profile)),
        overlay_path,
        base_path,
    )
}

fn themes_app(themes: &[(&str, &str)]) -> (TempDir, App, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("themes");
    fs::create_dir_all(&root).unwrap();
    for (group, name) in themes {
        let dir = root.join(group).join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("theme.conf"), format!("# {}\ngeneral {{\n}}\n", name)).unwrap();
    }
    let target = temp_dir.path().join("theme.conf");
    fs::write(&target, "# theme\n").unwrap();
    let profile = ThemeProfile::load(&root, &target).unwrap();
    (temp_dir, App::new(Profile::Themes(profile)), target)
}

fn press(app: &mut App, key: Key) -> Flow {
    app.handle_event(Event::Key(key))
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, Key::Char(c));
    }
}

/// Replace the editor contents and submit
fn submit_line(app: &mut App, text: &str) {
    press(app, Key::Ctrl('u'));
    type_text(app, text);
    press(app, Key::Enter);
}

fn click(app: &mut App, col: u16, row: u16) {
    app.handle_event(Event::Mouse(MouseEvent {
        kind: MouseKind::Press,
        col,
        row,
    }));
}

fn editor_text(app: &App) -> String {
    match &app.state().mode {
        Mode::Editing(editor) => editor.text(),
        other => panic!("Expected editing mode, got {:?}", other),
    }
}

fn status(app: &App) -> String {
    app.state()
        .status
        .as_ref()
        .map(|s| s.text.clone())
        .unwrap_or_default()
}

// ----------------------------------------------------------------------
// Navigation
// ----------------------------------------------------------------------

#[test]
fn test_selection_clamped_at_both_ends() {
    let (_temp_dir, mut app, _path) = settings_app("[Login]\n");

    press(&mut app, Key::Up);
    assert_eq!(app.state().view.selected, 0);

    press(&mut app, Key::End);
    assert_eq!(app.state().view.selected, 8);

    press(&mut app, Key::Down);
    press(&mut app, Key::Char('j'));
    assert_eq!(app.state().view.selected, 8);

    press(&mut app, Key::Char('g'));
    assert_eq!(app.state().view.selected, 0);
}

#[test]
fn test_selection_always_visible() {
    let (_temp_dir, mut app, _path) = settings_app("[Login]\n");
    app.frame(60, 12);

    let keys = [
        Key::Down,
        Key::Down,
        Key::Down,
        Key::Down,
        Key::PageDown,
        Key::Up,
        Key::PageUp,
        Key::End,
        Key::Up,
        Key::Up,
        Key::Up,
        Key::Home,
    ];

    for key in keys {
        press(&mut app, key);
        let frame = app.frame(60, 12);
        let view = &app.state().view;
        assert!(
            view.selected >= view.offset && view.selected < view.offset + frame.layout.list_rows,
            "Selected {} outside window at offset {} after {:?}",
            view.selected,
            view.offset,
            key
        );
    }
}

#[test]
fn test_tab_switch_wraps_and_resets_selection() {
    let (_temp_dir, mut app, _path) = settings_app("[Login]\n");
    press(&mut app, Key::Down);

    press(&mut app, Key::Tab);
    assert_eq!(app.state().view.active_tab, 1);
    assert_eq!(app.state().view.selected, 0);

    press(&mut app, Key::BackTab);
    press(&mut app, Key::BackTab);
    assert_eq!(app.state().view.active_tab, 3);
}

// ----------------------------------------------------------------------
// Settings
// ----------------------------------------------------------------------

#[test]
fn test_adjust_marks_dirty_and_save_writes() {
    let (_temp_dir, mut app, path) = settings_app("[Login]\n#HandlePowerKey=poweroff\n");

    press(&mut app, Key::Right);
    assert!(app.state().view.dirty);

    press(&mut app, Key::Char('s'));
    assert!(!app.state().view.dirty);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "[Login]\nHandlePowerKey=reboot\n"
    );
    assert!(status(&app).contains("Saved 1"));
}

#[test]
fn test_adjust_and_back_saves_nothing() {
    let (_temp_dir, mut app, path) = settings_app("[Login]\nHandlePowerKey=suspend\n");

    press(&mut app, Key::Right);
    press(&mut app, Key::Left);
    press(&mut app, Key::Ctrl('s'));

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "[Login]\nHandlePowerKey=suspend\n"
    );
    assert!(!app.state().view.dirty);
}

#[test]
fn test_reset_tab_restores_defaults() {
    let (_temp_dir, mut app, path) =
        settings_app("[Login]\nHandlePowerKey=ignore\nHandleSuspendKey=ignore\n");

    press(&mut app, Key::Char('r'));
    assert!(app.state().view.dirty);
    assert_eq!(
        app.state().profile.tabs()[0].items[0].value,
        app.state().profile.tabs()[0].items[0].default
    );

    press(&mut app, Key::Char('s'));
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("HandlePowerKey=poweroff"));
    assert!(written.contains("HandleSuspendKey=suspend"));
}

#[test]
fn test_reset_untouched_tab_stays_clean() {
    let (_temp_dir, mut app, path) = settings_app("[Login]\n");

    press(&mut app, Key::Char('r'));

    assert!(!app.state().view.dirty);
    assert_eq!(press(&mut app, Key::Char('q')), Flow::Exit(0));
    assert_eq!(fs::read_to_string(&path).unwrap(), "[Login]\n");
}

#[test]
fn test_quit_without_changes_exits_immediately() {
    let (_temp_dir, mut app, _path) = settings_app("[Login]\n");
    assert_eq!(press(&mut app, Key::Char('q')), Flow::Exit(0));
}

#[test]
fn test_quit_with_changes_asks_first() {
    let (_temp_dir, mut app, path) = settings_app("[Login]\n");
    press(&mut app, Key::Right);

    assert_eq!(press(&mut app, Key::Char('q')), Flow::Continue);
    assert_eq!(app.state().mode, Mode::ConfirmExit);

    // Esc keeps editing
    assert_eq!(press(&mut app, Key::Esc), Flow::Continue);
    assert_eq!(app.state().mode, Mode::Browsing);

    press(&mut app, Key::Char('q'));
    assert_eq!(press(&mut app, Key::Char('d')), Flow::Exit(0));
    assert_eq!(fs::read_to_string(&path).unwrap(), "[Login]\n", "Discard writes nothing");
}

#[test]
fn test_save_and_quit_from_prompt() {
    let (_temp_dir, mut app, path) = settings_app("[Login]\n");
    press(&mut app, Key::Right);
    press(&mut app, Key::Ctrl('c'));
    assert_eq!(app.state().mode, Mode::ConfirmExit);

    assert_eq!(press(&mut app, Key::Char('s')), Flow::Exit(0));
    assert!(fs::read_to_string(&path).unwrap().contains("HandlePowerKey=reboot"));
}

#[test]
fn test_second_ctrl_c_discards_with_130() {
    let (_temp_dir, mut app, path) = settings_app("[Login]\n");
    press(&mut app, Key::Right);

    press(&mut app, Key::Ctrl('c'));
    assert_eq!(press(&mut app, Key::Ctrl('c')), Flow::Exit(130));
    assert_eq!(fs::read_to_string(&path).unwrap(), "[Login]\n");
}

#[test]
fn test_signal_exits_with_128_plus_signo() {
    let (_temp_dir, mut app, _path) = settings_app("[Login]\n");
    press(&mut app, Key::Right);

    assert_eq!(app.handle_event(Event::Signal(15)), Flow::Exit(143));
}

#[test]
fn test_signal_before_first_frame_exits() {
    // A signal queued while the terminal is being set up is the first event
    let (_temp_dir, mut app, path) = settings_app("[Login]\n");

    assert_eq!(app.handle_event(Event::Signal(2)), Flow::Exit(130));
    assert!(app.state().layout.is_none());
    assert_eq!(fs::read_to_string(&path).unwrap(), "[Login]\n");
}

#[test]
fn test_malformed_input_ignored() {
    let (_temp_dir, mut app, _path) = settings_app("[Login]\n");
    assert_eq!(app.handle_event(Event::None), Flow::Continue);
    assert_eq!(app.state().mode, Mode::Browsing);
}

// ----------------------------------------------------------------------
// Mouse
// ----------------------------------------------------------------------

#[test]
fn test_click_tab_switches() {
    let (_temp_dir, mut app, _path) = settings_app("[Login]\n");
    let frame = app.frame(80, 24);
    let (span, idx) = frame.layout.tab_hitboxes[2].clone();

    click(&mut app, span.start, frame.layout.tab_row.unwrap());
    assert_eq!(app.state().view.active_tab, idx);
}

#[test]
fn test_click_label_selects_and_value_adjusts() {
    let (_temp_dir, mut app, _path) = settings_app("[Login]\nHandleSuspendKey=suspend\n");
    let frame = app.frame(80, 24);
    let layout = frame.layout;

    // Label column: select only
    click(&mut app, 5, layout.list_top + 4);
    assert_eq!(app.state().view.selected, 4);
    assert!(!app.state().view.dirty);

    // Right half of the value: forward
    click(&mut app, layout.value_col + layout.value_width - 1, layout.list_top + 4);
    assert!(app.state().view.dirty);
    let item = &app.state().profile.tabs()[0].items[4];
    assert_eq!(item.literal().as_deref(), Some("hibernate"));

    // Left half: back again
    click(&mut app, layout.value_col, layout.list_top + 4);
    let item = &app.state().profile.tabs()[0].items[4];
    assert_eq!(item.literal().as_deref(), Some("suspend"));
}

#[test]
fn test_scroll_wheel_moves_selection() {
    let (_temp_dir, mut app, _path) = settings_app("[Login]\n");
    app.frame(80, 24);

    app.handle_event(Event::Mouse(MouseEvent {
        kind: MouseKind::ScrollDown,
        col: 10,
        row: 10,
    }));
    assert_eq!(app.state().view.selected, 1);
}

// ----------------------------------------------------------------------
// Keybinds
// ----------------------------------------------------------------------

#[test]
fn test_create_bind_writes_overlay() {
    let (_temp_dir, mut app, overlay, base) = keybind_app("", "bind = ALT, F4, killactive,\n");

    press(&mut app, Key::Char('n'));
    assert_eq!(editor_text(&app), "bindd = ");

    submit_line(&mut app, "bind = SUPER, Q, exec, kitty");

    assert_eq!(app.state().mode, Mode::Browsing);
    assert!(app.state().session.is_none());
    let written = fs::read_to_string(&overlay).unwrap();
    assert!(written.ends_with("bind = SUPER, Q, exec, kitty\n"));
    assert_eq!(app.state().profile.tabs()[0].len(), 1);
    assert_eq!(fs::read_to_string(&base).unwrap(), "bind = ALT, F4, killactive,\n");
    assert!(!app.state().view.dirty, "Keybind edits are already on disk");
}

#[test]
fn test_parse_error_stays_in_editor() {
    let (_temp_dir, mut app, overlay, _base) = keybind_app("", "");

    press(&mut app, Key::Char('n'));
    submit_line(&mut app, "not a bind");

    assert!(matches!(app.state().mode, Mode::Editing(_)));
    assert!(app.state().status.as_ref().is_some_and(|s| s.error));
    assert_eq!(fs::read_to_string(&overlay).unwrap(), "");
}

#[test]
fn test_escape_cancels_edit() {
    let (_temp_dir, mut app, overlay, _base) = keybind_app("", "bind = ALT, F4, killactive,\n");

    press(&mut app, Key::Tab);
    press(&mut app, Key::Enter);
    assert_eq!(editor_text(&app), "bind = ALT, F4, killactive,");

    press(&mut app, Key::Esc);
    assert_eq!(app.state().mode, Mode::Browsing);
    assert!(app.state().session.is_none());
    assert_eq!(fs::read_to_string(&overlay).unwrap(), "");
}

/// Edit the base SUPER+Q line into a collision with the overlay one
fn conflicted_app() -> (TempDir, App, PathBuf, PathBuf) {
    let (temp_dir, mut app, overlay, base) =
        keybind_app("bind = SUPER, Q, exec, foo\n", "bind = SUPER, Q, exec, kitty\n");

    press(&mut app, Key::Tab);
    press(&mut app, Key::Enter);
    submit_line(&mut app, "bind = SUPER, Q, exec, bar");
    assert_eq!(app.state().mode, Mode::ConflictPrompt);

    (temp_dir, app, overlay, base)
}

#[test]
fn test_conflict_reported() {
    let (_temp_dir, app, overlay, _base) = conflicted_app();

    let status = app.state().status.as_ref().unwrap();
    assert!(status.error);
    assert!(status.text.contains("SUPER+Q"));
    assert!(status.text.contains("overlay:1"));
    assert_eq!(fs::read_to_string(&overlay).unwrap(), "bind = SUPER, Q, exec, foo\n");
}

#[test]
fn test_conflict_overwrite() {
    let (_temp_dir, mut app, overlay, base) = conflicted_app();

    press(&mut app, Key::Char('y'));

    assert_eq!(app.state().mode, Mode::Browsing);
    let written = fs::read_to_string(&overlay).unwrap();
    assert!(written.starts_with("bind = SUPER, Q, exec, foo\n"));
    assert!(written.ends_with("unbind = SUPER, Q\nbind = SUPER, Q, exec, bar\n"));
    assert_eq!(fs::read_to_string(&base).unwrap(), "bind = SUPER, Q, exec, kitty\n");
}

#[test]
fn test_conflict_retry_keeps_candidate() {
    let (_temp_dir, mut app, overlay, _base) = conflicted_app();

    press(&mut app, Key::Char('n'));

    assert_eq!(editor_text(&app), "bind = SUPER, Q, exec, bar");
    assert_eq!(fs::read_to_string(&overlay).unwrap(), "bind = SUPER, Q, exec, foo\n");
}

#[test]
fn test_conflict_edit_stacks_and_continues() {
    let (_temp_dir, mut app, overlay, _base) = conflicted_app();

    press(&mut app, Key::Char('e'));
    assert_eq!(editor_text(&app), "bind = SUPER, Q, exec, foo");
    assert!(status(&app).contains("1 edit(s) stashed"));
    assert_eq!(app.state().session.as_ref().map(|s| s.stack().len()), Some(1));

    // Move the overlay bind elsewhere; both edits land together
    submit_line(&mut app, "bind = SUPER SHIFT, Q, exec, foo");
    assert_eq!(app.state().mode, Mode::Browsing);

    let written = fs::read_to_string(&overlay).unwrap();
    assert!(written.contains("bind = SUPER, Q, exec, bar"));
    assert!(written.contains("bind = SUPER SHIFT, Q, exec, foo"));
}

#[test]
fn test_conflict_escape_abandons_session() {
    let (_temp_dir, mut app, overlay, _base) = conflicted_app();

    press(&mut app, Key::Esc);

    assert_eq!(app.state().mode, Mode::Browsing);
    assert!(app.state().session.is_none());
    assert_eq!(fs::read_to_string(&overlay).unwrap(), "bind = SUPER, Q, exec, foo\n");
}

#[test]
fn test_mouse_ignored_while_editing() {
    let (_temp_dir, mut app, _overlay, _base) =
        keybind_app("", "bind = ALT, F4, killactive,\nbind = ALT, F5, exec, foo\n");
    let frame = app.frame(80, 24);
    press(&mut app, Key::Char('n'));

    click(&mut app, 5, frame.layout.list_top + 1);
    assert!(matches!(app.state().mode, Mode::Editing(_)));
    assert_eq!(app.state().view.selected, 0);
}

// ----------------------------------------------------------------------
// Themes
// ----------------------------------------------------------------------

#[test]
fn test_empty_theme_list_enter_is_noop() {
    let (_temp_dir, mut app, target) = themes_app(&[]);
    app.frame(60, 16);

    assert_eq!(press(&mut app, Key::Enter), Flow::Continue);
    assert_eq!(press(&mut app, Key::Down), Flow::Continue);
    assert_eq!(press(&mut app, Key::Enter), Flow::Continue);

    assert_eq!(app.state().view.selected, 0);
    assert!(app.state().status.is_none());
    assert_eq!(fs::read_to_string(&target).unwrap(), "# theme\n");
}

#[test]
fn test_apply_theme() {
    let (_temp_dir, mut app, target) = themes_app(&[("dark", "nord"), ("light", "paper")]);

    press(&mut app, Key::Down);
    press(&mut app, Key::Enter);

    assert_eq!(status(&app), "Applied paper");
    assert!(fs::read_to_string(&target).unwrap().contains("light/paper/theme.conf"));
    assert!(app.state().profile.tabs()[0].items[1].marked);
    assert!(!app.state().view.dirty);
}

#[test]
fn test_active_theme_preselected() {
    let (temp_dir, _app, target) = themes_app(&[("dark", "nord"), ("light", "paper")]);
    let root = temp_dir.path().join("themes");
    fs::write(
        &target,
        format!("source = {}\n", root.join("light/paper/theme.conf").display()),
    )
    .unwrap();

    let app = App::new(Profile::Themes(ThemeProfile::load(&root, &target).unwrap()));
    assert_eq!(app.state().view.selected, 1);
}

#[test]
fn test_preview_follows_selection() {
    let (_temp_dir, mut app, _target) = themes_app(&[("dark", "nord"), ("light", "paper")]);

    press(&mut app, Key::Char('p'));
    let preview = app.state().view.preview.clone().unwrap();
    assert_eq!(preview.first().map(String::as_str), Some("# nord"));

    press(&mut app, Key::Down);
    let preview = app.state().view.preview.clone().unwrap();
    assert_eq!(preview.first().map(String::as_str), Some("# paper"));

    press(&mut app, Key::Char('p'));
    assert!(app.state().view.preview.is_none());
}

#[test]
fn test_settings_keys_do_nothing_elsewhere() {
    let (_temp_dir, mut app, target) = themes_app(&[("dark", "nord")]);

    press(&mut app, Key::Right);
    press(&mut app, Key::Char('r'));
    assert!(!app.state().view.dirty);
    assert_eq!(app.state().profile.tabs()[0].items[0].value, Some(Value::Text("dark".to_string())));
    assert_eq!(fs::read_to_string(&target).unwrap(), "# theme\n");
}
