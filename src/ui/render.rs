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

//! Frame renderer
//!
//! Turns an `AppState` into one full frame of styled text. The frame always
//! has exactly the requested height: rows past the end of the data are
//! blank filler, so nothing jumps around as the list scrolls.
//!
//! ```text
//! ┌──────── logind settings  v0.4.0 ────────┐
//! │  Power   Lid   Idle   Session           │   tab strip (multi-tab only)
//! ├─────────────────────────────────────────┤
//! │  ▲                                      │   more above
//! │ ›  HandlePowerKey          poweroff     │   item rows
//! │    HandleSuspendKey        suspend      │
//! │  ▼                                 2/9  │   more below + position
//! ├─────────────────────────────────────────┤
//! │ status                                  │
//! │ help                                    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The renderer never reads input. The `Layout` it returns records where
//! tabs, rows and the value column landed so mouse reports can be mapped
//! back onto them.

use std::ops::Range;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::{scroll_window, Item, ScrollWindow, Value};
use crate::ui::{
    app::{AppState, Mode},
    style::Style,
};

const MIN_WIDTH: u16 = 24;
const MIN_HEIGHT: u16 = 10;

const CURSOR_GLYPH: &str = "›";
const MARK_GLYPH: &str = "●";
const UNSET_GLYPH: &str = "∅";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

impl Span {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// One screen row
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    fn push(&mut self, text: impl Into<String>, style: Style) -> &mut Self {
        self.spans.push(Span::new(text, style));
        self
    }

    /// Text without styling
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn width(&self) -> usize {
        self.spans.iter().map(|s| s.text.width()).sum()
    }
}

/// Where things were drawn, in 0-based screen coordinates
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub width: u16,
    pub height: u16,
    pub tab_row: Option<u16>,
    /// Column span of each tab label and the tab it selects
    pub tab_hitboxes: Vec<(Range<u16>, usize)>,
    /// Screen row of the first item row
    pub list_top: u16,
    /// Number of item rows (the viewport height)
    pub list_rows: usize,
    /// First column past the list area (the preview divider when shown)
    pub list_right: u16,
    pub value_col: u16,
    pub value_width: u16,
    pub window: ScrollWindow,
}

impl Layout {
    /// Tab under a screen position
    pub fn tab_at(&self, col: u16, row: u16) -> Option<usize> {
        if self.tab_row != Some(row) {
            return None;
        }
        self.tab_hitboxes
            .iter()
            .find(|(span, _)| span.contains(&col))
            .map(|(_, idx)| *idx)
    }

    /// Item index under a screen position, if that row shows an item
    pub fn item_at(&self, col: u16, row: u16) -> Option<usize> {
        if row < self.list_top || col == 0 || col >= self.list_right {
            return None;
        }
        let idx = self.window.offset + usize::from(row - self.list_top);
        (usize::from(row - self.list_top) < self.list_rows && self.window.visible.contains(&idx))
            .then_some(idx)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub lines: Vec<Line>,
    pub layout: Layout,
}

/// Pad or truncate `text` to exactly `width` display columns
pub fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        let mut out = text.to_string();
        out.push_str(&" ".repeat(width - text.width()));
        return out;
    }

    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

/// Text and style of an item's value column
pub fn value_cell(item: &Item) -> (String, Style) {
    match &item.value {
        None => match &item.default {
            Some(default) => (format!("{} {}", UNSET_GLYPH, item.render_value(default)), Style::Muted),
            None => (UNSET_GLYPH.to_string(), Style::Muted),
        },
        Some(Value::Bool(true)) => ("YES".to_string(), Style::Yes),
        Some(Value::Bool(false)) => ("NO".to_string(), Style::No),
        Some(Value::Choice(_)) if item.is_destructive() => {
            (item.literal().unwrap_or_default(), Style::Warning)
        }
        Some(Value::Choice(_)) => (item.literal().unwrap_or_default(), Style::Emphasis),
        Some(value) => (item.render_value(value), Style::Normal),
    }
}

fn border(left: &str, fill_width: usize, right: &str) -> Line {
    let mut line = Line::default();
    line.push(format!("{}{}{}", left, "─".repeat(fill_width), right), Style::Border);
    line
}

/// Wrap inner spans (exactly `inner` wide) in side borders
fn boxed(inner: Line) -> Line {
    let mut line = Line::default();
    line.push("│", Style::Border);
    line.spans.extend(inner.spans);
    line.push("│", Style::Border);
    line
}

fn text_row(text: &str, style: Style, inner: usize) -> Line {
    let mut line = Line::default();
    line.push(fit(text, inner), style);
    boxed(line)
}

fn title_row(state: &AppState, inner: usize) -> Line {
    let title = format!(" {} ", state.profile.title());
    let (badge, badge_style) = if state.view.dirty {
        ("● unsaved ".to_string(), Style::Unsaved)
    } else {
        (format!("v{} ", env!("CARGO_PKG_VERSION")), Style::Badge)
    };

    let used = title.width() + badge.width();
    if used > inner {
        let mut line = Line::default();
        line.push("┌", Style::Border)
            .push(fit(&title, inner), Style::Title)
            .push("┐", Style::Border);
        return line;
    }

    let left = (inner - used) / 2;
    let right = inner - used - left;

    let mut line = Line::default();
    line.push(format!("┌{}", "─".repeat(left)), Style::Border)
        .push(title, Style::Title)
        .push(badge, badge_style)
        .push(format!("{}┐", "─".repeat(right)), Style::Border);
    line
}

fn tab_row(state: &AppState, inner: usize) -> (Line, Vec<(Range<u16>, usize)>) {
    let mut content = Line::default();
    let mut hitboxes = Vec::new();
    content.push(" ", Style::Normal);
    let mut used = 1usize;

    for (idx, tab) in state.profile.tabs().iter().enumerate() {
        let label = format!(" {} ", tab.name);
        let w = label.width();
        if used + w > inner {
            break;
        }

        // +1 for the left border
        let start = u16::try_from(used + 1).unwrap_or(u16::MAX);
        let end = u16::try_from(used + 1 + w).unwrap_or(u16::MAX);
        hitboxes.push((start..end, idx));

        let style = if idx == state.view.active_tab {
            Style::TabActive
        } else {
            Style::TabInactive
        };
        content.push(label, style);
        used += w;

        if used < inner {
            content.push(" ", Style::Normal);
            used += 1;
        }
    }

    content.push(" ".repeat(inner - used), Style::Normal);
    (boxed(content), hitboxes)
}

struct Columns {
    list: usize,
    label: usize,
    value: usize,
    preview: usize,
}

fn columns(inner: usize, preview: bool) -> Columns {
    let (list, preview) = if preview {
        let list = inner / 2;
        (list, inner - list - 1)
    } else {
        (inner, 0)
    };

    // " " cursor mark " " label " " value " "
    let flexible = list.saturating_sub(6);
    let value = flexible * 2 / 5;
    Columns {
        list,
        label: flexible - value,
        value,
        preview,
    }
}

fn item_row(item: &Item, selected: bool, cols: &Columns) -> Line {
    let mut line = Line::default();
    let row_style = if selected { Style::Selected } else { Style::Normal };

    line.push(" ", Style::Normal)
        .push(if selected { CURSOR_GLYPH } else { " " }, Style::Emphasis)
        .push(if item.marked { MARK_GLYPH } else { " " }, Style::Marker)
        .push(" ", Style::Normal)
        .push(fit(&item.label, cols.label), row_style)
        .push(" ", Style::Normal);

    let (value, style) = value_cell(item);
    line.push(fit(&value, cols.value), style).push(" ", Style::Normal);
    line
}

fn status_row(state: &AppState, inner: usize) -> Line {
    match &state.mode {
        Mode::Editing(editor) => {
            let prompt = "> ";
            let text: Vec<char> = editor.text().chars().collect();
            let cursor = editor.cursor().min(text.len());
            let cursor_cell = usize::from(cursor == text.len());

            // Scroll the start of the text off to the left until it fits,
            // never past the cursor
            let mut start = 0;
            while start < cursor
                && prompt.width() + chars_width(&text[start..]) + cursor_cell > inner
            {
                start += 1;
            }

            let before: String = text[start..cursor].iter().collect();
            let at: String = text.get(cursor).map_or(" ".to_string(), |c| c.to_string());
            let after: String = text.get(cursor + 1..).map_or(String::new(), |r| r.iter().collect());

            let mut content = Line::default();
            content
                .push(prompt, Style::Emphasis)
                .push(before, Style::Normal)
                .push(at, Style::Selected);

            let room = inner.saturating_sub(content.width());
            content.push(fit(&after, room), Style::Normal);
            boxed(content)
        }
        _ => match &state.status {
            Some(status) => {
                let style = if status.error { Style::Error } else { Style::Emphasis };
                text_row(&format!(" {}", status.text), style, inner)
            }
            None => text_row("", Style::Normal, inner),
        },
    }
}

fn chars_width(chars: &[char]) -> usize {
    chars.iter().map(|c| c.width().unwrap_or(0)).sum()
}

fn help_text(state: &AppState) -> &'static str {
    match state.mode {
        Mode::Browsing => state.profile.help(),
        Mode::Editing(_) => "Enter submit  Esc cancel  ←→ Home End move",
        Mode::ConflictPrompt => "y overwrite  e edit conflicting line  n retry  Esc cancel",
        Mode::ConfirmExit => "s save and quit  d discard and quit  Esc keep editing",
    }
}

/// Render a full frame of `width` × `height` cells
pub fn render(state: &AppState, width: u16, height: u16) -> Frame {
    let width = width.max(MIN_WIDTH);
    let height = height.max(MIN_HEIGHT);
    let inner = usize::from(width) - 2;

    let tabs = state.profile.tabs();
    let multi_tab = tabs.len() > 1;
    let items: &[Item] = tabs
        .get(state.view.active_tab)
        .map(|t| t.items.as_slice())
        .unwrap_or(&[]);

    let chrome = 8 + usize::from(multi_tab);
    let list_rows = usize::from(height).saturating_sub(chrome).max(1);
    let window = scroll_window(state.view.selected, items.len(), list_rows, state.view.offset);
    let preview = state.view.preview.as_deref();
    let cols = columns(inner, preview.is_some());

    let mut lines = Vec::with_capacity(usize::from(height));
    lines.push(title_row(state, inner));

    let mut tab_row_index = None;
    let mut tab_hitboxes = Vec::new();
    if multi_tab {
        let row = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        let (line, boxes) = tab_row(state, inner);
        lines.push(line);
        tab_row_index = Some(row);
        tab_hitboxes = boxes;
    }

    lines.push(border("├", inner, "┤"));
    lines.push(text_row(
        if window.has_more_above() { "  ▲" } else { "" },
        Style::Muted,
        inner,
    ));

    let list_top = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    for row in 0..list_rows {
        let idx = window.offset + row;
        let mut content = match items.get(idx).filter(|_| window.visible.contains(&idx)) {
            Some(item) => item_row(item, idx == window.selected, &cols),
            None if row == 0 && items.is_empty() => {
                let mut line = Line::default();
                line.push(fit("  (no entries)", cols.list), Style::Muted);
                line
            }
            None => {
                let mut line = Line::default();
                line.push(" ".repeat(cols.list), Style::Normal);
                line
            }
        };

        if let Some(preview) = preview {
            content.push("│", Style::Border);
            let text = preview.get(row).map(String::as_str).unwrap_or("");
            content.push(fit(text, cols.preview), Style::Muted);
        }

        lines.push(boxed(content));
    }

    let position = if items.is_empty() {
        "0/0 ".to_string()
    } else {
        format!("{}/{} ", window.selected + 1, items.len())
    };
    let more = if window.has_more_below(items.len()) { "  ▼" } else { "" };
    let gap = inner.saturating_sub(more.width() + position.width());
    let mut footer = Line::default();
    footer
        .push(more, Style::Muted)
        .push(" ".repeat(gap), Style::Normal)
        .push(fit(&position, inner - more.width() - gap), Style::Muted);
    lines.push(boxed(footer));

    lines.push(border("├", inner, "┤"));
    lines.push(status_row(state, inner));
    lines.push(text_row(&format!(" {}", help_text(state)), Style::Muted, inner));

    lines.push(border("└", inner, "┘"));

    let value_col = u16::try_from(cols.label + 6).unwrap_or(u16::MAX);
    let layout = Layout {
        width,
        height,
        tab_row: tab_row_index,
        tab_hitboxes,
        list_top,
        list_rows,
        list_right: u16::try_from(cols.list + 1).unwrap_or(u16::MAX),
        value_col,
        value_width: u16::try_from(cols.value).unwrap_or(u16::MAX),
        window,
    };

    Frame { lines, layout }
}
