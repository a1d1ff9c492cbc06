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

//! Raw byte stream → input events
//!
//! The decoder pulls one byte at a time from a `ByteSource`. A lone escape
//! byte is only a bare Escape if nothing follows within
//! `ESCAPE_TIMEOUT`; terminals send the rest of a sequence in the same
//! write, so anything slower is a human pressing Escape.
//!
//! Recognized sequences:
//! - CSI / SS3 arrows, Home/End, Page Up/Down, Delete, Shift-Tab
//! - SGR mouse reports `ESC [ < button ; col ; row (M|m)`
//!
//! Malformed sequences decode to `Event::None` and are never errors.

use log::debug;
use std::time::Duration;

/// How long to wait for the next byte of an escape sequence
pub const ESCAPE_TIMEOUT: Duration = Duration::from_millis(100);

/// Longest CSI / SGR body accepted before giving up on a sequence
const MAX_SEQUENCE: usize = 32;

/// What arrives on the input channel
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Input {
    Byte(u8),
    /// A forwarded termination signal
    Signal(i32),
    /// Standard input reached end of file
    Closed,
}

/// Source of raw input
pub trait ByteSource {
    /// Block until the next input
    fn next(&mut self) -> Option<Input>;

    /// Wait at most `timeout`; `None` when nothing arrived
    fn next_timeout(&mut self, timeout: Duration) -> Option<Input>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Key {
    Char(char),
    /// Control-modified letter, lower-case (`Ctrl('s')`)
    Ctrl(char),
    /// Alt-modified character (escape followed quickly by the character)
    Alt(char),
    Enter,
    Esc,
    Backspace,
    Delete,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MouseKind {
    /// Primary button pressed
    Press,
    /// Motion with the primary button held
    Drag,
    ScrollUp,
    ScrollDown,
}

/// Mouse report with 0-based screen coordinates
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MouseEvent {
    pub kind: MouseKind,
    pub col: u16,
    pub row: u16,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Event {
    Key(Key),
    Mouse(MouseEvent),
    Signal(i32),
    /// Nothing meaningful (malformed sequence, mouse release, ...)
    None,
}

/// Read and decode one event
///
/// Returns `None` once the source is exhausted.
pub fn read_event<S: ByteSource + ?Sized>(source: &mut S) -> Option<Event> {
    match source.next()? {
        Input::Byte(byte) => decode(byte, source),
        Input::Signal(signo) => Some(Event::Signal(signo)),
        Input::Closed => None,
    }
}

/// Next byte of a multi-byte sequence
enum Follow {
    Byte(u8),
    Timeout,
    Interrupted(Option<Event>),
}

fn follow<S: ByteSource + ?Sized>(source: &mut S) -> Follow {
    match source.next_timeout(ESCAPE_TIMEOUT) {
        Some(Input::Byte(b)) => Follow::Byte(b),
        Some(Input::Signal(signo)) => Follow::Interrupted(Some(Event::Signal(signo))),
        Some(Input::Closed) => Follow::Interrupted(None),
        None => Follow::Timeout,
    }
}

/// Decode an event whose first byte has already been read
pub fn decode<S: ByteSource + ?Sized>(first: u8, source: &mut S) -> Option<Event> {
    let key = match first {
        0x1b => return decode_escape(source),
        b'\r' | b'\n' => Key::Enter,
        b'\t' => Key::Tab,
        0x7f | 0x08 => Key::Backspace,
        0x01..=0x1a => Key::Ctrl(char::from(first - 1 + b'a')),
        0x20..=0x7e => Key::Char(char::from(first)),
        0x80..=0xff => return decode_utf8(first, source),
        _ => return Some(Event::None),
    };
    Some(Event::Key(key))
}

fn decode_escape<S: ByteSource + ?Sized>(source: &mut S) -> Option<Event> {
    let second = match follow(source) {
        Follow::Byte(b) => b,
        Follow::Timeout => return Some(Event::Key(Key::Esc)),
        Follow::Interrupted(event) => return event,
    };

    match second {
        b'[' => decode_csi(source),
        b'O' => decode_ss3(source),
        0x1b => Some(Event::Key(Key::Esc)),
        0x20..=0x7e => Some(Event::Key(Key::Alt(char::from(second)))),
        _ => Some(Event::None),
    }
}

fn decode_ss3<S: ByteSource + ?Sized>(source: &mut S) -> Option<Event> {
    let byte = match follow(source) {
        Follow::Byte(b) => b,
        Follow::Timeout => return Some(Event::None),
        Follow::Interrupted(event) => return event,
    };

    let key = match byte {
        b'A' => Key::Up,
        b'B' => Key::Down,
        b'C' => Key::Right,
        b'D' => Key::Left,
        b'H' => Key::Home,
        b'F' => Key::End,
        _ => return Some(Event::None),
    };
    Some(Event::Key(key))
}

fn decode_csi<S: ByteSource + ?Sized>(source: &mut S) -> Option<Event> {
    let mut body = Vec::new();

    // Parameter and intermediate bytes until the final byte
    let last = loop {
        match follow(source) {
            Follow::Byte(b) if (0x40..=0x7e).contains(&b) => break b,
            Follow::Byte(b) if body.len() < MAX_SEQUENCE => body.push(b),
            Follow::Byte(_) | Follow::Timeout => {
                debug!("dropping incomplete CSI sequence {:?}", String::from_utf8_lossy(&body));
                return Some(Event::None);
            }
            Follow::Interrupted(event) => return event,
        }
    };

    if body.first() == Some(&b'<') {
        return Some(parse_sgr_mouse(&body[1..], last).map_or(Event::None, Event::Mouse));
    }

    // Modifier parameters (`1;5A`) are accepted and ignored
    let key = match last {
        b'A' => Key::Up,
        b'B' => Key::Down,
        b'C' => Key::Right,
        b'D' => Key::Left,
        b'H' => Key::Home,
        b'F' => Key::End,
        b'Z' => Key::BackTab,
        b'~' => match body.split(|b| *b == b';').next() {
            Some(b"1") | Some(b"7") => Key::Home,
            Some(b"4") | Some(b"8") => Key::End,
            Some(b"3") => Key::Delete,
            Some(b"5") => Key::PageUp,
            Some(b"6") => Key::PageDown,
            _ => return Some(Event::None),
        },
        _ => return Some(Event::None),
    };
    Some(Event::Key(key))
}

/// Parse the body of an SGR mouse report (after `<`)
///
/// Button codes (modifier bits 4/8/16 masked off):
/// - `0` primary press, `32` primary drag
/// - `64` scroll up, `65` scroll down
///
/// Releases (`m`), other buttons and non-numeric fields yield `None`.
pub fn parse_sgr_mouse(body: &[u8], terminator: u8) -> Option<MouseEvent> {
    if terminator != b'M' {
        return None;
    }

    let text = std::str::from_utf8(body).ok()?;
    let mut fields = text.split(';').map(|f| f.parse::<u16>().ok());
    let (button, col, row) = match (fields.next(), fields.next(), fields.next(), fields.next()) {
        (Some(Some(b)), Some(Some(c)), Some(Some(r)), None) => (b, c, r),
        _ => {
            debug!("malformed mouse report {:?}", text);
            return None;
        }
    };

    let kind = match button & !(4 | 8 | 16) {
        0 => MouseKind::Press,
        32 => MouseKind::Drag,
        64 => MouseKind::ScrollUp,
        65 => MouseKind::ScrollDown,
        _ => return None,
    };

    Some(MouseEvent {
        kind,
        col: col.saturating_sub(1),
        row: row.saturating_sub(1),
    })
}

fn decode_utf8<S: ByteSource + ?Sized>(first: u8, source: &mut S) -> Option<Event> {
    let len = match first {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return Some(Event::None),
    };

    let mut bytes = vec![first];
    while bytes.len() < len {
        match follow(source) {
            Follow::Byte(b) => bytes.push(b),
            Follow::Timeout => return Some(Event::None),
            Follow::Interrupted(event) => return event,
        }
    }

    Some(
        std::str::from_utf8(&bytes)
            .ok()
            .and_then(|s| s.chars().next())
            .map_or(Event::None, |c| Event::Key(Key::Char(c))),
    )
}
