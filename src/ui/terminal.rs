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

//! Terminal session
//!
//! Owns raw mode, the alternate screen and mouse reporting for the life of
//! the editor. Restoration runs exactly once, from whichever comes first:
//! `Drop`, the panic hook, or an explicit `restore()`.
//!
//! Input arrives on one channel from two threads: a stdin pump sending
//! bytes and a signal listener forwarding SIGINT/SIGTERM/SIGHUP. The event
//! loop sees a signal as an ordinary event, so a save in progress finishes
//! (and its temp file is removed) before the process exits.

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::PrintStyledContent,
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    Command,
};
use log::{debug, warn};
use std::{
    fmt,
    io::{self, Read, Stdout, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError, Sender},
    },
    thread,
    time::Duration,
};

use crate::ui::{
    input::{ByteSource, Input},
    render::Frame,
    style::content_style,
};

static ACTIVE: AtomicBool = AtomicBool::new(false);

/// SGR mouse reporting: press/release (1000), drag (1002), SGR encoding (1006)
pub struct EnableSgrMouse;

impl Command for EnableSgrMouse {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        f.write_str("\x1b[?1000h\x1b[?1002h\x1b[?1006h")
    }
}

pub struct DisableSgrMouse;

impl Command for DisableSgrMouse {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        f.write_str("\x1b[?1006l\x1b[?1002l\x1b[?1000l")
    }
}

/// Put the terminal back the way it was; later calls do nothing
pub fn restore() {
    if !ACTIVE.swap(false, Ordering::SeqCst) {
        return;
    }

    let mut stdout = io::stdout();
    let _ = execute!(stdout, DisableSgrMouse, Show, LeaveAlternateScreen);
    let _ = disable_raw_mode();
    debug!("terminal restored");
}

/// Start the input threads, then take over the terminal
///
/// The signal listener is registered first: a signal that arrives while
/// raw mode is being entered is queued as the first event instead of
/// killing the process with the terminal left raw.
pub fn open() -> io::Result<(TerminalSession, ChannelSource)> {
    let input = ChannelSource::spawn()?;
    let session = TerminalSession::enter()?;
    Ok((session, input))
}

/// Raw-mode guard; dropping it restores the terminal
pub struct TerminalSession {
    out: Stdout,
    /// Size of the last frame drawn; a change clears the screen first
    last_size: Option<(u16, u16)>,
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore();
            previous(info);
        }));

        enable_raw_mode()?;
        ACTIVE.store(true, Ordering::SeqCst);

        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, Hide, EnableSgrMouse)?;

        Ok(Self {
            out,
            last_size: None,
        })
    }

    /// Terminal size as (columns, rows)
    pub fn size(&self) -> (u16, u16) {
        terminal::size().unwrap_or((80, 24))
    }

    pub fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        let size = (frame.layout.width, frame.layout.height);
        if self.last_size != Some(size) {
            queue!(self.out, Clear(ClearType::All))?;
            self.last_size = Some(size);
        }

        for (row, line) in frame.lines.iter().enumerate() {
            queue!(self.out, MoveTo(0, u16::try_from(row).unwrap_or(u16::MAX)))?;
            for span in &line.spans {
                queue!(
                    self.out,
                    PrintStyledContent(content_style(span.style).apply(span.text.as_str()))
                )?;
            }
        }
        self.out.flush()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        restore();
    }
}

/// Channel-backed input fed by the stdin pump and the signal listener
pub struct ChannelSource {
    rx: Receiver<Input>,
}

impl ChannelSource {
    /// Start both feeder threads
    pub fn spawn() -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        spawn_stdin_pump(tx.clone())?;
        spawn_signal_listener(tx)?;
        Ok(Self { rx })
    }
}

impl ByteSource for ChannelSource {
    fn next(&mut self) -> Option<Input> {
        self.rx.recv().ok()
    }

    fn next_timeout(&mut self, timeout: Duration) -> Option<Input> {
        match self.rx.recv_timeout(timeout) {
            Ok(input) => Some(input),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Input::Closed),
        }
    }
}

fn spawn_stdin_pump(tx: Sender<Input>) -> io::Result<()> {
    thread::Builder::new()
        .name("stdin-pump".to_owned())
        .spawn(move || {
            let mut stdin = io::stdin().lock();
            let mut buf = [0u8; 256];
            loop {
                match stdin.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if buf[..n].iter().any(|b| tx.send(Input::Byte(*b)).is_err()) {
                            return;
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        warn!("stdin read failed: {}", e);
                        break;
                    }
                }
            }
            let _ = tx.send(Input::Closed);
        })
        .map(|_| ())
}

#[cfg(unix)]
fn spawn_signal_listener(tx: Sender<Input>) -> io::Result<()> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};

    let mut signals = signal_hook::iterator::Signals::new([SIGINT, SIGTERM, SIGHUP])?;
    thread::Builder::new()
        .name("signal-listener".to_owned())
        .spawn(move || {
            for signal in signals.forever() {
                debug!("received signal {}", signal);
                if tx.send(Input::Signal(signal)).is_err() {
                    break;
                }
            }
        })
        .map(|_| ())
}

#[cfg(not(unix))]
fn spawn_signal_listener(_tx: Sender<Input>) -> io::Result<()> {
    warn!("signal forwarding is not supported on this platform");
    Ok(())
}
