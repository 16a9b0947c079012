//! Terminal styling for the flat pipeline.

use crate::level::Level;
use colored::Color;
use dashmap::DashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

const RESET: &[u8] = b"\x1b[0m";

/// Painted constant text, keyed by style and the literal it wraps.
static PAINTED: LazyLock<DashMap<(Style, &'static str), Arc<[u8]>>> = LazyLock::new(DashMap::new);

/// When to emit ANSI escape sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Follow `colored`'s detection (`NO_COLOR`, `CLICOLOR`, TTY).
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Auto => colored::control::SHOULD_COLORIZE.should_colorize(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

/// Foreground color with optional bold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    fg: Color,
    bold: bool,
}

impl Hash for Style {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fg.to_fg_str().hash(state);
        self.bold.hash(state);
    }
}

impl Style {
    pub const fn new(fg: Color) -> Self {
        Style { fg, bold: false }
    }

    pub const fn bold(self) -> Self {
        Style { bold: true, ..self }
    }

    fn write_sequence(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(b"\x1b[");
        if self.bold {
            buf.extend_from_slice(b"1;");
        }
        buf.extend_from_slice(self.fg.to_fg_str().as_bytes());
        buf.push(b'm');
    }
}

pub const DATE: Style = Style::new(Color::Magenta);
pub const HOUR: Style = Style::new(Color::Blue);
pub const DIM: Style = Style::new(Color::BrightBlack);
pub const MESSAGE: Style = Style::new(Color::BrightWhite);

const TRACE: Style = Style::new(Color::BrightCyan).bold();
const INFO: Style = Style::new(Color::BrightGreen).bold();
const WARN: Style = Style::new(Color::BrightYellow).bold();
const ERROR: Style = Style::new(Color::BrightRed).bold();
const PANIC: Style = Style::new(Color::BrightMagenta).bold();
const FATAL: Style = Style::new(Color::BrightBlue).bold();

/// Display style for a level. Levels below TRACE share its style, levels
/// above FATAL share PANIC's.
pub fn level_style(level: Level) -> Style {
    match level {
        Level::TRACE | Level::DEBUG => TRACE,
        Level::INFO => INFO,
        Level::WARN => WARN,
        Level::ERROR => ERROR,
        Level::PANIC => PANIC,
        Level::FATAL => FATAL,
        l if l < Level::TRACE => TRACE,
        _ => PANIC,
    }
}

/// Writes styled text into a buffer, or plain text when color is off.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(choice: ColorChoice) -> Self {
        Painter {
            enabled: choice.enabled(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn paint(&self, buf: &mut Vec<u8>, style: Style, text: &str) {
        if !self.enabled {
            buf.extend_from_slice(text.as_bytes());
            return;
        }
        style.write_sequence(buf);
        buf.extend_from_slice(text.as_bytes());
        buf.extend_from_slice(RESET);
    }

    /// Like [`Painter::paint`] for constant text, memoized per process.
    pub fn paint_static(&self, buf: &mut Vec<u8>, style: Style, text: &'static str) {
        if !self.enabled {
            buf.extend_from_slice(text.as_bytes());
            return;
        }
        let key = (style, text);
        if let Some(painted) = PAINTED.get(&key) {
            buf.extend_from_slice(&painted);
            return;
        }
        let painted = PAINTED
            .entry(key)
            .or_insert_with(|| {
                let mut seq = Vec::with_capacity(text.len() + 16);
                style.write_sequence(&mut seq);
                seq.extend_from_slice(text.as_bytes());
                seq.extend_from_slice(RESET);
                Arc::from(seq)
            })
            .clone();
        buf.extend_from_slice(&painted);
    }

    /// Switch to `style` without resetting afterwards.
    pub fn set(&self, buf: &mut Vec<u8>, style: Style) {
        if self.enabled {
            style.write_sequence(buf);
        }
    }

    pub fn reset(&self, buf: &mut Vec<u8>) {
        if self.enabled {
            buf.extend_from_slice(RESET);
        }
    }
}
