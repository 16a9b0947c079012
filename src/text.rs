//! Colorized single-line rendering.
//!
//! ```text
//! 2024-01-02 03:04:05 |  INFO | request served source="api.rs:42" http.status=200 path="/"
//! ```
//!
//! Builtins come first in a fixed order (time, level, message, source),
//! followed by attributes attached through [`Handler::with_attrs`] and then
//! the record's own attributes. Group members are inlined with dotted keys.

use crate::buffer;
use crate::color::{self, Painter};
use crate::error::Result;
use crate::handler::{append_value, Core, Handler, HandlerOptions, SOURCE_KEY};
use crate::level::Level;
use crate::record::{Record, Source};
use crate::value::{Attr, Value};
use chrono::{DateTime, FixedOffset};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

/// Ends the first line of a multi-line message.
const CONTINUATION: &str = "↲";
/// Left margin of every continuation line.
const MARGIN: &str = "  │ > ";

/// Handler producing the colorized single-line format.
pub struct TextHandler<W> {
    core: Core<W>,
    painter: Painter,
}

impl<W> Clone for TextHandler<W> {
    fn clone(&self) -> Self {
        TextHandler {
            core: self.core.clone(),
            painter: self.painter,
        }
    }
}

impl<W: Write + Send> TextHandler<W> {
    pub fn new(out: W, opts: HandlerOptions) -> Self {
        Self::with_shared_sink(Arc::new(Mutex::new(out)), opts)
    }

    /// Root handler writing through an existing lock, e.g. one shared with
    /// another formatter tree.
    pub fn with_shared_sink(sink: Arc<Mutex<W>>, opts: HandlerOptions) -> Self {
        let painter = Painter::new(opts.color);
        TextHandler {
            core: Core::new(sink, opts),
            painter,
        }
    }

    pub fn options(&self) -> &HandlerOptions {
        &self.core.opts
    }

    pub fn sink(&self) -> &Arc<Mutex<W>> {
        self.core.sink()
    }

    fn render(&self, record: &Record, buf: &mut Vec<u8>) {
        let p = &self.painter;
        if let Some(time) = &record.time {
            self.append_time(buf, time);
        }
        self.append_level(buf, record.level);
        self.append_message(buf, &record.message);

        let multiline = record.message.contains('\n');
        if self.core.opts.add_source {
            if let Some(source) = &record.source {
                if multiline {
                    buf.push(b' ');
                }
                self.append_source(buf, source);
                if multiline {
                    buf.extend_from_slice(b"\n  ");
                }
            }
        }

        let mark = buf.len();
        p.set(buf, color::DIM);
        let start = buf.len();
        buf.extend_from_slice(&self.core.prefix);
        let groups = self.core.groups.names();
        for attr in &record.attrs {
            self.append_attr(buf, attr.clone(), &groups);
        }
        if buf.len() == start {
            buf.truncate(mark);
        }
        p.reset(buf);
        buf.push(b'\n');
    }

    fn append_time(&self, buf: &mut Vec<u8>, time: &DateTime<FixedOffset>) {
        let p = &self.painter;
        p.set(buf, color::DATE);
        let _ = write!(buf, "{}", time.format("%Y-%m-%d"));
        p.reset(buf);
        buf.push(b' ');
        p.set(buf, color::HOUR);
        let _ = write!(buf, "{}", time.format("%H:%M:%S"));
        p.reset(buf);
        buf.push(b' ');
    }

    fn append_level(&self, buf: &mut Vec<u8>, level: Level) {
        let p = &self.painter;
        p.paint_static(buf, color::DIM, "|");
        buf.push(b' ');
        // Four-letter names get one extra space so the bars line up.
        if matches!(level, Level::INFO | Level::WARN) {
            buf.push(b' ');
        }
        match level.name() {
            Some(name) => p.paint(buf, color::level_style(level), name),
            None => p.paint(buf, color::level_style(level), &level.to_string()),
        }
        buf.push(b' ');
        p.paint_static(buf, color::DIM, "|");
        buf.push(b' ');
    }

    fn append_message(&self, buf: &mut Vec<u8>, msg: &str) {
        let p = &self.painter;
        p.set(buf, color::MESSAGE);
        let mut lines = msg.split('\n');
        if let Some(first) = lines.next() {
            buf.extend_from_slice(first.as_bytes());
        }
        let mut rest = lines.peekable();
        if rest.peek().is_none() {
            buf.push(b' ');
            p.reset(buf);
            return;
        }
        p.paint_static(buf, color::DIM, CONTINUATION);
        buf.push(b'\n');
        for line in rest {
            p.paint_static(buf, color::DIM, MARGIN);
            p.set(buf, color::MESSAGE);
            buf.extend_from_slice(line.trim().as_bytes());
            buf.push(b'\n');
        }
        p.reset(buf);
    }

    fn append_source(&self, buf: &mut Vec<u8>, source: &Source) {
        let mut scratch = buffer::get();
        let _ = write!(scratch, "{}=\"{}:{}\"", SOURCE_KEY, source.file, source.line);
        self.painter.set(buf, color::DIM);
        buf.extend_from_slice(&scratch);
        self.painter.reset(buf);
        buf.push(b' ');
    }

    fn append_attr(&self, buf: &mut Vec<u8>, attr: Attr, groups: &[&str]) {
        let Some(attr) = self.core.resolve(groups, attr) else {
            return;
        };
        match attr.value {
            Value::Group(members) => {
                if attr.key.is_empty() {
                    for member in members {
                        self.append_attr(buf, member, groups);
                    }
                } else {
                    let mut inner = groups.to_vec();
                    inner.push(&attr.key);
                    for member in members {
                        self.append_attr(buf, member, &inner);
                    }
                }
            }
            value => {
                for group in groups {
                    buf.extend_from_slice(group.as_bytes());
                    buf.push(b'.');
                }
                buf.extend_from_slice(attr.key.as_bytes());
                buf.push(b'=');
                append_value(buf, &value);
                buf.push(b' ');
            }
        }
    }
}

impl<W: Write + Send> Handler for TextHandler<W> {
    fn enabled(&self, level: Level) -> bool {
        self.core.enabled(level)
    }

    fn handle(&self, record: &Record) -> Result<()> {
        let mut buf = buffer::get();
        self.render(record, &mut buf);
        self.core.write(&buf)
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Self {
        if attrs.is_empty() {
            return self.clone();
        }
        let groups = self.core.groups.names();
        let mut prefix = self.core.prefix.to_vec();
        let before = prefix.len();
        for attr in attrs {
            self.append_attr(&mut prefix, attr, &groups);
        }
        if prefix.len() == before {
            return self.clone();
        }
        TextHandler {
            core: self.core.with_prefix(prefix),
            painter: self.painter,
        }
    }

    fn with_group(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }
        TextHandler {
            core: self.core.with_group(name),
            painter: self.painter,
        }
    }
}

impl TextHandler<std::io::Stderr> {
    /// Handler writing to standard error.
    pub fn stderr(opts: HandlerOptions) -> Self {
        TextHandler::new(std::io::stderr(), opts)
    }
}
