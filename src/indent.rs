//! Indented block rendering.
//!
//! ```text
//! time: 2024-01-02T03:04:05Z
//! level: INFO
//! msg: request served
//! http:
//!     status: 200
//! ---
//! ```
//!
//! Groups open a `name:` header and indent their members four spaces per
//! level. Every record ends with a `---` separator line. No color is ever
//! emitted.

use crate::buffer;
use crate::error::Result;
use crate::handler::{
    append_value, Core, Handler, HandlerOptions, LEVEL_KEY, MESSAGE_KEY, SOURCE_KEY, TIME_KEY,
};
use crate::level::Level;
use crate::record::Record;
use crate::value::{Attr, Value};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

const INDENT: usize = 4;
const SEPARATOR: &[u8] = b"---\n";

fn indent(buf: &mut Vec<u8>, depth: usize) {
    buf.resize(buf.len() + depth * INDENT, b' ');
}

/// Handler producing the indented block format.
pub struct IndentHandler<W> {
    core: Core<W>,
}

impl<W> Clone for IndentHandler<W> {
    fn clone(&self) -> Self {
        IndentHandler {
            core: self.core.clone(),
        }
    }
}

impl<W: Write + Send> IndentHandler<W> {
    pub fn new(out: W, opts: HandlerOptions) -> Self {
        Self::with_shared_sink(Arc::new(Mutex::new(out)), opts)
    }

    pub fn with_shared_sink(sink: Arc<Mutex<W>>, opts: HandlerOptions) -> Self {
        IndentHandler {
            core: Core::new(sink, opts),
        }
    }

    pub fn options(&self) -> &HandlerOptions {
        &self.core.opts
    }

    pub fn sink(&self) -> &Arc<Mutex<W>> {
        self.core.sink()
    }

    fn render(&self, record: &Record, buf: &mut Vec<u8>) {
        if let Some(time) = &record.time {
            let _ = writeln!(buf, "{}: {}", TIME_KEY, Value::format_time(time));
        }
        let _ = writeln!(buf, "{}: {}", LEVEL_KEY, record.level);
        if self.core.opts.add_source {
            if let Some(source) = &record.source {
                let _ = writeln!(buf, "{}: {}", SOURCE_KEY, source);
            }
        }
        self.append_message(buf, &record.message);

        buf.extend_from_slice(&self.core.prefix);
        let groups = self.core.groups.names();
        let mark = buf.len();
        self.append_pending_groups(buf, &groups);
        let body = buf.len();
        for attr in &record.attrs {
            self.append_attr(buf, attr.clone(), &groups);
        }
        if buf.len() == body {
            buf.truncate(mark);
        }
        buf.extend_from_slice(SEPARATOR);
    }

    fn append_message(&self, buf: &mut Vec<u8>, msg: &str) {
        buf.extend_from_slice(MESSAGE_KEY.as_bytes());
        buf.extend_from_slice(b": ");
        if !msg.contains('\n') {
            buf.extend_from_slice(msg.as_bytes());
            buf.push(b'\n');
            return;
        }
        buf.extend_from_slice(b">-\n");
        for line in msg.split('\n') {
            indent(buf, 1);
            buf.extend_from_slice(line.trim_end_matches('\r').as_bytes());
            buf.push(b'\n');
        }
    }

    /// Headers for groups opened with `with_group` but not yet written into
    /// the prefix.
    fn append_pending_groups(&self, buf: &mut Vec<u8>, groups: &[&str]) {
        for (depth, name) in groups.iter().enumerate().skip(self.core.opened) {
            indent(buf, depth);
            buf.extend_from_slice(name.as_bytes());
            buf.extend_from_slice(b":\n");
        }
    }

    fn append_attr(&self, buf: &mut Vec<u8>, attr: Attr, groups: &[&str]) {
        let Some(attr) = self.core.resolve(groups, attr) else {
            return;
        };
        let depth = groups.len();
        match attr.value {
            Value::Group(members) => {
                if attr.key.is_empty() {
                    for member in members {
                        self.append_attr(buf, member, groups);
                    }
                    return;
                }
                let mark = buf.len();
                indent(buf, depth);
                buf.extend_from_slice(attr.key.as_bytes());
                buf.extend_from_slice(b":\n");
                let body = buf.len();
                let mut inner = groups.to_vec();
                inner.push(&attr.key);
                for member in members {
                    self.append_attr(buf, member, &inner);
                }
                // Every member dropped: no header either.
                if buf.len() == body {
                    buf.truncate(mark);
                }
            }
            value => {
                indent(buf, depth);
                buf.extend_from_slice(attr.key.as_bytes());
                buf.extend_from_slice(b": ");
                append_value(buf, &value);
                buf.push(b'\n');
            }
        }
    }
}

impl<W: Write + Send> Handler for IndentHandler<W> {
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
        self.append_pending_groups(&mut prefix, &groups);
        let body = prefix.len();
        for attr in attrs {
            self.append_attr(&mut prefix, attr, &groups);
        }
        if prefix.len() == body {
            return self.clone();
        }
        IndentHandler {
            core: self.core.with_prefix(prefix),
        }
    }

    fn with_group(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }
        IndentHandler {
            core: self.core.with_group(name),
        }
    }
}
