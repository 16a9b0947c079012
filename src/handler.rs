use crate::color::ColorChoice;
use crate::error::Result;
use crate::group::GroupPath;
use crate::level::Level;
use crate::record::Record;
use crate::value::{Attr, Value};
use parking_lot::Mutex;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

/// Key of the builtin time field.
pub const TIME_KEY: &str = "time";
/// Key of the builtin level field.
pub const LEVEL_KEY: &str = "level";
/// Key of the builtin message field.
pub const MESSAGE_KEY: &str = "msg";
/// Key of the builtin source field.
pub const SOURCE_KEY: &str = "source";

/// Rewrites an attribute before it is rendered.
///
/// Called with the enclosing group names, outermost first, and the resolved
/// attribute. Returning `None` drops the attribute. Never called for group
/// attributes themselves, only for their members.
pub type ReplaceAttr = Arc<dyn Fn(&[&str], Attr) -> Option<Attr> + Send + Sync>;

/// Handler configuration.
#[derive(Clone, Default)]
pub struct HandlerOptions {
    /// Render the record's source location.
    pub add_source: bool,
    /// Records below this level are not enabled.
    pub level: Level,
    pub replace_attr: Option<ReplaceAttr>,
    /// Escape sequences for the flat pipeline; ignored by the block pipeline.
    pub color: ColorChoice,
}

impl HandlerOptions {
    pub fn with_source(mut self, add_source: bool) -> Self {
        self.add_source = add_source;
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    pub fn with_replace_attr<F>(mut self, f: F) -> Self
    where
        F: Fn(&[&str], Attr) -> Option<Attr> + Send + Sync + 'static,
    {
        self.replace_attr = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for HandlerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerOptions")
            .field("add_source", &self.add_source)
            .field("level", &self.level)
            .field("replace_attr", &self.replace_attr.is_some())
            .field("color", &self.color)
            .finish()
    }
}

/// Renders [`Record`]s and writes them to a sink.
///
/// Handlers are immutable: [`Handler::with_attrs`] and
/// [`Handler::with_group`] return new handlers and leave the receiver
/// untouched. All handlers derived from one root share that root's sink
/// lock, so each record is written as one contiguous run of bytes.
pub trait Handler: Send + Sync {
    /// Whether records at `level` pass the configured threshold.
    fn enabled(&self, level: Level) -> bool;

    /// Render `record` and write it to the sink.
    ///
    /// **Returns**
    /// - `Ok(())` once the bytes were handed to the sink.
    /// - `Err(Error::Write)` if the sink failed. Nothing is retried.
    fn handle(&self, record: &Record) -> Result<()>;

    /// Handler whose output includes `attrs` after the builtin fields of
    /// every record, qualified by any groups opened so far.
    fn with_attrs(&self, attrs: Vec<Attr>) -> Self
    where
        Self: Sized;

    /// Handler that nests all later attributes under `name`.
    fn with_group(&self, name: &str) -> Self
    where
        Self: Sized;
}

/// State shared by both pipelines.
///
/// `prefix` holds attributes rendered by earlier `with_attrs` calls and is
/// never written to after construction. The first `opened` entries of
/// `groups` are already reflected in `prefix`; the rest are pending.
pub(crate) struct Core<W> {
    pub(crate) opts: Arc<HandlerOptions>,
    pub(crate) prefix: Arc<[u8]>,
    pub(crate) groups: GroupPath,
    pub(crate) opened: usize,
    sink: Arc<Mutex<W>>,
}

impl<W> Clone for Core<W> {
    fn clone(&self) -> Self {
        Core {
            opts: Arc::clone(&self.opts),
            prefix: Arc::clone(&self.prefix),
            groups: self.groups.clone(),
            opened: self.opened,
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<W: Write> Core<W> {
    pub(crate) fn new(sink: Arc<Mutex<W>>, opts: HandlerOptions) -> Self {
        Core {
            opts: Arc::new(opts),
            prefix: Arc::from(Vec::new()),
            groups: GroupPath::new(),
            opened: 0,
            sink,
        }
    }

    pub(crate) fn sink(&self) -> &Arc<Mutex<W>> {
        &self.sink
    }

    pub(crate) fn enabled(&self, level: Level) -> bool {
        level.to_filter() >= self.opts.level.to_filter()
    }

    pub(crate) fn with_group(&self, name: &str) -> Self {
        Core {
            groups: self.groups.push(name),
            ..self.clone()
        }
    }

    /// Successor with a freshly built prefix in which every group is
    /// materialized.
    pub(crate) fn with_prefix(&self, prefix: Vec<u8>) -> Self {
        Core {
            prefix: Arc::from(prefix),
            opened: self.groups.len(),
            ..self.clone()
        }
    }

    /// Resolve lazies, apply the rewrite hook, and drop what should not be
    /// rendered. `groups` is the full path enclosing `attr`.
    pub(crate) fn resolve(&self, groups: &[&str], mut attr: Attr) -> Option<Attr> {
        attr.value = attr.value.resolve();
        if let Some(replace) = &self.opts.replace_attr {
            if !attr.value.is_group() {
                attr = replace(groups, attr)?;
                attr.value = attr.value.resolve();
            }
        }
        if attr.is_empty() {
            return None;
        }
        if let Value::Group(members) = &attr.value {
            if members.is_empty() {
                return None;
            }
        }
        Some(attr)
    }

    /// The only critical section: one write of a finished record.
    pub(crate) fn write(&self, bytes: &[u8]) -> Result<()> {
        let mut sink = self.sink.lock();
        sink.write_all(bytes)?;
        Ok(())
    }
}

/// Append a scalar value: strings quoted, times in RFC 3339, everything
/// else through `Display`.
pub(crate) fn append_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::String(s) => append_quoted(buf, s),
        Value::Time(t) => buf.extend_from_slice(Value::format_time(t).as_bytes()),
        other => {
            let _ = write!(buf, "{}", other);
        }
    }
}

/// Append `s` in double quotes. Control bytes use the short escapes where one
/// exists and `\xNN` otherwise; invisible Unicode uses `\uNNNN`.
pub(crate) fn append_quoted(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    for c in s.chars() {
        match c {
            '"' => buf.extend_from_slice(b"\\\""),
            '\\' => buf.extend_from_slice(b"\\\\"),
            '\u{07}' => buf.extend_from_slice(b"\\a"),
            '\u{08}' => buf.extend_from_slice(b"\\b"),
            '\u{0c}' => buf.extend_from_slice(b"\\f"),
            '\n' => buf.extend_from_slice(b"\\n"),
            '\r' => buf.extend_from_slice(b"\\r"),
            '\t' => buf.extend_from_slice(b"\\t"),
            '\u{0b}' => buf.extend_from_slice(b"\\v"),
            c if c.is_ascii_control() => {
                let _ = write!(buf, "\\x{:02x}", c as u32);
            }
            c if is_invisible(c) => {
                let _ = write!(buf, "\\u{:04x}", c as u32);
            }
            c => {
                let mut utf8 = [0; 4];
                buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
            }
        }
    }
    buf.push(b'"');
}

fn is_invisible(c: char) -> bool {
    c.is_control()
        || (c.is_whitespace() && c != ' ')
        || matches!(
            c,
            '\u{ad}'
                | '\u{200b}'..='\u{200f}'
                | '\u{202a}'..='\u{202e}'
                | '\u{2060}'..='\u{2064}'
                | '\u{feff}'
        )
}
