use crate::level::Level;
use crate::value::Attr;
use chrono::{DateTime, FixedOffset, Local, TimeZone};
use std::fmt;

/// Source location of the log call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub file: String,
    pub line: u32,
}

impl Source {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Source {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One log event, built by the caller and handed to a
/// [`Handler`](crate::Handler). Handlers never modify it.
#[derive(Debug, Clone)]
pub struct Record {
    pub level: Level,
    /// `None` omits the time from the output.
    pub time: Option<DateTime<FixedOffset>>,
    pub message: String,
    pub source: Option<Source>,
    pub attrs: Vec<Attr>,
}

impl Record {
    /// Record without a timestamp.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Record {
            level,
            time: None,
            message: message.into(),
            source: None,
            attrs: Vec::new(),
        }
    }

    /// Record stamped with the current local time.
    pub fn now(level: Level, message: impl Into<String>) -> Self {
        Record::new(level, message).with_time(Local::now())
    }

    pub fn with_time<Tz: TimeZone>(mut self, time: DateTime<Tz>) -> Self {
        self.time = Some(time.fixed_offset());
        self
    }

    pub fn with_source(mut self, file: impl Into<String>, line: u32) -> Self {
        self.source = Some(Source::new(file, line));
        self
    }

    pub fn with_attr(mut self, attr: Attr) -> Self {
        self.attrs.push(attr);
        self
    }

    pub fn with_attrs(mut self, attrs: impl IntoIterator<Item = Attr>) -> Self {
        self.attrs.extend(attrs);
        self
    }
}
