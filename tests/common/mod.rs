#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, NaiveDate};
use parking_lot::Mutex;
use slogfmt::color::ColorChoice;
use slogfmt::HandlerOptions;
use std::io::{self, Write};
use std::sync::Arc;

pub fn plain_opts() -> HandlerOptions {
    HandlerOptions::default().with_color(ColorChoice::Never)
}

pub fn contents(sink: &Arc<Mutex<Vec<u8>>>) -> String {
    String::from_utf8(sink.lock().clone()).expect("utf8 output")
}

pub fn take(sink: &Arc<Mutex<Vec<u8>>>) -> String {
    String::from_utf8(std::mem::take(&mut *sink.lock())).expect("utf8 output")
}

pub fn stamp() -> DateTime<FixedOffset> {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .and_then(|d| d.and_hms_opt(3, 4, 5))
        .map(|dt| dt.and_utc().fixed_offset())
        .expect("valid date")
}

/// Sink whose every write fails.
pub struct FailingSink;

impl Write for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink that accepts one byte per call and yields in between, so any
/// unsynchronized writers would interleave.
#[derive(Default)]
pub struct Trickle(pub Vec<u8>);

impl Write for Trickle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match buf.first() {
            Some(b) => {
                self.0.push(*b);
                std::thread::yield_now();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
