use std::io;

/// Error type returned by [`Handler::handle`](crate::Handler::handle).
///
/// Rendering itself cannot fail; the only failure surface is the final
/// write into the sink, which is reported once and never retried.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to write log record: {0}")]
    Write(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
