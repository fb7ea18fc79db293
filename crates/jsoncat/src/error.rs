use alloc::string::String;

use bstr::BString;
use thiserror::Error;

/// Errors surfaced while draining a multi-value JSON stream.
#[derive(Error, Debug)]
pub enum Error {
    /// The buffered bytes cannot hold a JSON object at this position, or the
    /// decoder rejected a range the scanner judged complete.
    #[error("malformed input at byte {offset}: {reason}")]
    MalformedInput {
        /// Absolute stream offset of the rejected value.
        offset: u64,
        /// What was wrong with it.
        #[source]
        reason: Malformed,
    },
    /// The buffer was asked to release more bytes than it holds.
    #[error("cannot advance {requested} bytes, only {available} buffered")]
    OutOfRange {
        /// Bytes the caller tried to release.
        requested: usize,
        /// Unconsumed bytes actually buffered.
        available: usize,
    },
    /// An option or argument violates its contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// The underlying byte source failed.
    #[error("source error: {0}")]
    Io(#[from] std::io::Error),
}

/// The reason a value was rejected as [`Error::MalformedInput`].
#[derive(Error, Debug)]
pub enum Malformed {
    #[error("input must start with an object, found {found:?}")]
    NotAnObject { found: BString },
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Build a [`Error::MalformedInput`] from a custom decoder's message.
    pub fn custom(offset: u64, msg: impl Into<String>) -> Self {
        Self::MalformedInput {
            offset,
            reason: Malformed::Custom(msg.into()),
        }
    }

    pub(crate) fn json(offset: u64, err: serde_json::Error) -> Self {
        Self::MalformedInput {
            offset,
            reason: Malformed::Json(err),
        }
    }

    /// `true` for [`Error::MalformedInput`].
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedInput { .. })
    }
}
