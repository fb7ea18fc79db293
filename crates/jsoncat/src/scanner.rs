//! Boundary detection over the unconsumed bytes.
//!
//! Both strategies first *approach* the next value: anything before the first
//! `{` is filler and is reported back for release. From the `{`, the
//! structural strategy asks `serde_json` to skip one complete value without
//! building it, while the newline strategy simply looks for the next `\n`.
//!
//! A view spanning several chunks is joined into a scratch vector owned by the
//! [`Scanner`] and reused across scans, so the tokenizer always reads a slice.
//!
//! A scan never mutates the buffer. The caller releases
//! [`Boundary::consumed`] bytes after decoding a value, or
//! [`ScanResult::Incomplete`]'s `discard` bytes before reading more.

use alloc::vec::Vec;
use core::ops::Range;

use bstr::BString;
use serde::de::IgnoredAny;

use crate::{ByteView, Error, Malformed, ScanStrategy};

const OBJECT_OPEN: u8 = b'{';
const SEPARATOR: u8 = b'\n';
const SNIPPET_LEN: usize = 16;

/// Location of one complete value within a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    /// First byte of the value (the `{`); everything before it is filler.
    pub start: usize,
    /// One past the last byte of the value.
    pub end: usize,
    /// Bytes to release once the value is decoded, including the filler and
    /// a swallowed separator.
    pub consumed: usize,
}

impl Boundary {
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Number of separator bytes swallowed after the value (0 or 1).
    #[must_use]
    pub fn separator(&self) -> usize {
        self.consumed - self.end
    }
}

/// Outcome of one [`scan_next`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanResult {
    /// A complete value is buffered.
    Found(Boundary),
    /// More bytes are needed. The first `discard` bytes are filler that can
    /// be released without waiting.
    Incomplete { discard: usize },
}

/// Boundary detection state for one stream: the strategy plus scratch space
/// for views that span several chunks.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    strategy: ScanStrategy,
    scratch: Vec<u8>,
}

impl Scanner {
    #[must_use]
    pub fn new(strategy: ScanStrategy) -> Self {
        Self {
            strategy,
            scratch: Vec::new(),
        }
    }

    #[must_use]
    pub fn strategy(&self) -> ScanStrategy {
        self.strategy
    }

    /// Locate the next complete value in `view`.
    ///
    /// # Errors
    ///
    /// Under [`ScanStrategy::Structural`], returns [`Error::MalformedInput`]
    /// when the bytes from the approached `{` are not a well-formed JSON
    /// object prefix. [`ScanStrategy::Newline`] never fails.
    pub fn scan(&mut self, view: &ByteView<'_>) -> Result<ScanResult, Error> {
        let Some(start) = approach(view) else {
            // Nothing here can begin a value, whatever arrives next.
            return Ok(ScanResult::Incomplete {
                discard: view.len(),
            });
        };
        let object = view.slice(start..view.len());
        let end = match self.strategy {
            ScanStrategy::Structural => structural_end(&object, &mut self.scratch)?,
            ScanStrategy::Newline => object.find_byte(SEPARATOR),
        };
        let Some(end) = end else {
            return Ok(ScanResult::Incomplete { discard: start });
        };

        if end >= object.len() {
            return Ok(ScanResult::Found(Boundary {
                start,
                end: view.len(),
                consumed: view.len(),
            }));
        }
        let separator = usize::from(object.get(end) == Some(SEPARATOR));
        Ok(ScanResult::Found(Boundary {
            start,
            end: start + end,
            consumed: start + end + separator,
        }))
    }
}

/// Locate the next complete value in `view` with a one-off [`Scanner`].
///
/// # Errors
///
/// See [`Scanner::scan`].
pub fn scan_next(view: &ByteView<'_>, strategy: ScanStrategy) -> Result<ScanResult, Error> {
    Scanner::new(strategy).scan(view)
}

fn approach(view: &ByteView<'_>) -> Option<usize> {
    match view.first()? {
        OBJECT_OPEN => Some(0),
        _ => view.find_byte(OBJECT_OPEN),
    }
}

/// End of the object at the start of `object`, or `None` if it is cut off.
///
/// [`Scanner::scan`] only calls this on an approached view, so the
/// leading-token check fails only for direct callers.
pub(crate) fn structural_end(
    object: &ByteView<'_>,
    scratch: &mut Vec<u8>,
) -> Result<Option<usize>, Error> {
    if object.first() != Some(OBJECT_OPEN) {
        let snippet = object.slice(0..object.len().min(SNIPPET_LEN)).to_vec();
        return Err(Error::MalformedInput {
            offset: object.offset(),
            reason: Malformed::NotAnObject {
                found: BString::from(snippet),
            },
        });
    }
    let bytes = object.contiguous_or(scratch);
    match skip_value(bytes) {
        Err(err) if ends_mid_number(bytes) => {
            // A number cut off by the end of the buffer is reported as an
            // invalid number, not as EOF. Extending it with a digit separates
            // the two: a truncated object then runs out of input again.
            let mut padded = Vec::with_capacity(bytes.len() + 1);
            padded.extend_from_slice(bytes);
            padded.push(b'0');
            match skip_value(&padded) {
                Ok(None) => Ok(None),
                _ => Err(Error::json(object.offset(), err)),
            }
        }
        other => other.map_err(|err| Error::json(object.offset(), err)),
    }
}

fn ends_mid_number(bytes: &[u8]) -> bool {
    matches!(
        bytes.last(),
        Some(b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')
    )
}

/// Skip one value from `bytes`, returning the offset just past it, or `None`
/// if the input ends first.
fn skip_value(bytes: &[u8]) -> Result<Option<usize>, serde_json::Error> {
    let mut values = serde_json::Deserializer::from_slice(bytes).into_iter::<IgnoredAny>();
    match values.next() {
        Some(Ok(IgnoredAny)) => Ok(Some(values.byte_offset())),
        Some(Err(err)) if err.is_eof() => Ok(None),
        Some(Err(err)) => Err(err),
        None => Ok(None),
    }
}
