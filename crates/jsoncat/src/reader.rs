//! Blocking read phase over [`std::io::Read`] sources.

use core::iter::FusedIterator;
use std::io::{self, Read};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{Cancellation, Decode, Drain, DrainStats, Error, JsonDecoder, ReaderOptions, Step};

/// Lazily decoded values from a blocking source.
///
/// Each item is one value in stream order; `Ok(None)` marks a range the
/// decoder reported as holding no value. The iterator ends after the source
/// is exhausted or after the first error, and releases the source at that
/// point.
#[derive(Debug)]
pub struct Values<R, T, D = JsonDecoder<T>> {
    source: Option<R>,
    drain: Drain<T, D>,
}

/// Enumerate the JSON objects in `source`.
///
/// ```rust
/// use jsoncat::{ReaderOptions, read_values};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct Row {
///     a: i64,
/// }
///
/// let input: &[u8] = b"{\"a\":1}\n{\"a\":2}\n{\"a\":3}";
/// let rows: Vec<Row> = read_values(input, ReaderOptions::default())
///     .filter_map(Result::transpose)
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(rows, [Row { a: 1 }, Row { a: 2 }, Row { a: 3 }]);
/// ```
pub fn read_values<T, R>(source: R, options: ReaderOptions) -> Values<R, T>
where
    T: DeserializeOwned,
    R: Read,
{
    Values::new(source, options, JsonDecoder::new())
}

/// Enumerate the values in `source` using a custom decoder.
pub fn read_values_with<T, R, D>(source: R, options: ReaderOptions, decoder: D) -> Values<R, T, D>
where
    R: Read,
    D: Decode<T>,
{
    Values::new(source, options, decoder)
}

/// Drain `source` into a vector. Values decoded as absent are skipped.
///
/// # Errors
///
/// See [`Values::collect_into`].
pub fn collect_values<T, R>(source: R, options: ReaderOptions) -> Result<Vec<T>, Error>
where
    T: DeserializeOwned,
    R: Read,
{
    collect_values_with(source, options, JsonDecoder::new())
}

/// [`collect_values`] with a custom decoder.
///
/// # Errors
///
/// See [`Values::collect_into`].
pub fn collect_values_with<T, R, D>(
    source: R,
    options: ReaderOptions,
    decoder: D,
) -> Result<Vec<T>, Error>
where
    R: Read,
    D: Decode<T>,
{
    let mut out = Vec::new();
    Values::new(source, options, decoder).collect_into(&mut out)?;
    Ok(out)
}

/// Drain `source` into a caller-owned collection.
///
/// Returns `true` if at least one value was appended.
///
/// # Errors
///
/// See [`Values::collect_into`].
pub fn collect_into<T, R, C>(source: R, target: &mut C, options: ReaderOptions) -> Result<bool, Error>
where
    T: DeserializeOwned,
    R: Read,
    C: Extend<T>,
{
    Values::new(source, options, JsonDecoder::new()).collect_into(target)
}

/// [`collect_into`] with a custom decoder.
///
/// # Errors
///
/// See [`Values::collect_into`].
pub fn collect_into_with<T, R, C, D>(
    source: R,
    target: &mut C,
    options: ReaderOptions,
    decoder: D,
) -> Result<bool, Error>
where
    R: Read,
    C: Extend<T>,
    D: Decode<T>,
{
    Values::new(source, options, decoder).collect_into(target)
}

impl<R: Read, T, D: Decode<T>> Values<R, T, D> {
    pub fn new(source: R, options: ReaderOptions, decoder: D) -> Self {
        Self {
            source: Some(source),
            drain: Drain::new(options, decoder),
        }
    }

    /// Stop reading once `cancellation` fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.drain.set_cancellation(cancellation);
        self
    }

    #[must_use]
    pub fn stats(&self) -> DrainStats {
        self.drain.stats()
    }

    /// `true` until the source has been released.
    #[must_use]
    pub fn holds_source(&self) -> bool {
        self.source.is_some()
    }

    /// Recover the source. It is only still held when the drain has not
    /// finished, or when `leave_open` was set.
    pub fn into_inner(mut self) -> Option<R> {
        self.source.take()
    }

    /// Drain the remaining values into `target`, skipping absent ones.
    ///
    /// Returns `true` if at least one value was appended.
    ///
    /// # Errors
    ///
    /// Returns the first error the stream produced. Values decoded before it
    /// remain in `target`.
    pub fn collect_into<C: Extend<T>>(mut self, target: &mut C) -> Result<bool, Error> {
        let mut appended = false;
        for item in &mut self {
            if let Some(value) = item? {
                target.extend(Some(value));
                appended = true;
            }
        }
        Ok(appended)
    }

    fn release(&mut self) {
        if self.drain.options().source.leave_open {
            return;
        }
        if self.source.take().is_some() {
            debug!("source released");
        }
    }

    fn fail(&mut self, err: Error) -> Option<Result<Option<T>, Error>> {
        self.drain.abort();
        self.release();
        Some(Err(err))
    }
}

impl<R: Read, T, D: Decode<T>> Iterator for Values<R, T, D> {
    type Item = Result<Option<T>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.drain.step() {
                Ok(Step::Value(value)) => return Some(Ok(value)),
                Ok(Step::NeedInput) => {}
                Ok(Step::Finished) => {
                    self.release();
                    return None;
                }
                Err(err) => return self.fail(err),
            }

            let Some(source) = self.source.as_mut() else {
                self.drain.finish();
                continue;
            };
            let committed = match source.read(self.drain.spare()) {
                Ok(n) => self.drain.commit(n),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => Ok(()),
                Err(err) => Err(err.into()),
            };
            if let Err(err) = committed {
                return self.fail(err);
            }
        }
    }
}

impl<R: Read, T, D: Decode<T>> FusedIterator for Values<R, T, D> {}
