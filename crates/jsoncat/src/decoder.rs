use alloc::vec::Vec;
use core::{fmt, marker::PhantomData};

use serde::de::DeserializeOwned;

use crate::{ByteView, Error};

/// Turns the byte range of one complete value into a typed value.
///
/// The view is only valid for the duration of the call. `Ok(None)` means the
/// range held no value (a JSON `null`, or a custom decoder declining it) and
/// is not an error.
pub trait Decode<T> {
    /// Decode `payload`.
    ///
    /// # Errors
    ///
    /// Implementations return [`Error::MalformedInput`] for ranges they cannot
    /// decode.
    fn decode(&mut self, payload: ByteView<'_>) -> Result<Option<T>, Error>;
}

impl<T, D: Decode<T> + ?Sized> Decode<T> for &mut D {
    fn decode(&mut self, payload: ByteView<'_>) -> Result<Option<T>, Error> {
        (**self).decode(payload)
    }
}

/// The default decoder: deserializes each range with `serde_json`.
///
/// Field naming and custom conversions are configured on `T` through serde
/// attributes and `Deserialize` impls. A range spanning several chunks is
/// joined into a scratch vector reused across calls.
pub struct JsonDecoder<T> {
    scratch: Vec<u8>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonDecoder<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scratch: Vec::new(),
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonDecoder<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonDecoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonDecoder")
    }
}

impl<T: DeserializeOwned> Decode<T> for JsonDecoder<T> {
    fn decode(&mut self, payload: ByteView<'_>) -> Result<Option<T>, Error> {
        let bytes = payload.contiguous_or(&mut self.scratch);
        serde_json::from_slice::<Option<T>>(bytes).map_err(|err| Error::json(payload.offset(), err))
    }
}

/// A decoder backed by a closure. See [`from_fn`].
#[derive(Clone, Copy)]
pub struct FnDecoder<F>(F);

impl<F> fmt::Debug for FnDecoder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnDecoder")
    }
}

/// Decode each raw range with `f`, bypassing JSON decoding entirely.
///
/// ```rust
/// use jsoncat::{ReaderOptions, ScanStrategy, collect_values_with, from_fn};
///
/// let input: &[u8] = b"{\"a\":1}\n{\"a\":2}\n";
/// let lines = collect_values_with(
///     input,
///     ReaderOptions::with_strategy(ScanStrategy::Newline),
///     from_fn(|payload| Ok(Some(String::from_utf8_lossy(&payload.to_vec()).into_owned()))),
/// )
/// .unwrap();
/// assert_eq!(lines, ["{\"a\":1}", "{\"a\":2}"]);
/// ```
pub fn from_fn<T, F>(f: F) -> FnDecoder<F>
where
    F: FnMut(ByteView<'_>) -> Result<Option<T>, Error>,
{
    FnDecoder(f)
}

impl<T, F> Decode<T> for FnDecoder<F>
where
    F: FnMut(ByteView<'_>) -> Result<Option<T>, Error>,
{
    fn decode(&mut self, payload: ByteView<'_>) -> Result<Option<T>, Error> {
        (self.0)(payload)
    }
}
