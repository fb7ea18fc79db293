//! Incremental decoding of byte streams that hold many JSON objects back to
//! back: concatenated documents, NDJSON exports, multi-document payloads.
//!
//! Bytes are pulled from the source one chunk at a time into a
//! [`ChunkedBuffer`]. The scanner finds the next complete object under the
//! selected [`ScanStrategy`], the byte range is handed to a [`Decode`]
//! implementation without being copied, and the buffer is advanced past what
//! was consumed. A value split across reads simply waits for the next chunk.
//!
//! ```rust
//! use jsoncat::{ReaderOptions, collect_values};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize, PartialEq)]
//! struct Event {
//!     id: u32,
//! }
//!
//! let input: &[u8] = b"\n{\"id\":1}{\"id\":2}\n\n{\n  \"id\": 3\n}\n";
//! let events: Vec<Event> = collect_values(input, ReaderOptions::default()).unwrap();
//! assert_eq!(events, [Event { id: 1 }, Event { id: 2 }, Event { id: 3 }]);
//! ```
//!
//! Bytes left over when the source ends, including a truncated final object,
//! are dropped without an error.

extern crate alloc;

mod buffer;
mod cancel;
mod decoder;
mod drain;
mod error;
mod options;
mod pipe;
mod reader;
mod scanner;
#[cfg(feature = "async")]
mod stream;

#[cfg(test)]
mod tests;

pub use buffer::{ByteView, ChunkedBuffer, Segments, ViewReader};
pub use cancel::Cancellation;
pub use decoder::{Decode, FnDecoder, JsonDecoder, from_fn};
pub use drain::{Drain, DrainStats, Step};
pub use error::{Error, Malformed};
pub use options::{ReaderOptions, ScanStrategy, SourceOptions};
pub use pipe::{PipeReader, PipeWriter, pipe};
pub use reader::{
    Values, collect_into, collect_into_with, collect_values, collect_values_with, read_values,
    read_values_with,
};
pub use scanner::{Boundary, ScanResult, Scanner, scan_next};
#[cfg(feature = "async")]
pub use stream::{
    AsyncValues, collect_into_async, collect_into_async_with, collect_values_async,
    collect_values_async_with, read_values_async, read_values_async_with,
};
