//! The scan/decode half of the drain loop, independent of how bytes arrive.
//!
//! A [`Drain`] alternates between two phases. [`Drain::step`] is the
//! synchronous phase: it scans what is buffered and decodes at most one value.
//! When the buffer runs dry it reports [`Step::NeedInput`], and the caller
//! performs the read phase, either by [`Drain::feed`]ing an owned chunk or by
//! reading into [`Drain::spare`] and calling [`Drain::commit`]. The blocking
//! [`Values`](crate::Values) iterator and the async
//! `AsyncValues` stream are thin read phases around this type.
//!
//! No scan state survives a read: every step re-derives it from the buffer.

use core::marker::PhantomData;

use tracing::{debug, trace};

use crate::{
    Cancellation, ChunkedBuffer, Decode, Error, ReaderOptions,
    scanner::{ScanResult, Scanner},
};

/// What a [`Drain::step`] produced.
#[derive(Debug, PartialEq, Eq)]
pub enum Step<T> {
    /// One decoded value, or `None` when the decoder reported no value.
    Value(Option<T>),
    /// The buffered bytes hold no further complete value.
    NeedInput,
    /// The source is exhausted or the drain was cancelled. Terminal.
    Finished,
}

/// Counters describing a drain's progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainStats {
    /// Bytes received from the source.
    pub bytes_read: u64,
    /// Bytes released from the buffer: values, separators and filler.
    pub bytes_consumed: u64,
    /// Successful source reads (excluding the final empty one).
    pub reads: u64,
    /// Ranges handed to the decoder.
    pub values: u64,
    /// Bytes left over, and dropped, when the stream ended.
    pub bytes_dropped: u64,
}

/// Sans-IO drain state: buffer, scanner and decoder for one stream.
#[derive(Debug)]
pub struct Drain<T, D> {
    buffer: ChunkedBuffer,
    scanner: Scanner,
    decoder: D,
    options: ReaderOptions,
    cancellation: Option<Cancellation>,
    pending: Option<Error>,
    starved: bool,
    eof: bool,
    finished: bool,
    stats: DrainStats,
    _marker: PhantomData<fn() -> T>,
}

impl<T, D: Decode<T>> Drain<T, D> {
    /// Create a drain. Invalid `options` are reported by the first
    /// [`step`](Self::step).
    pub fn new(options: ReaderOptions, decoder: D) -> Self {
        debug!(
            strategy = ?options.strategy,
            buffer_size = options.source.buffer_size,
            "drain started"
        );
        Self {
            buffer: ChunkedBuffer::new(),
            scanner: Scanner::new(options.strategy),
            decoder,
            options,
            cancellation: None,
            pending: options.validate().err(),
            starved: true,
            eof: false,
            finished: false,
            stats: DrainStats::default(),
            _marker: PhantomData,
        }
    }

    /// Check `cancellation` before each read from now on.
    pub fn set_cancellation(&mut self, cancellation: Cancellation) {
        self.cancellation = Some(cancellation);
    }

    #[must_use]
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    #[must_use]
    pub fn stats(&self) -> DrainStats {
        DrainStats {
            bytes_consumed: self.buffer.consumed(),
            ..self.stats
        }
    }

    /// Unconsumed bytes currently buffered.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Append an owned chunk read elsewhere.
    pub fn feed(&mut self, chunk: Vec<u8>) {
        if chunk.is_empty() {
            return;
        }
        self.record_read(chunk.len());
        self.buffer.append(chunk);
    }

    /// Signal that the source will deliver no more bytes.
    pub fn finish(&mut self) {
        self.eof = true;
    }

    /// Space to read the next chunk into, sized by the source options.
    pub fn spare(&mut self) -> &mut [u8] {
        let source = &self.options.source;
        self.buffer
            .spare(source.minimum_read_size, source.buffer_size)
    }

    /// Publish `n` bytes read into [`spare`](Self::spare). Zero marks the end
    /// of the stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `n` exceeds the spare space, which
    /// happens when a chunk was [`feed`](Self::feed)ed between `spare` and
    /// `commit`. The drain is finished and the bytes are not counted.
    pub fn commit(&mut self, n: usize) -> Result<(), Error> {
        if n == 0 {
            self.finish();
            return Ok(());
        }
        if let Err(err) = self.buffer.commit(n) {
            self.finished = true;
            return Err(err);
        }
        self.record_read(n);
        Ok(())
    }

    /// Stop for good, after the caller hit an error outside the drain.
    pub(crate) fn abort(&mut self) {
        self.finished = true;
    }

    /// Run the synchronous phase once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for invalid options and
    /// [`Error::MalformedInput`] from the scanner or decoder. Any error ends
    /// the drain; later steps report [`Step::Finished`].
    pub fn step(&mut self) -> Result<Step<T>, Error> {
        if let Some(err) = self.pending.take() {
            self.finished = true;
            return Err(err);
        }
        if self.finished {
            return Ok(Step::Finished);
        }
        if !self.starved {
            match self.next_buffered() {
                Ok(Some(value)) => return Ok(Step::Value(value)),
                Ok(None) => self.starved = true,
                Err(err) => {
                    self.finished = true;
                    return Err(err);
                }
            }
        }

        if self.eof {
            self.end_of_stream();
            return Ok(Step::Finished);
        }
        if self.cancellation.as_ref().is_some_and(Cancellation::is_cancelled) {
            debug!(buffered = self.buffer.len(), "drain cancelled");
            self.finished = true;
            return Ok(Step::Finished);
        }
        Ok(Step::NeedInput)
    }

    fn next_buffered(&mut self) -> Result<Option<Option<T>>, Error> {
        let view = self.buffer.view();
        match self.scanner.scan(&view)? {
            ScanResult::Found(boundary) => {
                let payload = view.slice(boundary.range());
                trace!(
                    offset = payload.offset(),
                    len = payload.len(),
                    separator = boundary.separator(),
                    "value boundary"
                );
                let value = self.decoder.decode(payload)?;
                self.stats.values += 1;
                self.buffer.advance(boundary.consumed)?;
                Ok(Some(value))
            }
            ScanResult::Incomplete { discard } => {
                self.buffer.advance(discard)?;
                Ok(None)
            }
        }
    }

    fn record_read(&mut self, n: usize) {
        self.starved = false;
        self.stats.reads += 1;
        self.stats.bytes_read += n as u64;
        trace!(bytes = n, buffered = self.buffer.len(), "source read");
    }

    fn end_of_stream(&mut self) {
        self.finished = true;
        let dropped = self.buffer.len();
        if dropped > 0 {
            // Truncated trailing values are dropped without an error.
            debug!(
                offset = self.buffer.consumed(),
                bytes = dropped,
                "dropping incomplete value at end of stream"
            );
            self.stats.bytes_dropped = dropped as u64;
        }
        debug!(
            values = self.stats.values,
            bytes_read = self.stats.bytes_read,
            "drain complete"
        );
    }
}
