//! Chunk arena backing the drain loop.
//!
//! Bytes are read (or appended) into fixed chunks that are never moved or
//! copied while buffered. The unconsumed bytes form one logical sequence that
//! starts `head` bytes into the front chunk. [`ByteView`] narrows over that
//! sequence without copying, and borrows the buffer, so a view cannot outlive
//! the next [`ChunkedBuffer::advance`].

use alloc::{boxed::Box, collections::VecDeque, vec, vec::Vec};
use core::{fmt, ops::Range};
use std::io;

use bstr::{BStr, ByteSlice};

use crate::Error;

#[derive(Debug)]
struct Chunk {
    data: Box<[u8]>,
    filled: usize,
}

impl Chunk {
    fn free(&self) -> usize {
        self.data.len() - self.filled
    }
}

/// A growable, logically contiguous view over the bytes read so far.
#[derive(Debug, Default)]
pub struct ChunkedBuffer {
    chunks: VecDeque<Chunk>,
    head: usize,
    len: usize,
    consumed: u64,
}

impl ChunkedBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unconsumed bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total bytes released by [`advance`](Self::advance) so far, i.e. the
    /// stream offset of the first unconsumed byte.
    #[must_use]
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Number of physical chunks currently held.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Add `chunk` to the end of the logical view, taking ownership of it.
    pub fn append(&mut self, chunk: Vec<u8>) {
        if chunk.is_empty() {
            return;
        }
        let filled = chunk.len();
        self.len += filled;
        self.chunks.push_back(Chunk {
            data: chunk.into_boxed_slice(),
            filled,
        });
    }

    /// Writable space at the end of the tail chunk.
    ///
    /// A new chunk of `size` bytes is allocated when the tail has fewer than
    /// `minimum` free bytes. Bytes written here become visible after
    /// [`commit`](Self::commit).
    pub fn spare(&mut self, minimum: usize, size: usize) -> &mut [u8] {
        let minimum = minimum.max(1);
        let has_room = self.chunks.back().is_some_and(|c| c.free() >= minimum);
        if !has_room {
            self.chunks.push_back(Chunk {
                data: vec![0; size.max(minimum)].into_boxed_slice(),
                filled: 0,
            });
        }
        match self.chunks.back_mut() {
            Some(tail) => &mut tail.data[tail.filled..],
            None => &mut [],
        }
    }

    /// Publish `n` bytes previously written into [`spare`](Self::spare).
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `n` exceeds the free space of the
    /// tail chunk, e.g. because a chunk was appended after `spare` was
    /// taken. Nothing is published in that case.
    pub fn commit(&mut self, n: usize) -> Result<(), Error> {
        if n == 0 {
            return Ok(());
        }
        let available = self.chunks.back().map_or(0, Chunk::free);
        if n > available {
            return Err(Error::OutOfRange {
                requested: n,
                available,
            });
        }
        if let Some(tail) = self.chunks.back_mut() {
            tail.filled += n;
            self.len += n;
        }
        Ok(())
    }

    /// The full unconsumed range.
    #[must_use]
    pub fn view(&self) -> ByteView<'_> {
        ByteView {
            chunks: &self.chunks,
            index: 0,
            start: self.head,
            len: self.len,
            offset: self.consumed,
        }
    }

    /// Mark the first `n` unconsumed bytes as consumed and drop every chunk
    /// that no longer holds unconsumed bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `n` exceeds [`len`](Self::len); the
    /// buffer is left untouched.
    pub fn advance(&mut self, n: usize) -> Result<(), Error> {
        if n > self.len {
            return Err(Error::OutOfRange {
                requested: n,
                available: self.len,
            });
        }
        self.len -= n;
        self.consumed += n as u64;

        let mut remaining = n;
        while let Some(front) = self.chunks.front() {
            let available = front.filled - self.head;
            if remaining < available {
                self.head += remaining;
                break;
            }
            remaining -= available;
            // The tail keeps its free space for the next read.
            if self.chunks.len() == 1 && front.free() > 0 {
                self.head = front.filled;
                break;
            }
            self.chunks.pop_front();
            self.head = 0;
        }
        Ok(())
    }
}

/// A borrowed, non-copying window over buffered bytes.
///
/// Physically the bytes may live in several chunks; [`segments`](Self::segments)
/// exposes them, everything else treats the view as one sequence.
#[derive(Clone, Copy)]
pub struct ByteView<'a> {
    chunks: &'a VecDeque<Chunk>,
    index: usize,
    start: usize,
    len: usize,
    offset: u64,
}

impl<'a> ByteView<'a> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stream offset of the first byte of this view.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The contiguous physical pieces of this view, in order.
    #[must_use]
    pub fn segments(&self) -> Segments<'a> {
        Segments {
            chunks: self.chunks,
            index: self.index,
            start: self.start,
            remaining: self.len,
        }
    }

    #[must_use]
    pub fn first(&self) -> Option<u8> {
        self.segments().next().map(|s| s[0])
    }

    #[must_use]
    pub fn get(&self, mut at: usize) -> Option<u8> {
        for segment in self.segments() {
            if at < segment.len() {
                return Some(segment[at]);
            }
            at -= segment.len();
        }
        None
    }

    /// Position of the first `byte` in the view.
    #[must_use]
    pub fn find_byte(&self, byte: u8) -> Option<usize> {
        let mut base = 0;
        for segment in self.segments() {
            if let Some(i) = segment.find_byte(byte) {
                return Some(base + i);
            }
            base += segment.len();
        }
        None
    }

    /// Narrow the view to `range`, relative to its current start.
    ///
    /// # Panics
    ///
    /// Panics if the range is inverted or ends past [`len`](Self::len).
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> ByteView<'a> {
        assert!(
            range.start <= range.end && range.end <= self.len,
            "slice {range:?} out of bounds for view of length {}",
            self.len
        );
        let mut index = self.index;
        let mut start = self.start;
        let mut skip = range.start;
        while let Some(chunk) = self.chunks.get(index) {
            let available = chunk.filled - start;
            if skip < available {
                break;
            }
            skip -= available;
            index += 1;
            start = 0;
        }
        ByteView {
            chunks: self.chunks,
            index,
            start: start + skip,
            len: range.end - range.start,
            offset: self.offset + range.start as u64,
        }
    }

    /// The view as one slice, when it does not cross a chunk boundary.
    #[must_use]
    pub fn as_contiguous(&self) -> Option<&'a [u8]> {
        let mut segments = self.segments();
        match segments.next() {
            None => Some(&[]),
            Some(first) if first.len() == self.len => Some(first),
            Some(_) => None,
        }
    }

    /// The view as one slice: borrowed when contiguous, otherwise joined into
    /// `scratch`, whose previous contents are discarded.
    pub fn contiguous_or<'s>(&self, scratch: &'s mut Vec<u8>) -> &'s [u8]
    where
        'a: 's,
    {
        if let Some(bytes) = self.as_contiguous() {
            return bytes;
        }
        scratch.clear();
        scratch.reserve(self.len);
        for segment in self.segments() {
            scratch.extend_from_slice(segment);
        }
        scratch
    }

    /// A reader over the view's bytes. It implements [`io::BufRead`] and
    /// hands out whole segments.
    #[must_use]
    pub fn reader(&self) -> ViewReader<'a> {
        ViewReader {
            segments: self.segments(),
            current: &[],
        }
    }

    /// Copy the view out into one owned vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len);
        for segment in self.segments() {
            out.extend_from_slice(segment);
        }
        out
    }
}

impl fmt::Debug for ByteView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_vec();
        f.debug_struct("ByteView")
            .field("offset", &self.offset)
            .field("bytes", &BStr::new(&bytes))
            .finish()
    }
}

/// Iterator over the physical segments of a [`ByteView`].
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    chunks: &'a VecDeque<Chunk>,
    index: usize,
    start: usize,
    remaining: usize,
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 {
            let chunk = self.chunks.get(self.index)?;
            let available = &chunk.data[self.start..chunk.filled];
            self.index += 1;
            self.start = 0;
            if available.is_empty() {
                continue;
            }
            let take = available.len().min(self.remaining);
            self.remaining -= take;
            return Some(&available[..take]);
        }
        None
    }
}

/// Reads the bytes of a [`ByteView`] across chunk boundaries.
#[derive(Debug, Clone)]
pub struct ViewReader<'a> {
    segments: Segments<'a>,
    current: &'a [u8],
}

impl io::Read for ViewReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = io::BufRead::fill_buf(self)?;
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        io::BufRead::consume(self, n);
        Ok(n)
    }
}

impl io::BufRead for ViewReader<'_> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.current.is_empty() {
            if let Some(segment) = self.segments.next() {
                self.current = segment;
            }
        }
        Ok(self.current)
    }

    fn consume(&mut self, amt: usize) {
        self.current = &self.current[amt.min(self.current.len())..];
    }
}
