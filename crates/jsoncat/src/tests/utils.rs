use alloc::{collections::VecDeque, rc::Rc};
use core::cell::Cell;
use std::io::{self, Read};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub a: i64,
}

/// Split `payload` into `parts` roughly equal chunks.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn produce_chunks(payload: &[u8], parts: usize) -> Vec<&[u8]> {
    assert!(parts > 0);
    let size = payload.len().div_ceil(parts).max(1);
    payload.chunks(size).collect()
}

/// Split `payload` at sizes derived from arbitrary `splits`, the way the
/// property tests partition their input.
#[must_use]
pub fn partition(payload: &[u8], splits: &[usize]) -> Vec<Vec<u8>> {
    let mut chunks = Vec::new();
    let mut idx = 0;
    for s in splits {
        let remaining = payload.len() - idx;
        if remaining == 0 {
            break;
        }
        let size = 1 + (s % remaining);
        chunks.push(payload[idx..idx + size].to_vec());
        idx += size;
    }
    if idx < payload.len() {
        chunks.push(payload[idx..].to_vec());
    }
    chunks
}

/// A source that hands out one scripted chunk per read (or less, when the
/// caller's buffer is smaller).
#[derive(Debug, Default)]
pub struct ScriptedSource {
    chunks: VecDeque<Vec<u8>>,
}

impl ScriptedSource {
    pub fn new<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }

    /// Deliver `payload` `size` bytes at a time.
    pub fn trickle(payload: &[u8], size: usize) -> Self {
        Self::new(payload.chunks(size.max(1)).map(<[u8]>::to_vec))
    }
}

impl Read for ScriptedSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(mut chunk) = self.chunks.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.chunks.push_front(chunk.split_off(n));
        }
        Ok(n)
    }
}

/// Wraps a source and counts how often it was read and dropped.
#[derive(Debug)]
pub struct Tracked<R> {
    inner: R,
    reads: Rc<Cell<usize>>,
    drops: Rc<Cell<usize>>,
}

#[derive(Debug, Clone, Default)]
pub struct Counters {
    pub reads: Rc<Cell<usize>>,
    pub drops: Rc<Cell<usize>>,
}

impl<R> Tracked<R> {
    pub fn new(inner: R) -> (Self, Counters) {
        let counters = Counters::default();
        (
            Self {
                inner,
                reads: Rc::clone(&counters.reads),
                drops: Rc::clone(&counters.drops),
            },
            counters,
        )
    }
}

impl<R: Read> Read for Tracked<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads.set(self.reads.get() + 1);
        self.inner.read(buf)
    }
}

impl<R> Drop for Tracked<R> {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

/// Yields `data`, then fails every read.
#[derive(Debug)]
pub struct FailingSource {
    data: Option<Vec<u8>>,
}

impl FailingSource {
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: Some(data.to_vec()),
        }
    }
}

impl Read for FailingSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.data.take() {
            Some(data) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                Ok(n)
            }
            None => Err(io::Error::other("connection reset")),
        }
    }
}
