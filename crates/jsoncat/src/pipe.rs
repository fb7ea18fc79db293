//! An in-memory byte source with producer flow control.
//!
//! The writer half appends bytes to a shared backlog and blocks once the
//! backlog reaches [`SourceOptions::pause_threshold`]; it is woken when the
//! reader half has drained the backlog down to
//! [`SourceOptions::resume_threshold`]. Since a drain reads one chunk at a
//! time and only when it runs out of complete values, a slow consumer
//! throttles the producer without any coordination in the drain itself.

use alloc::{collections::VecDeque, sync::Arc};
use std::io::{self, Read, Write};

use parking_lot::{Condvar, Mutex};

use crate::{Error, SourceOptions};

#[derive(Debug, Default)]
struct State {
    backlog: VecDeque<u8>,
    paused: bool,
    writer_closed: bool,
    reader_closed: bool,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<State>,
    readable: Condvar,
    writable: Condvar,
    pause_threshold: usize,
    resume_threshold: usize,
}

/// Create a connected writer/reader pair using the thresholds in `options`.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if the thresholds are inconsistent.
pub fn pipe(options: &SourceOptions) -> Result<(PipeWriter, PipeReader), Error> {
    options.validate()?;
    let shared = Arc::new(Shared {
        state: Mutex::new(State::default()),
        readable: Condvar::new(),
        writable: Condvar::new(),
        pause_threshold: options.pause_threshold,
        resume_threshold: options.resume_threshold,
    });
    Ok((
        PipeWriter {
            shared: Arc::clone(&shared),
        },
        PipeReader { shared },
    ))
}

/// Producer half. Dropping it ends the stream for the reader.
#[derive(Debug)]
pub struct PipeWriter {
    shared: Arc<Shared>,
}

impl PipeWriter {
    /// `true` while the backlog sits above the resume threshold after
    /// reaching the pause threshold.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.shared.state.lock().paused
    }

    /// Bytes written but not yet read.
    #[must_use]
    pub fn backlog(&self) -> usize {
        self.shared.state.lock().backlog.len()
    }
}

impl Write for PipeWriter {
    /// Append all of `buf`, blocking first while the pipe is paused.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let shared = &*self.shared;
        let mut state = shared.state.lock();
        while state.paused && !state.reader_closed {
            shared.writable.wait(&mut state);
        }
        if state.reader_closed {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        state.backlog.extend(buf);
        if state.backlog.len() >= shared.pause_threshold {
            state.paused = true;
        }
        shared.readable.notify_one();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for PipeWriter {
    fn drop(&mut self) {
        self.shared.state.lock().writer_closed = true;
        self.shared.readable.notify_all();
    }
}

/// Consumer half; hand it to any reader entry point as the byte source.
#[derive(Debug)]
pub struct PipeReader {
    shared: Arc<Shared>,
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let shared = &*self.shared;
        let mut state = shared.state.lock();
        while state.backlog.is_empty() && !state.writer_closed {
            shared.readable.wait(&mut state);
        }
        let n = buf.len().min(state.backlog.len());
        for (dst, src) in buf.iter_mut().zip(state.backlog.drain(..n)) {
            *dst = src;
        }
        if state.paused && state.backlog.len() <= shared.resume_threshold {
            state.paused = false;
            shared.writable.notify_all();
        }
        Ok(n)
    }
}

impl Drop for PipeReader {
    fn drop(&mut self) {
        self.shared.state.lock().reader_closed = true;
        self.shared.writable.notify_all();
    }
}
