//! Suspending read phase over [`futures::io::AsyncRead`] sources.

use core::{
    pin::Pin,
    task::{Context, Poll, ready},
};
use std::io;

use futures::{
    Stream, StreamExt,
    io::AsyncRead,
    stream::FusedStream,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{Cancellation, Decode, Drain, DrainStats, Error, JsonDecoder, ReaderOptions, Step};

/// Values decoded from an async source, produced as soon as they are
/// buffered. The only suspension point is the source read.
///
/// Dropping the stream cancels the drain and releases the source.
#[derive(Debug)]
pub struct AsyncValues<R, T, D = JsonDecoder<T>> {
    source: Option<R>,
    drain: Drain<T, D>,
}

/// Enumerate the JSON objects in an async `source`.
pub fn read_values_async<T, R>(source: R, options: ReaderOptions) -> AsyncValues<R, T>
where
    T: DeserializeOwned,
    R: AsyncRead + Unpin,
{
    AsyncValues::new(source, options, JsonDecoder::new())
}

/// [`read_values_async`] with a custom decoder.
pub fn read_values_async_with<T, R, D>(
    source: R,
    options: ReaderOptions,
    decoder: D,
) -> AsyncValues<R, T, D>
where
    R: AsyncRead + Unpin,
    D: Decode<T> + Unpin,
{
    AsyncValues::new(source, options, decoder)
}

/// Drain an async `source` into a vector, skipping absent values.
///
/// # Errors
///
/// Returns the first error the stream produced.
pub async fn collect_values_async<T, R>(source: R, options: ReaderOptions) -> Result<Vec<T>, Error>
where
    T: DeserializeOwned,
    R: AsyncRead + Unpin,
{
    collect_values_async_with(source, options, JsonDecoder::new()).await
}

/// [`collect_values_async`] with a custom decoder.
///
/// # Errors
///
/// Returns the first error the stream produced.
pub async fn collect_values_async_with<T, R, D>(
    source: R,
    options: ReaderOptions,
    decoder: D,
) -> Result<Vec<T>, Error>
where
    R: AsyncRead + Unpin,
    D: Decode<T> + Unpin,
{
    let mut out = Vec::new();
    AsyncValues::new(source, options, decoder)
        .collect_into(&mut out)
        .await?;
    Ok(out)
}

/// Drain an async `source` into a caller-owned collection. Returns `true` if
/// at least one value was appended.
///
/// # Errors
///
/// Returns the first error the stream produced.
pub async fn collect_into_async<T, R, C>(
    source: R,
    target: &mut C,
    options: ReaderOptions,
) -> Result<bool, Error>
where
    T: DeserializeOwned,
    R: AsyncRead + Unpin,
    C: Extend<T>,
{
    AsyncValues::new(source, options, JsonDecoder::new())
        .collect_into(target)
        .await
}

/// [`collect_into_async`] with a custom decoder.
///
/// # Errors
///
/// Returns the first error the stream produced.
pub async fn collect_into_async_with<T, R, C, D>(
    source: R,
    target: &mut C,
    options: ReaderOptions,
    decoder: D,
) -> Result<bool, Error>
where
    R: AsyncRead + Unpin,
    C: Extend<T>,
    D: Decode<T> + Unpin,
{
    AsyncValues::new(source, options, decoder)
        .collect_into(target)
        .await
}

impl<R, T, D> AsyncValues<R, T, D>
where
    R: AsyncRead + Unpin,
    D: Decode<T> + Unpin,
{
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

    /// Recover the source; see [`Values::into_inner`](crate::Values::into_inner).
    pub fn into_inner(mut self) -> Option<R> {
        self.source.take()
    }

    /// Drain the remaining values into `target`, skipping absent ones.
    ///
    /// # Errors
    ///
    /// Returns the first error the stream produced.
    pub async fn collect_into<C: Extend<T>>(mut self, target: &mut C) -> Result<bool, Error> {
        let mut appended = false;
        while let Some(item) = self.next().await {
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

    fn fail(&mut self, err: Error) -> Poll<Option<Result<Option<T>, Error>>> {
        self.drain.abort();
        self.release();
        Poll::Ready(Some(Err(err)))
    }
}

impl<R, T, D> Stream for AsyncValues<R, T, D>
where
    R: AsyncRead + Unpin,
    D: Decode<T> + Unpin,
{
    type Item = Result<Option<T>, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match this.drain.step() {
                Ok(Step::Value(value)) => return Poll::Ready(Some(Ok(value))),
                Ok(Step::NeedInput) => {}
                Ok(Step::Finished) => {
                    this.release();
                    return Poll::Ready(None);
                }
                Err(err) => return this.fail(err),
            }

            let Some(source) = this.source.as_mut() else {
                this.drain.finish();
                continue;
            };
            let committed = match ready!(Pin::new(source).poll_read(cx, this.drain.spare())) {
                Ok(n) => this.drain.commit(n),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => Ok(()),
                Err(err) => Err(err.into()),
            };
            if let Err(err) = committed {
                return this.fail(err);
            }
        }
    }
}

impl<R, T, D> FusedStream for AsyncValues<R, T, D>
where
    R: AsyncRead + Unpin,
    D: Decode<T> + Unpin,
{
    fn is_terminated(&self) -> bool {
        self.drain.is_finished()
    }
}
