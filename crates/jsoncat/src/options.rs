use crate::Error;

/// How the scanner decides where one value ends and the next begins.
///
/// # Default
///
/// [`ScanStrategy::Structural`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanStrategy {
    /// Skip over the object token by token, tracking nesting, until its
    /// matching close brace. Values may span lines and may share a line.
    #[default]
    Structural,
    /// Treat everything from the opening brace up to the next `\n` as one
    /// value. Cheaper, but each object must sit on a single line.
    Newline,
}

/// Read tuning for the byte source.
///
/// # Examples
///
/// ```rust
/// use jsoncat::SourceOptions;
///
/// let options = SourceOptions {
///     buffer_size: 1,
///     minimum_read_size: 1,
///     ..Default::default()
/// };
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceOptions {
    /// Size of each chunk allocated for reads, and so the largest number of
    /// bytes requested from the source at once.
    ///
    /// # Default
    ///
    /// `4096`
    pub buffer_size: usize,

    /// Smallest leftover space in the tail chunk worth reading into. When the
    /// tail has fewer free bytes than this, a fresh chunk is allocated.
    ///
    /// # Default
    ///
    /// `1024`
    pub minimum_read_size: usize,

    /// Backlog, in bytes, at which a [`pipe`](crate::pipe()) writer blocks.
    ///
    /// # Default
    ///
    /// `65536`
    pub pause_threshold: usize,

    /// Backlog, in bytes, at or below which a paused writer is woken.
    ///
    /// # Default
    ///
    /// `32768`
    pub resume_threshold: usize,

    /// Keep the source alive after the drain completes so it can be recovered
    /// with `into_inner`.
    ///
    /// # Default
    ///
    /// `false`
    pub leave_open: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            buffer_size: 4096,
            minimum_read_size: 1024,
            pause_threshold: 64 * 1024,
            resume_threshold: 32 * 1024,
            leave_open: false,
        }
    }
}

impl SourceOptions {
    /// Check the option invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when a size is zero or the
    /// thresholds are inverted.
    pub fn validate(&self) -> Result<(), Error> {
        if self.buffer_size == 0 {
            return Err(Error::InvalidArgument("buffer_size must be non-zero"));
        }
        if self.minimum_read_size == 0 || self.minimum_read_size > self.buffer_size {
            return Err(Error::InvalidArgument(
                "minimum_read_size must be in 1..=buffer_size",
            ));
        }
        if self.pause_threshold == 0 {
            return Err(Error::InvalidArgument("pause_threshold must be non-zero"));
        }
        if self.resume_threshold > self.pause_threshold {
            return Err(Error::InvalidArgument(
                "resume_threshold must not exceed pause_threshold",
            ));
        }
        Ok(())
    }
}

/// Options for one read operation. Never mutated while a stream drains.
///
/// # Examples
///
/// ```rust
/// use jsoncat::{ReaderOptions, ScanStrategy};
///
/// let options = ReaderOptions {
///     strategy: ScanStrategy::Newline,
///     ..Default::default()
/// };
/// # let _ = options;
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Boundary detection policy.
    pub strategy: ScanStrategy,
    /// Source read tuning.
    pub source: SourceOptions,
}

impl ReaderOptions {
    /// Shorthand for default options with the given strategy.
    #[must_use]
    pub fn with_strategy(strategy: ScanStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// See [`SourceOptions::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for inconsistent source options.
    pub fn validate(&self) -> Result<(), Error> {
        self.source.validate()
    }
}
