use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flag shared between a drain and its controller.
///
/// The drain checks it once per source read; a cancelled drain ends like a
/// normal end of stream and releases its source.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Request cancellation. Returns `true` on the first call only.
    pub fn cancel(&self) -> bool {
        self.flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
