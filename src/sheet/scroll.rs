//! Page scroll lock
//!
//! The page behind the sheet must not scroll while the sheet is open. The
//! lock is a guard value, so it is released however the sheet goes away.

use std::sync::Arc;

/// The page behind the sheet
pub trait PageScroll: Send + Sync {
    fn set_locked(&self, locked: bool);
}

/// Holds the page scroll lock until dropped
pub struct ScrollGuard {
    page: Arc<dyn PageScroll>,
}

impl ScrollGuard {
    pub fn acquire(page: Arc<dyn PageScroll>) -> Self {
        page.set_locked(true);
        Self { page }
    }
}

impl Drop for ScrollGuard {
    fn drop(&mut self) {
        self.page.set_locked(false);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::PageScroll;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Records the lock state
    #[derive(Default)]
    pub struct RecordingScroll {
        locked: AtomicBool,
    }

    impl RecordingScroll {
        pub fn is_locked(&self) -> bool {
            self.locked.load(Ordering::SeqCst)
        }
    }

    impl PageScroll for RecordingScroll {
        fn set_locked(&self, locked: bool) {
            self.locked.store(locked, Ordering::SeqCst);
        }
    }
}
