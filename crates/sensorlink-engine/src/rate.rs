//! Frames-per-second observable.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Shared read handle over the frame count of the last completed tick.
///
/// Cloning is cheap and every clone observes the same value, so a display
/// thread can poll it while the engine runs elsewhere.
#[derive(Debug, Clone, Default)]
pub struct FrameRate {
    value: Arc<AtomicU32>,
}

impl FrameRate {
    /// Create a rate reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames extracted during the last tick interval.
    pub fn get(&self) -> u32 {
        self.value.load(Ordering::Relaxed)
    }

    pub(crate) fn set(&self, frames: u32) {
        self.value.store(frames, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_value() {
        let rate = FrameRate::new();
        let observer = rate.clone();
        assert_eq!(observer.get(), 0);

        rate.set(42);
        assert_eq!(observer.get(), 42);
    }

    #[test]
    fn test_readable_from_another_thread() {
        let rate = FrameRate::new();
        rate.set(7);
        let observer = rate.clone();
        let seen = std::thread::spawn(move || observer.get()).join().unwrap();
        assert_eq!(seen, 7);
    }
}
