//! Time sources
//!
//! The engine samples its time source once per redemption call, so every hook
//! in the call observes the same instant.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of the current Unix time in seconds.
pub trait TimeSource: Send + Sync + std::fmt::Debug {
    /// Current Unix time in seconds
    fn now_secs(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_secs(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

/// Controllable time for deterministic tests and simulation.
#[derive(Debug, Default)]
pub struct FixedTime {
    secs: AtomicU64,
}

impl FixedTime {
    /// Start at the given instant
    pub fn new(secs: u64) -> Self {
        Self {
            secs: AtomicU64::new(secs),
        }
    }

    /// Jump to an instant
    pub fn set(&self, secs: u64) {
        self.secs.store(secs, Ordering::SeqCst);
    }

    /// Move forward by `delta` seconds
    pub fn advance(&self, delta: u64) {
        self.secs.fetch_add(delta, Ordering::SeqCst);
    }
}

impl TimeSource for FixedTime {
    fn now_secs(&self) -> u64 {
        self.secs.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_time_advances() {
        let t = FixedTime::new(100);
        t.advance(5);
        assert_eq!(t.now_secs(), 105);
        t.set(7);
        assert_eq!(t.now_secs(), 7);
    }
}
