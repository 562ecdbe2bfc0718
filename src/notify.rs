//! Per-task notification bitmask.
//!
//! Each of the three tasks owns one [`Notification`]: a 32-bit bitset that
//! peers and ISRs post bits into, and that the owning task waits on with a
//! timeout. Unlike `events.rs` in a ring-buffer design, posting the same bit
//! twice before it is read **collapses** to a single pending bit — this is
//! exactly the coalescing behaviour §5 requires for `STATUS_LED` and
//! `REMOTE_BUTTON`: the reader always observes the latest state under its
//! own mutex, so a collapsed edge is harmless.
//!
//! ISR-side posting must stay allocation-free and non-blocking: `post` only
//! sets bits and notifies a condvar, matching the "read hardware, post a
//! bit, exit" discipline in the design notes.

use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// A 32-bit, OR-accumulating, condvar-backed notification target.
pub struct Notification {
    bits: Mutex<u32>,
    ready: Condvar,
}

impl Notification {
    pub fn new() -> Self {
        Self {
            bits: Mutex::new(0),
            ready: Condvar::new(),
        }
    }

    /// Post (OR-accumulate) bits and wake one waiter. Safe to call from an
    /// ISR-equivalent context: never blocks, never allocates.
    pub fn post(&self, bits: u32) {
        let mut guard = self.bits.lock().unwrap_or_else(|e| e.into_inner());
        *guard |= bits;
        self.ready.notify_one();
    }

    /// Block until at least one bit is pending or `timeout` elapses,
    /// returning (and clearing) the accumulated bitmask. Returns `0` on
    /// timeout with nothing pending.
    pub fn wait(&self, timeout: Duration) -> u32 {
        let guard = self.bits.lock().unwrap_or_else(|e| e.into_inner());
        let (mut guard, _) = self
            .ready
            .wait_timeout_while(guard, timeout, |b| *b == 0)
            .unwrap_or_else(|e| e.into_inner());
        core::mem::take(&mut *guard)
    }

    /// Block with no timeout (unbounded wait), returning the accumulated
    /// bitmask once non-zero.
    pub fn wait_unbounded(&self) -> u32 {
        let guard = self.bits.lock().unwrap_or_else(|e| e.into_inner());
        let mut guard = self
            .ready
            .wait_while(guard, |b| *b == 0)
            .unwrap_or_else(|e| e.into_inner());
        core::mem::take(&mut *guard)
    }
}

impl Default for Notification {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn post_then_wait_returns_bits() {
        let n = Notification::new();
        n.post(0b0010);
        assert_eq!(n.wait(Duration::from_millis(10)), 0b0010);
    }

    #[test]
    fn repeated_posts_collapse_into_one_pending_wakeup() {
        let n = Notification::new();
        n.post(0b0001);
        n.post(0b0001);
        n.post(0b0010);
        // Both bits observed together; the duplicate post left no trace of
        // "twice" — only the OR of everything posted before the read.
        assert_eq!(n.wait(Duration::from_millis(10)), 0b0011);
        assert_eq!(n.wait(Duration::from_millis(10)), 0);
    }

    #[test]
    fn wait_times_out_with_nothing_pending() {
        let n = Notification::new();
        assert_eq!(n.wait(Duration::from_millis(5)), 0);
    }

    #[test]
    fn cross_thread_post_wakes_waiter() {
        let n = Arc::new(Notification::new());
        let n2 = n.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            n2.post(0b0100);
        });
        let bits = n.wait(Duration::from_secs(1));
        handle.join().unwrap();
        assert_eq!(bits, 0b0100);
    }
}
