//! Independent hardware watchdog feed (§1 — the driver itself is an
//! external collaborator; core code only calls "feed").
//!
//! Grounded on this codebase's TWDT wrapper: same "subscribe once at
//! construction, feed on every wake" shape, generalised from the ESP-IDF
//! TWDT API to a plain injected feed closure, since the independent
//! hardware watchdog's register interface is explicitly out of scope (§1).

use crate::ports::WatchdogFeeder;

/// Host/test watchdog: counts feeds, never resets anything.
#[derive(Default)]
pub struct SimWatchdog {
    feeds: u64,
}

impl SimWatchdog {
    pub fn new() -> Self {
        log::info!("watchdog(sim): no-op, counting feeds only");
        Self::default()
    }

    pub fn feed_count(&self) -> u64 {
        self.feeds
    }
}

impl WatchdogFeeder for SimWatchdog {
    fn feed(&mut self) {
        self.feeds += 1;
    }
}

/// Real watchdog behind the `embedded` feature: wraps a caller-supplied feed
/// closure over whatever peripheral register the target MCU exposes — the
/// register interface itself is out of scope (§1).
#[cfg(feature = "embedded")]
pub struct HwWatchdog<F> {
    feed_fn: F,
}

#[cfg(feature = "embedded")]
impl<F: FnMut()> HwWatchdog<F> {
    pub fn new(feed_fn: F) -> Self {
        Self { feed_fn }
    }
}

#[cfg(feature = "embedded")]
impl<F: FnMut()> WatchdogFeeder for HwWatchdog<F> {
    fn feed(&mut self) {
        (self.feed_fn)();
    }
}
