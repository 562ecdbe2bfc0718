//! Capability traits — the hexagonal boundary between the core runtime and
//! its hardware/application collaborators.
//!
//! The source composes behaviour via function-pointer structs passed to each
//! init (`board_T01_init(callbacks...)`, `node_init(callbacks...)`). This
//! crate re-expresses that as a small set of capability traits per
//! component; each component owns references to the capabilities it needs,
//! and construction is a builder that wires concrete implementations
//! (real or simulated) in at the top level — see `main.rs`.
//!
//! `embedded-hal` already supplies `SpiDevice` and `I2c`, so those two
//! capabilities are used directly rather than re-wrapped.

use crate::error::Result;
use crate::mesh::types::{NodeMessage, RemoteButton, TcpFrame};
use core::time::Duration;

/// Millisecond-resolution clock/delay capability, used for `wait_ready`
/// polling, ADC timeouts, and reconnect backoff.
pub trait Clock {
    fn now(&self) -> Duration;
    fn delay_ms(&self, ms: u32);
}

/// Feeds the independent hardware watchdog. The Board supervisor calls this
/// on every wake, including timeout wakes.
pub trait WatchdogFeeder {
    fn feed(&mut self);
}

/// A single-channel PWM output, used to drive one LED colour channel.
pub trait PwmChannel {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// 12-bit ADC sampling capability for the photoresistor divider.
pub trait AdcChannel {
    /// Returns a 12-bit sample, or `None` on timeout.
    fn read(&mut self, timeout: Duration) -> Option<u16>;
}

/// Delivers an inbound `NodeMessage` to the application layer. The
/// application layer's own behaviour is out of scope (§1); this is only the
/// delivery boundary.
pub trait NodeSink {
    fn deliver(&mut self, msg: &NodeMessage);
}

/// Delivers an outbound `TcpFrame` to the TCP client for transmission.
pub trait TcpSink {
    fn transmit(&mut self, frame: &TcpFrame) -> Result<()>;
}

/// Application callback for a decoded remote-button press.
pub trait RemoteButtonSink {
    fn process_remote_button(&mut self, button: RemoteButton);
}

/// Application callback for a completed photoresistor sample, returning the
/// next one-shot timer period in milliseconds.
pub trait PhotoresistorSink {
    fn process_sample(&mut self, sample: crate::mesh::types::PhotoresistorSample) -> u32;
    /// Whether the application currently wants the LED dark for the
    /// measurement window ("lightning off" per §4.1).
    fn lightning_off(&self) -> bool;
}

/// The I²C I/O expander brought up in Board supervisor startup step 1.
pub trait IoExpander {
    /// Configure both ports as outputs driven low.
    fn configure_outputs_low(&mut self) -> Result<()>;
}

/// Flash + filesystem lifecycle used only at Board supervisor startup step 2
/// (mount-or-format, then power the flash down). The day-to-day read/write
/// surface lives behind `littlefs2`'s own `Storage` trait, not here.
pub trait FlashSubsystem {
    /// Bring the flash up, attempt a LittleFS mount, format-and-retry on
    /// mount failure.
    fn mount_or_format(&mut self) -> Result<()>;
    /// Power the flash down after the mount step completes.
    fn power_down(&mut self);
}

/// Starts the TCP client task (Board supervisor startup step 3). The task's
/// own run loop and reconnect behaviour live in `tcp::client`; this is only
/// the handle the Board supervisor uses to kick it off.
pub trait TcpClientControl {
    fn start(&mut self);
}

/// Delivers an inbound frame received by the TCP client to the Node
/// mailbox. Separate from [`NodeSink`] because the TCP client only ever
/// hands over raw frames — decoding into a `NodeMessage` is the mailbox's
/// job, not the TCP client's.
pub trait FrameSink {
    fn deliver_frame(&self, frame: &TcpFrame);
}
