//! Host-side fakes used by `main.rs`'s demo wiring. MCU peripheral bring-up
//! is explicitly out of scope (§1); what's exercised on host is the shape
//! of the three activities and their message plane, not real silicon.
//!
//! Grounded on this codebase's `adapters::wifi`-style `sim_connect_counter`
//! fakes: small, observable stand-ins for hardware, not full simulators.

use std::time::{Duration, Instant};

use crate::error::{LinkError, Result};
use crate::ports::{AdcChannel, Clock, FlashSubsystem, IoExpander, PwmChannel};
use crate::tcp::client::{SocketInterrupts, W5500Bus};

/// Wall-clock [`Clock`] for host builds — real elapsed time since
/// construction, used for reconnect backoff and the photoresistor timer.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
    fn delay_ms(&self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

/// No I²C expander present on host; always reports success.
#[derive(Default)]
pub struct NullIoExpander;

impl IoExpander for NullIoExpander {
    fn configure_outputs_low(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A PWM channel with no real timer behind it — only tracks on/off.
#[derive(Default)]
pub struct NullPwmChannel {
    running: bool,
}

impl PwmChannel for NullPwmChannel {
    fn start(&mut self) {
        self.running = true;
    }
    fn stop(&mut self) {
        self.running = false;
    }
    fn is_running(&self) -> bool {
        self.running
    }
}

/// No photoresistor divider on host; always times out, so the Board
/// supervisor's sampling loop exercises its "no successful samples" path.
#[derive(Default)]
pub struct NullAdcChannel;

impl AdcChannel for NullAdcChannel {
    fn read(&mut self, _timeout: Duration) -> Option<u16> {
        None
    }
}

/// No W25Q32BV/LittleFS media on host; mount is a no-op success so the
/// Board supervisor's startup sequence completes without real flash.
#[derive(Default)]
pub struct NullFlashSubsystem;

impl FlashSubsystem for NullFlashSubsystem {
    fn mount_or_format(&mut self) -> Result<()> {
        Ok(())
    }
    fn power_down(&mut self) {}
}

/// No W5500 present on host: PHY link is always down, so the TCP client's
/// reconnect loop runs for real (the shape under test in `tcp::client`) but
/// never actually opens a socket. Demonstrates the activity shape, not real
/// networking — wiring a real `RealW5500Bus` (the `embedded` feature) is
/// the on-target equivalent.
#[derive(Default)]
pub struct NullW5500Bus;

impl W5500Bus for NullW5500Bus {
    fn configure(&mut self, _network: &crate::config::NetworkConfig) -> Result<()> {
        Ok(())
    }
    fn phy_link_up(&mut self) -> Result<bool> {
        Ok(false)
    }
    fn is_close_wait(&mut self) -> Result<bool> {
        Ok(false)
    }
    fn open_tcp(&mut self) -> Result<()> {
        Ok(())
    }
    fn connect(&mut self, _server_ip: [u8; 4], _server_port: u16) -> Result<()> {
        Err(crate::error::Error::Link(LinkError::Down))
    }
    fn disconnect(&mut self) -> Result<()> {
        Ok(())
    }
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
    fn enable_interrupts(&mut self, _received: bool, _disconnected: bool) -> Result<()> {
        Ok(())
    }
    fn disable_interrupts(&mut self) -> Result<()> {
        Ok(())
    }
    fn read_and_clear_interrupts(&mut self) -> Result<SocketInterrupts> {
        Ok(SocketInterrupts::default())
    }
    fn recv(&mut self, _buf: &mut [u8]) -> Result<usize> {
        Ok(0)
    }
    fn send(&mut self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}
