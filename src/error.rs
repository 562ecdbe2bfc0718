//! Unified error types for the mesh node firmware.
//!
//! Follows this codebase's existing `error.rs` pattern: a top-level `Error`
//! enum that every subsystem converts into, keeping the three tasks' error
//! handling uniform, with one leaf error type per subsystem nested inside it.
//! Each leaf is `Copy`, implements `Display`, and converts into `Error` via
//! `From`, so a fallible call can `.map_err(|_| LeafError::Variant)?` and let
//! `?` perform the `From` conversion at the call site — unlike the leaf
//! types this pattern is grounded on, every leaf here is actually
//! constructed somewhere in the crate rather than left as reserved
//! scaffolding. All variants are `Copy` so they can be logged and discarded
//! without allocation — no operation in this crate unwinds a task on a
//! data-dependent error; every loop re-enters on the next iteration (see the
//! module docs on `board`, `mailbox::Mailbox`, and `tcp::client`).

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// HAL-layer initialisation failed; subsystem is left in a safe-off state.
    PeripheralInit(&'static str),
    /// ADC conversion did not complete within its timeout.
    AdcTimeout,
    /// SPI transaction failure.
    Spi(SpiError),
    /// I²C transaction failure.
    I2c(I2cError),
    /// W25Q32BV command-level failure.
    Flash(FlashError),
    /// LittleFS block-device failure.
    Fs(FsError),
    /// Node Mailbox pool exhaustion.
    Mailbox(MailboxError),
    /// Wire-protocol decode failure.
    Protocol(ProtocolError),
    /// W5500 PHY/socket failure.
    Link(LinkError),
    /// Precondition violation — a bug, reported with call-site location.
    InvalidArgument {
        reason: &'static str,
        file: &'static str,
        line: u32,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PeripheralInit(what) => write!(f, "peripheral init failed: {what}"),
            Self::AdcTimeout => write!(f, "ADC conversion timed out"),
            Self::Spi(e) => write!(f, "spi: {e}"),
            Self::I2c(e) => write!(f, "i2c: {e}"),
            Self::Flash(e) => write!(f, "flash: {e}"),
            Self::Fs(e) => write!(f, "fs: {e}"),
            Self::Mailbox(e) => write!(f, "mailbox: {e}"),
            Self::Protocol(e) => write!(f, "protocol: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::InvalidArgument { reason, file, line } => {
                write!(f, "invalid argument: {reason} ({file}:{line})")
            }
        }
    }
}

impl Error {
    /// Build an [`Error::InvalidArgument`] tagged with the caller's location.
    #[track_caller]
    pub fn invalid_argument(reason: &'static str) -> Self {
        let loc = core::panic::Location::caller();
        Self::InvalidArgument {
            reason,
            file: loc.file(),
            line: loc.line(),
        }
    }
}

// ---------------------------------------------------------------------------
// SPI errors
// ---------------------------------------------------------------------------

/// Transient SPI transaction failure (§4.4: every `W25Q32bv` command).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiError {
    /// The underlying `SpiDevice::transaction` call returned an error.
    Io,
}

impl fmt::Display for SpiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "SPI I/O error"),
        }
    }
}

impl From<SpiError> for Error {
    fn from(e: SpiError) -> Self {
        Self::Spi(e)
    }
}

// ---------------------------------------------------------------------------
// I2C errors
// ---------------------------------------------------------------------------

/// Transient I²C transaction failure (§4.1: the I/O expander).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I2cError {
    /// The underlying I²C transaction returned an error.
    Io,
}

impl fmt::Display for I2cError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "I2C I/O error"),
        }
    }
}

impl From<I2cError> for Error {
    fn from(e: I2cError) -> Self {
        Self::I2c(e)
    }
}

// ---------------------------------------------------------------------------
// Flash errors
// ---------------------------------------------------------------------------

/// W25Q32BV command-level failure, distinct from the raw SPI transport
/// failure that `SpiError` covers (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashError {
    /// Status register BUSY bit never cleared within the retry budget.
    Busy,
    /// The device returned a status inconsistent with the command issued.
    Protocol,
}

impl fmt::Display for FlashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "flash busy beyond retry budget"),
            Self::Protocol => write!(f, "flash returned unexpected status"),
        }
    }
}

impl From<FlashError> for Error {
    fn from(e: FlashError) -> Self {
        Self::Flash(e)
    }
}

// ---------------------------------------------------------------------------
// Filesystem errors
// ---------------------------------------------------------------------------

/// LittleFS block-device failure (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    /// A block-device `read`/`write`/`erase` returned `LFS_ERR_IO`; the
    /// mount is unusable.
    Io,
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "block device I/O error"),
        }
    }
}

impl From<FsError> for Error {
    fn from(e: FsError) -> Self {
        Self::Fs(e)
    }
}

// ---------------------------------------------------------------------------
// Mailbox errors
// ---------------------------------------------------------------------------

/// Node Mailbox pool failure (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxError {
    /// No free message slot was available within the bounded wait.
    QueueFull,
}

impl fmt::Display for MailboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull => write!(f, "no free message slot within bounded wait"),
        }
    }
}

impl From<MailboxError> for Error {
    fn from(e: MailboxError) -> Self {
        Self::Mailbox(e)
    }
}

// ---------------------------------------------------------------------------
// Protocol errors
// ---------------------------------------------------------------------------

/// Wire-protocol decode failure (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// JSON parse failure, or `recv` returned no usable bytes.
    Malformed,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed frame"),
        }
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

/// W5500 PHY/socket failure (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// PHY link is absent.
    Down,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Down => write!(f, "PHY link down"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
