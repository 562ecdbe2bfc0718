//! W25Q32BV SPI NOR flash driver (§4.4).
//!
//! Command set, addressing, and timeout shape are carried over directly from
//! `original_source/src/devices/w25q32bv_flash.c`: a 3-byte big-endian
//! address after the opcode, a dummy byte after `FAST_READ`'s address, and a
//! status-register-1-bit-0 poll loop with a 1 ms delay between polls for
//! `wait_ready`. The C driver took raw `spi_select`/`spi_unselect`/`tx_rx`
//! function pointers; this driver instead takes one `embedded_hal::spi::SpiDevice`,
//! which already owns chip-select assertion around each `transaction` call.

use embedded_hal::spi::{Operation, SpiDevice};

use crate::error::{Error, Result, SpiError};
use crate::ports::Clock;

const READ_JEDEC_ID: u8 = 0x9F;
const READ_DATA: u8 = 0x03;
const FAST_READ: u8 = 0x0B;
const WRITE_ENABLE: u8 = 0x06;
const PAGE_PROGRAM: u8 = 0x02;
const SECTOR_ERASE: u8 = 0x20;
const BLOCK_ERASE: u8 = 0xD8;
const CHIP_ERASE: u8 = 0xC7;
const READ_STATUS_REGISTER_1: u8 = 0x05;
const POWER_DOWN: u8 = 0xB9;
const RELEASE_POWER_DOWN: u8 = 0xAB;

const DUMMY_BYTE: u8 = 0xA5;

/// Status register 1 bit 0 ("BUSY"), set while an erase/program/write-enable
/// command is in flight.
const STATUS_BUSY_BIT: u8 = 1;

/// Device geometry, fixed for this part (`w25q32bv_flash_init`).
pub const PAGE_SIZE: u32 = 256;
pub const SECTOR_SIZE: u32 = 4096;
pub const BLOCK_COUNT: u32 = 64;
pub const SECTOR_COUNT: u32 = BLOCK_COUNT * 16;
pub const PAGE_COUNT: u32 = (SECTOR_COUNT * SECTOR_SIZE) / PAGE_SIZE;
pub const BLOCK_SIZE: u32 = SECTOR_SIZE * 16;

/// JEDEC ID + derived capacity, as read back from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashInfo {
    pub jedec_id: u32,
    pub capacity_kbyte: u32,
}

fn address_bytes(address: u32) -> [u8; 3] {
    [
        ((address >> 16) & 0xFF) as u8,
        ((address >> 8) & 0xFF) as u8,
        (address & 0xFF) as u8,
    ]
}

/// W25Q32BV driver over one SPI device. `C: Clock` supplies the 1 ms poll
/// delay used by [`W25Q32bv::wait_ready`].
pub struct W25Q32bv<SPI, C> {
    spi: SPI,
    clock: C,
}

impl<SPI: SpiDevice, C: Clock> W25Q32bv<SPI, C> {
    pub fn new(spi: SPI, clock: C) -> Self {
        Self { spi, clock }
    }

    pub fn read_info(&mut self) -> Result<FlashInfo> {
        let mut rx = [0u8; 3];
        self.spi
            .transaction(&mut [
                Operation::Write(&[READ_JEDEC_ID, DUMMY_BYTE]),
                Operation::Read(&mut rx),
            ])
            .map_err(|_| Error::Spi(SpiError::Io))?;
        let jedec_id = u32::from(rx[0]) << 16 | u32::from(rx[1]) << 8 | u32::from(rx[2]);
        Ok(FlashInfo {
            jedec_id,
            capacity_kbyte: (SECTOR_COUNT * SECTOR_SIZE) / 1024,
        })
    }

    /// Plain (non-`FAST_READ`) read: no dummy byte after the address, so no
    /// speed penalty avoided — present because the original driver exposes
    /// both and `blockdevice.rs` prefers the fast variant for bulk reads.
    pub fn read_data(&mut self, sector_number: u32, sector_offset: u32, data: &mut [u8]) -> Result<()> {
        let address = sector_number * SECTOR_SIZE + sector_offset;
        let addr = address_bytes(address);
        self.spi
            .transaction(&mut [Operation::Write(&[READ_DATA, addr[0], addr[1], addr[2]]), Operation::Read(data)])
            .map_err(|_| Error::Spi(SpiError::Io))
    }

    pub fn read_data_fast(&mut self, sector_number: u32, sector_offset: u32, data: &mut [u8]) -> Result<()> {
        let address = sector_number * SECTOR_SIZE + sector_offset;
        let addr = address_bytes(address);
        self.spi
            .transaction(&mut [
                Operation::Write(&[FAST_READ, addr[0], addr[1], addr[2], 0]),
                Operation::Read(data),
            ])
            .map_err(|_| Error::Spi(SpiError::Io))
    }

    /// Caller is responsible for calling this immediately before any
    /// program/erase command, and for calling [`Self::wait_ready`] after it.
    pub fn enable_erasing_or_writing(&mut self) -> Result<()> {
        self.spi.write(&[WRITE_ENABLE]).map_err(|_| Error::Spi(SpiError::Io))?;
        self.clock.delay_ms(1);
        Ok(())
    }

    /// Write up to one page. `size + offset <= PAGE_SIZE` and `size > 0`,
    /// else [`Error::invalid_argument`] — matches the C driver's precondition
    /// exactly (`w25q32bv_flash_write_page`). Caller must have already called
    /// [`Self::enable_erasing_or_writing`] and must call [`Self::wait_ready`]
    /// afterwards.
    pub fn write_page(&mut self, page_number: u32, page_offset: u32, data: &[u8]) -> Result<()> {
        if data.is_empty() || u32::try_from(data.len()).unwrap_or(u32::MAX) + page_offset > PAGE_SIZE {
            return Err(Error::invalid_argument("write_page size+offset exceeds page"));
        }
        let address = page_number * PAGE_SIZE + page_offset;
        let addr = address_bytes(address);
        self.spi
            .transaction(&mut [Operation::Write(&[PAGE_PROGRAM, addr[0], addr[1], addr[2]]), Operation::Write(data)])
            .map_err(|_| Error::Spi(SpiError::Io))
    }

    pub fn erase_sector(&mut self, sector_number: u32) -> Result<()> {
        let addr = address_bytes(sector_number * SECTOR_SIZE);
        self.spi
            .write(&[SECTOR_ERASE, addr[0], addr[1], addr[2]])
            .map_err(|_| Error::Spi(SpiError::Io))
    }

    pub fn erase_block(&mut self, block_number: u32) -> Result<()> {
        let addr = address_bytes(block_number * BLOCK_SIZE);
        self.spi
            .write(&[BLOCK_ERASE, addr[0], addr[1], addr[2]])
            .map_err(|_| Error::Spi(SpiError::Io))
    }

    pub fn erase_chip(&mut self) -> Result<()> {
        self.spi.write(&[CHIP_ERASE]).map_err(|_| Error::Spi(SpiError::Io))
    }

    /// Poll status register 1 bit 0 until clear, delaying 1 ms between polls
    /// (`w25q32bv_flash_wait_erasing_or_writing`). No retry budget/timeout in
    /// the original driver either — a stuck BUSY bit means a dead part, not
    /// a recoverable condition.
    pub fn wait_ready(&mut self) -> Result<()> {
        loop {
            let mut status = [0u8; 1];
            self.spi
                .transaction(&mut [Operation::Write(&[READ_STATUS_REGISTER_1]), Operation::Read(&mut status)])
                .map_err(|_| Error::Spi(SpiError::Io))?;
            if status[0] & STATUS_BUSY_BIT == 0 {
                return Ok(());
            }
            self.clock.delay_ms(1);
        }
    }

    pub fn power_down(&mut self) -> Result<()> {
        self.spi.write(&[POWER_DOWN]).map_err(|_| Error::Spi(SpiError::Io))
    }

    pub fn release_power_down(&mut self) -> Result<()> {
        self.spi.write(&[RELEASE_POWER_DOWN]).map_err(|_| Error::Spi(SpiError::Io))
    }
}
