//! LittleFS `Storage` binding over the W25Q32BV (§4.5).
//!
//! `original_source/src/storage.c` wires `lfs_config` directly to the
//! driver: `block_size = w25q32bv_flash.sector_size`, `block_count =
//! w25q32bv_flash.sector_count`, read/prog/erase forwarding straight to the
//! flash functions, one block == one erase sector. This module is the same
//! wiring expressed as `littlefs2::driver::Storage`.
//!
//! `littlefs2` requires `READ_SIZE`/`WRITE_SIZE` to divide `BLOCK_SIZE` and
//! addresses every operation in block-relative offsets; `prog` here loops
//! page-by-page since the W25Q32BV only accepts one page (256 B) per
//! `PAGE_PROGRAM` command.

use littlefs2::driver::Storage;
use littlefs2::io::Result as LfsResult;

use crate::error::{Error, FsError, Result, SpiError};
use crate::flash::w25q::{FlashInfo, W25Q32bv, BLOCK_SIZE, PAGE_SIZE, SECTOR_COUNT, SECTOR_SIZE};
use crate::ports::{Clock, FlashSubsystem};
use embedded_hal::spi::SpiDevice;

/// §9 open-question decision: `cache_size = 512`, paired with
/// `read_size = prog_size = 16` (see DESIGN.md).
const READ_WRITE_GRANULARITY: usize = 16;
const LOOKAHEAD_SIZE: usize = 16;

/// `littlefs2::driver::Storage` over the W25Q32BV, one block per 4 KiB
/// erase sector (§4.5).
pub struct W25QBlockDevice<SPI, C> {
    flash: W25Q32bv<SPI, C>,
}

impl<SPI: SpiDevice, C: Clock> W25QBlockDevice<SPI, C> {
    pub fn new(flash: W25Q32bv<SPI, C>) -> Self {
        Self { flash }
    }

    fn sector_of(off: usize) -> (u32, u32) {
        let sector_size = SECTOR_SIZE as usize;
        ((off / sector_size) as u32, (off % sector_size) as u32)
    }
}

impl<SPI: SpiDevice, C: Clock> Storage for W25QBlockDevice<SPI, C> {
    const READ_SIZE: usize = READ_WRITE_GRANULARITY;
    const WRITE_SIZE: usize = READ_WRITE_GRANULARITY;
    const BLOCK_SIZE: usize = SECTOR_SIZE as usize;
    const BLOCK_COUNT: usize = SECTOR_COUNT as usize;
    const BLOCK_CYCLES: isize = 500;
    const CACHE_SIZE: usize = 512;
    const LOOKAHEAD_SIZE: usize = LOOKAHEAD_SIZE;

    fn read(&mut self, off: usize, buf: &mut [u8]) -> LfsResult<usize> {
        let (sector, offset) = Self::sector_of(off);
        self.flash
            .read_data_fast(sector, offset, buf)
            .map(|()| buf.len())
            .map_err(|_| littlefs2::io::Error::IO)
    }

    fn write(&mut self, off: usize, data: &[u8]) -> LfsResult<usize> {
        let mut written = 0usize;
        while written < data.len() {
            let absolute = off + written;
            let page_number = (absolute as u32) / PAGE_SIZE;
            let page_offset = (absolute as u32) % PAGE_SIZE;
            let chunk_len = ((PAGE_SIZE - page_offset) as usize).min(data.len() - written);
            let chunk = &data[written..written + chunk_len];

            self.flash
                .enable_erasing_or_writing()
                .map_err(|_| littlefs2::io::Error::IO)?;
            self.flash
                .write_page(page_number, page_offset, chunk)
                .map_err(|_| littlefs2::io::Error::IO)?;
            self.flash
                .wait_ready()
                .map_err(|_| littlefs2::io::Error::IO)?;

            written += chunk_len;
        }
        Ok(written)
    }

    fn erase(&mut self, off: usize, len: usize) -> LfsResult<usize> {
        let sector_size = SECTOR_SIZE as usize;
        debug_assert_eq!(off % sector_size, 0);
        debug_assert_eq!(len % sector_size, 0);
        let first = (off / sector_size) as u32;
        let count = (len / sector_size) as u32;
        for sector in first..first + count {
            self.flash
                .enable_erasing_or_writing()
                .map_err(|_| littlefs2::io::Error::IO)?;
            self.flash
                .erase_sector(sector)
                .map_err(|_| littlefs2::io::Error::IO)?;
            self.flash
                .wait_ready()
                .map_err(|_| littlefs2::io::Error::IO)?;
        }
        Ok(len)
    }
}

/// Brings the flash up, mounts LittleFS, formatting on the first mount
/// failure, then lets the Board supervisor power the chip down — the exact
/// three-call shape `board.c`'s startup step 2 uses
/// (`w25q32bv_flash_release_power_down` → mount-or-format → `_power_down`).
pub struct FlashFilesystem<SPI, C> {
    device: W25QBlockDevice<SPI, C>,
    fs_alloc: littlefs2::fs::Allocation<W25QBlockDevice<SPI, C>>,
    mounted: bool,
}

impl<SPI: SpiDevice, C: Clock> FlashFilesystem<SPI, C> {
    pub fn new(flash: W25Q32bv<SPI, C>) -> Self {
        Self {
            device: W25QBlockDevice::new(flash),
            fs_alloc: littlefs2::fs::Filesystem::allocate(),
            mounted: false,
        }
    }

    pub fn info(&mut self) -> Result<FlashInfo> {
        self.device.flash.read_info()
    }
}

impl<SPI: SpiDevice, C: Clock> FlashSubsystem for FlashFilesystem<SPI, C> {
    fn mount_or_format(&mut self) -> Result<()> {
        self.device
            .flash
            .release_power_down()
            .map_err(|_| Error::Spi(SpiError::Io))?;

        match littlefs2::fs::Filesystem::mount(&mut self.fs_alloc, &mut self.device) {
            Ok(_fs) => {
                self.mounted = true;
                Ok(())
            }
            Err(_) => {
                littlefs2::fs::Filesystem::format(&mut self.device).map_err(|_| Error::Fs(FsError::Io))?;
                littlefs2::fs::Filesystem::mount(&mut self.fs_alloc, &mut self.device)
                    .map_err(|_| Error::Fs(FsError::Io))?;
                self.mounted = true;
                Ok(())
            }
        }
    }

    fn power_down(&mut self) {
        // Power-down is the unconditional last step of board startup
        // regardless of whether mount succeeded (§4.1 startup step 2).
        let _ = self.device.flash.power_down();
        self.mounted = false;
    }
}
