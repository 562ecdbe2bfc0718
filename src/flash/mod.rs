//! Flash + filesystem subsystem (§4.4, §4.5): the W25Q32BV command driver
//! and its LittleFS `Storage` binding.

pub mod blockdevice;
pub mod w25q;

pub use blockdevice::FlashFilesystem;
pub use w25q::W25Q32bv;
