//! S1 (§8): erased flash -> corrupt mount -> format -> mount -> file
//! round-trip, against a real `littlefs2::fs::Filesystem` over the
//! `W25QBlockDevice` adapter.

use littlefs2::fs::Filesystem;
use littlefs2::path::PathBuf;

use meshnode_t01::flash::blockdevice::W25QBlockDevice;
use meshnode_t01::flash::w25q::{SECTOR_COUNT, SECTOR_SIZE, W25Q32bv};

use crate::fakes::{FakeClock, MemSpi};

#[test]
fn mount_format_roundtrip() {
    let spi = MemSpi::erased((SECTOR_COUNT * SECTOR_SIZE) as usize);
    let flash = W25Q32bv::new(spi, FakeClock);
    let mut device = W25QBlockDevice::new(flash);

    let mut alloc = Filesystem::allocate();
    assert!(
        Filesystem::mount(&mut alloc, &mut device).is_err(),
        "mounting an erased device must fail (LFS_ERR_CORRUPT)"
    );

    Filesystem::format(&mut device).expect("format must succeed on an erased device");

    let fs = Filesystem::mount(&mut alloc, &mut device).expect("mount must succeed after format");

    let path = PathBuf::from("hello");
    fs.write(&path, b"hi").expect("file create+write must succeed");

    let contents: heapless::Vec<u8, 32> = fs.read(&path).expect("file reopen+read must succeed");
    assert_eq!(contents.as_slice(), b"hi");
    assert_eq!(contents.len(), 2);
}
