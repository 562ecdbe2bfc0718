//! Shared fakes for the end-to-end scenario tests (§8 S1-S6).
//!
//! Same role as this codebase's `tests/integration/mock_hw.rs`: small,
//! observable stand-ins for hardware and the application layer, built
//! against the crate's own capability traits rather than re-deriving a
//! hardware simulator.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use embedded_hal::spi::{ErrorType, Operation, SpiDevice};

use meshnode_t01::error::Result;
use meshnode_t01::mesh::types::{NodeMessage, PhotoresistorSample, RemoteButton, TcpFrame};
use meshnode_t01::ports::{
    Clock, FlashSubsystem, NodeSink, PhotoresistorSink, RemoteButtonSink, TcpSink,
};
use meshnode_t01::tcp::client::{SocketInterrupts, W5500Bus};

#[derive(Clone, Default)]
pub struct FakeClock;

impl Clock for FakeClock {
    fn now(&self) -> Duration {
        Duration::ZERO
    }
    fn delay_ms(&self, _ms: u32) {}
}

/// A flash-shaped in-memory SPI device: `PAGE_PROGRAM` writes into a byte
/// buffer, `FAST_READ`/`READ_DATA` read back from it, status register
/// always reports ready. Lets S1 exercise a real LittleFS mount/format
/// cycle without touching real SPI silicon.
pub struct MemSpi {
    bytes: RefCell<Vec<u8>>,
}

impl MemSpi {
    pub fn erased(capacity: usize) -> Self {
        Self {
            bytes: RefCell::new(vec![0xFFu8; capacity]),
        }
    }

    fn address_from(bytes: &VecDeque<u8>, skip: usize) -> usize {
        let b: Vec<u8> = bytes.iter().copied().skip(skip).take(3).collect();
        ((b[0] as usize) << 16) | ((b[1] as usize) << 8) | (b[2] as usize)
    }
}

#[derive(Debug)]
pub struct FakeSpiError;
impl embedded_hal::spi::Error for FakeSpiError {
    fn kind(&self) -> embedded_hal::spi::ErrorKind {
        embedded_hal::spi::ErrorKind::Other
    }
}
impl ErrorType for MemSpi {
    type Error = FakeSpiError;
}
impl SpiDevice for MemSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> core::result::Result<(), Self::Error> {
        let mut pending_write: VecDeque<u8> = VecDeque::new();
        let mut opcode = None;
        for op in operations.iter_mut() {
            match op {
                Operation::Write(data) => {
                    if opcode.is_none() {
                        opcode = Some(data[0]);
                    }
                    pending_write.extend(data.iter().copied());
                }
                Operation::Read(buf) => {
                    if opcode == Some(0x9F) {
                        // READ_JEDEC_ID: any fixed non-zero id works for S1.
                        let id = [0xEFu8, 0x40, 0x16];
                        for (i, b) in buf.iter_mut().enumerate() {
                            *b = id.get(i).copied().unwrap_or(0);
                        }
                    } else if opcode == Some(0x05) {
                        buf[0] = 0;
                    } else if opcode == Some(0x0B) {
                        let addr = Self::address_from(&pending_write, 1);
                        let bytes = self.bytes.borrow();
                        for (i, b) in buf.iter_mut().enumerate() {
                            *b = bytes.get(addr + i).copied().unwrap_or(0xFF);
                        }
                    }
                }
                _ => {}
            }
        }
        if opcode == Some(0x02) {
            let addr = Self::address_from(&pending_write, 1);
            let data: Vec<u8> = pending_write.iter().copied().skip(4).collect();
            let mut bytes = self.bytes.borrow_mut();
            if bytes.len() < addr + data.len() {
                bytes.resize(addr + data.len(), 0xFF);
            }
            bytes[addr..addr + data.len()].copy_from_slice(&data);
        }
        if opcode == Some(0x20) {
            // SECTOR_ERASE: reset the addressed 4 KiB sector to erased state.
            let addr = Self::address_from(&pending_write, 1);
            let mut bytes = self.bytes.borrow_mut();
            let end = (addr + 4096).min(bytes.len());
            for b in &mut bytes[addr..end] {
                *b = 0xFF;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNodeSink {
    pub received: Vec<NodeMessage>,
}
impl NodeSink for RecordingNodeSink {
    fn deliver(&mut self, msg: &NodeMessage) {
        self.received.push(msg.clone());
    }
}

#[derive(Default)]
pub struct RecordingTcpSink {
    pub sent: Vec<TcpFrame>,
}
impl TcpSink for RecordingTcpSink {
    fn transmit(&mut self, frame: &TcpFrame) -> Result<()> {
        self.sent.push(frame.clone());
        Ok(())
    }
}

/// Application stand-in for the Board supervisor's two callback traits,
/// tracked via a shared counter since `BoardSupervisor` owns it by value.
#[derive(Clone, Default)]
pub struct CountingApp {
    pub button_calls: Rc<RefCell<Vec<RemoteButton>>>,
}
impl RemoteButtonSink for CountingApp {
    fn process_remote_button(&mut self, button: RemoteButton) {
        self.button_calls.borrow_mut().push(button);
    }
}
impl PhotoresistorSink for CountingApp {
    fn process_sample(&mut self, _sample: PhotoresistorSample) -> u32 {
        30_000
    }
    fn lightning_off(&self) -> bool {
        false
    }
}

/// Scripted W5500 bus, same shape as `tcp::client`'s own test fake: each
/// scripted method pops the front of its queue, unscripted calls return a
/// sensible default (§4.3, driving S5).
#[derive(Default)]
pub struct ScriptedBus {
    pub link_up: VecDeque<bool>,
    pub connect_results: VecDeque<Result<()>>,
}
impl W5500Bus for ScriptedBus {
    fn configure(&mut self, _network: &meshnode_t01::config::NetworkConfig) -> Result<()> {
        Ok(())
    }
    fn phy_link_up(&mut self) -> Result<bool> {
        Ok(self.link_up.pop_front().unwrap_or(true))
    }
    fn is_close_wait(&mut self) -> Result<bool> {
        Ok(false)
    }
    fn open_tcp(&mut self) -> Result<()> {
        Ok(())
    }
    fn connect(&mut self, _ip: [u8; 4], _port: u16) -> Result<()> {
        self.connect_results.pop_front().unwrap_or(Ok(()))
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

#[derive(Default)]
pub struct CountingFlash {
    pub mount_calls: u32,
    pub power_down_calls: Arc<Mutex<u32>>,
}
impl FlashSubsystem for CountingFlash {
    fn mount_or_format(&mut self) -> Result<()> {
        self.mount_calls += 1;
        Ok(())
    }
    fn power_down(&mut self) {
        *self.power_down_calls.lock().unwrap() += 1;
    }
}
