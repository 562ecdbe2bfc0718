//! Class T01 mesh node firmware library.
//!
//! Exposes the three cooperating activities (Board supervisor, Node
//! mailbox, TCP client), the hexagonal capability traits they're built
//! against, and the two hard subsystems they rely on (the W25Q32BV/LittleFS
//! block device and the W5500 TCP socket state machine). Real MCU bindings
//! live behind the `embedded` feature; host builds (including this crate's
//! own test suite) use the `sim` fakes instead.

#![deny(unused_must_use)]

pub mod board;
pub mod config;
pub mod drivers;
pub mod error;
pub mod flash;
pub mod mailbox;
pub mod mesh;
pub mod notify;
pub mod ports;
pub mod sim;
pub mod tcp;
