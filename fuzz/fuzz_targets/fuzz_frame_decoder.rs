//! Fuzz target: `mesh::json::decode`
//!
//! Drives arbitrary byte sequences through the wire decoder (as whatever a
//! single `recv` could have handed the TCP client) and asserts it never
//! panics, and that anything it accepts re-encodes without panicking.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use meshnode_t01::mesh::json;
use meshnode_t01::mesh::types::{MAX_FRAME_LEN, TcpFrame};

fuzz_target!(|data: &[u8]| {
    let truncated = &data[..data.len().min(MAX_FRAME_LEN)];
    let Some(frame) = TcpFrame::new(truncated) else {
        return;
    };

    if let Ok(msg) = json::decode(&frame, 1) {
        let _ = json::encode(&msg);
    }
});
