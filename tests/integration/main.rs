//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises one end-to-end scenario
//! from §8 (S1-S6) against the crate's own public ports and fakes. All
//! tests run on the host (x86_64) with no real hardware required.

mod fakes;

mod s1_mount_format_roundtrip;
mod s2_button_to_callback;
mod s3_inbound_set_mode_routed;
mod s4_outbound_temperature_relayed;
mod s5_reconnect_storm;
mod s6_queue_backpressure;
