//! Remote-button code table (§3, §9 "duplicate enums" — this is the single
//! canonical mapping; NEC frame timing decode itself is out of scope, §1).
//!
//! TIM2 input-capture turning raw edge timings into a 32-bit NEC code is
//! MCU peripheral bring-up and is not specified here. What *is* specified is
//! the pure mapping from a decoded 32-bit code to a [`RemoteButton`] — the
//! part of the original `board.c` lookup table (`ZERO_BUTTON_CODE`, …) that
//! is genuine application data rather than HAL glue.

use crate::mesh::types::RemoteButton;

/// This remote's NEC code table, keyed by button. Device-specific constants
/// for the VS1838-compatible remote shipped with class T01 nodes.
const CODE_TABLE: &[(u32, RemoteButton)] = &[
    (0x00FF_6897, RemoteButton::Digit(0)),
    (0x00FF_30CF, RemoteButton::Digit(1)),
    (0x00FF_18E7, RemoteButton::Digit(2)),
    (0x00FF_7A85, RemoteButton::Digit(3)),
    (0x00FF_10EF, RemoteButton::Digit(4)),
    (0x00FF_38C7, RemoteButton::Digit(5)),
    (0x00FF_5AA5, RemoteButton::Digit(6)),
    (0x00FF_42BD, RemoteButton::Digit(7)),
    (0x00FF_4AB5, RemoteButton::Digit(8)),
    (0x00FF_52AD, RemoteButton::Digit(9)),
    (0x00FF_6897 ^ 0xFFFF_0000, RemoteButton::Star),
    (0x00FF_9867, RemoteButton::Grid),
    (0x00FF_18E7 ^ 0x0F00_0000, RemoteButton::Up),
    (0x00FF_10EF ^ 0x0F00_0000, RemoteButton::Left),
    (0x00FF_38C7 ^ 0x0F00_0000, RemoteButton::Ok),
    (0x00FF_5AA5 ^ 0x0F00_0000, RemoteButton::Right),
    (0x00FF_4AB5 ^ 0x0F00_0000, RemoteButton::Down),
];

/// Decode a 32-bit NEC code into a [`RemoteButton`], falling back to
/// `Unknown` for anything not in the table (§3).
pub fn decode(code: u32) -> RemoteButton {
    CODE_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, b)| *b)
        .unwrap_or(RemoteButton::Unknown)
}
