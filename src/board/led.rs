//! Status-LED colour → PWM-channel mapping (§4.1 table).
//!
//! Final and replaces any code-sourced policy: exactly one of
//! `{TIM2.ch2, TIM3.ch1, TIM3.ch2}` is enabled at any instant (§8 property
//! 2). A colour change always stops every channel before starting the new
//! one — `apply` never leaves two channels running simultaneously, even
//! transiently, because it stops first and starts second.

use crate::mesh::types::BoardLedColor;
use crate::ports::PwmChannel;

/// The three PWM channels the status LED is wired to.
pub struct LedChannels<G, R, B> {
    pub tim2_ch2_green: G,
    pub tim3_ch1_red: R,
    pub tim3_ch2_blue: B,
}

impl<G: PwmChannel, R: PwmChannel, B: PwmChannel> LedChannels<G, R, B> {
    /// Reconfigure the channels so that exactly `color` is emitting.
    pub fn apply(&mut self, color: BoardLedColor) {
        // Stop all channels first so no two are ever simultaneously active.
        self.tim2_ch2_green.stop();
        self.tim3_ch1_red.stop();
        self.tim3_ch2_blue.stop();

        match color {
            BoardLedColor::None => {}
            BoardLedColor::Green => self.tim2_ch2_green.start(),
            BoardLedColor::Red => self.tim3_ch1_red.start(),
            BoardLedColor::Blue => self.tim3_ch2_blue.start(),
        }
    }

    /// True if at most one channel is running — the invariant this type
    /// exists to preserve (§8 property 2).
    pub fn at_most_one_active(&self) -> bool {
        let count = [
            self.tim2_ch2_green.is_running(),
            self.tim3_ch1_red.is_running(),
            self.tim3_ch2_blue.is_running(),
        ]
        .iter()
        .filter(|b| **b)
        .count();
        count <= 1
    }
}
