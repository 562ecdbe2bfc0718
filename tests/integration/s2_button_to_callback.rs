//! S2 (§8): a decoded IR frame reaches the application's remote-button
//! callback exactly once, through the Board supervisor's notification path
//! rather than a direct function call.

use meshnode_t01::board::ir;
use meshnode_t01::board::led::LedChannels;
use meshnode_t01::board::BoardSupervisor;
use meshnode_t01::mesh::types::RemoteButton;
use meshnode_t01::sim::{NullAdcChannel, NullIoExpander, NullPwmChannel};

use crate::fakes::{CountingApp, CountingFlash, FakeClock};

struct NullTcp;
impl meshnode_t01::ports::TcpClientControl for NullTcp {
    fn start(&mut self) {}
}

#[derive(Default)]
struct NullWatchdog;
impl meshnode_t01::ports::WatchdogFeeder for NullWatchdog {
    fn feed(&mut self) {}
}

#[test]
fn button_to_callback() {
    // "ONE_BUTTON_CODE" per the remote's NEC table (`board::ir`): digit 1.
    let button = ir::decode(0x00FF_30CF);
    assert_eq!(button, RemoteButton::Digit(1));

    let app = CountingApp::default();
    let mut board = BoardSupervisor::new(
        NullIoExpander,
        NullAdcChannel,
        LedChannels {
            tim2_ch2_green: NullPwmChannel::default(),
            tim3_ch1_red: NullPwmChannel::default(),
            tim3_ch2_blue: NullPwmChannel::default(),
        },
        CountingFlash::default(),
        NullTcp,
        FakeClock,
        NullWatchdog,
        app.clone(),
        25_000,
    );
    board.start();

    // IR decode hands the button to the supervisor the same way an
    // ISR-equivalent context would: through the notifier, not a direct call.
    let notifier = board.notifier();
    notifier.report_remote_button(button);
    board.step();

    assert_eq!(app.button_calls.borrow().as_slice(), &[RemoteButton::Digit(1)]);
}
