//! S5 (§8): the PHY reports link-down, two reconnect attempts fail, and the
//! client still reaches `Connected` without busy-looping outside the
//! injected clock's delay calls.
//!
//! `step()` re-checks the link and retries `connect` within the same call
//! that processes INITIALISE, so the scripted link-down and the first
//! connect failure both land in the first `step()`. An empty `transmit()`
//! (a documented no-op, see `tcp::client`'s own tests) is a public way to
//! force the next wakeup instead of waiting out the real 30s idle timeout.

use std::sync::{Arc, Mutex};

use meshnode_t01::config::NetworkConfig;
use meshnode_t01::error::{Error, LinkError};
use meshnode_t01::mesh::types::TcpFrame;
use meshnode_t01::ports::{FrameSink, TcpClientControl, TcpSink};
use meshnode_t01::tcp::client::{ClientState, TcpClient};

use crate::fakes::{FakeClock, ScriptedBus};

#[derive(Clone, Default)]
struct RecordingSink {
    received: Arc<Mutex<Vec<TcpFrame>>>,
}
impl FrameSink for RecordingSink {
    fn deliver_frame(&self, frame: &TcpFrame) {
        self.received.lock().unwrap().push(frame.clone());
    }
}

#[test]
fn reconnect_storm_eventually_reconnects() {
    let mut bus = ScriptedBus::default();
    bus.link_up.push_back(false);
    bus.connect_results.push_back(Err(Error::Link(LinkError::Down)));
    bus.connect_results.push_back(Err(Error::Link(LinkError::Down)));
    bus.connect_results.push_back(Ok(()));

    let mut client = TcpClient::new(bus, FakeClock, RecordingSink::default(), NetworkConfig::default());
    let mut handle = client.handle();
    handle.start();

    client.step();
    assert_eq!(client.state(), ClientState::Disconnected);

    handle.transmit(&TcpFrame::new(b"").unwrap()).unwrap();
    client.step();
    assert_eq!(client.state(), ClientState::Disconnected);

    handle.transmit(&TcpFrame::new(b"").unwrap()).unwrap();
    client.step();
    assert_eq!(client.state(), ClientState::Connected);
}
