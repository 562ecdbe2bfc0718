//! Class T01 mesh node firmware — entry point.
//!
//! Wires the three activities of §2 (Board supervisor, Node mailbox, TCP
//! client) to host-side sim adapters and spawns each on its own
//! priority-tagged thread. Real MCU bindings (SPI/I²C peripherals, the
//! W5500 register interface) are out of scope (§1) and live behind the
//! `embedded` feature for a target that supplies them; this binary is the
//! host demonstration of the runtime shape, the same role the teacher's
//! `main.rs` plays for its own hexagonal wiring.

use std::sync::Arc;

use log::info;

use meshnode_t01::board::led::LedChannels;
use meshnode_t01::board::BoardSupervisor;
use meshnode_t01::config::NodeConfig;
use meshnode_t01::drivers::task_pin::{spawn_tagged, Priority};
use meshnode_t01::drivers::watchdog::SimWatchdog;
use meshnode_t01::mailbox::Mailbox;
use meshnode_t01::mesh::types::{NodeMessage, PhotoresistorSample, RemoteButton};
use meshnode_t01::ports::{NodeSink, PhotoresistorSink, RemoteButtonSink};
use meshnode_t01::sim::{NullAdcChannel, NullFlashSubsystem, NullIoExpander, NullPwmChannel, NullW5500Bus, SystemClock};
use meshnode_t01::tcp::client::TcpClient;

/// The application-level behaviour of class T01 is out of scope (§1) — this
/// is only the delivery boundary the core runtime needs a concrete type
/// for. It logs what it receives instead of acting on it.
struct DemoApp;

impl NodeSink for DemoApp {
    fn deliver(&mut self, msg: &NodeMessage) {
        info!("app: inbound message from node {}: {:?}", msg.source, msg.command);
    }
}

impl RemoteButtonSink for DemoApp {
    fn process_remote_button(&mut self, button: RemoteButton) {
        info!("app: remote button pressed: {button:?}");
    }
}

impl PhotoresistorSink for DemoApp {
    fn process_sample(&mut self, sample: PhotoresistorSample) -> u32 {
        info!(
            "app: photoresistor sample adc={} voltage={:.2}V resistance={}Ohm",
            sample.adc, sample.voltage_v, sample.resistance_ohm
        );
        30_000
    }
    fn lightning_off(&self) -> bool {
        true
    }
}

fn main() {
    env_logger::init();

    info!("meshnode-t01 starting (self_id={})", NodeConfig::default().self_id);
    let config = NodeConfig::default();

    let mailbox = Arc::new(Mailbox::new(config.self_id));

    let tcp_client = TcpClient::new(
        NullW5500Bus,
        SystemClock::new(),
        mailbox.clone(),
        config.network,
    );
    let tcp_handle = tcp_client.handle();

    let board = BoardSupervisor::new(
        NullIoExpander,
        NullAdcChannel,
        LedChannels {
            tim2_ch2_green: NullPwmChannel::default(),
            tim3_ch1_red: NullPwmChannel::default(),
            tim3_ch2_blue: NullPwmChannel::default(),
        },
        NullFlashSubsystem,
        tcp_handle.clone(),
        SystemClock::new(),
        SimWatchdog::new(),
        DemoApp,
        config.watchdog_timeout_ms,
    );

    let tcp_thread = spawn_tagged(Priority::TcpClient, 4, "tcp-client", move || {
        let mut tcp_client = tcp_client;
        tcp_client.run();
    });

    let mailbox_for_thread = mailbox.clone();
    let mailbox_thread = spawn_tagged(Priority::NodeMailbox, 4, "node-mailbox", move || {
        let mut node_sink = DemoApp;
        let mut tcp_sink = tcp_handle;
        mailbox_for_thread.run(&mut node_sink, &mut tcp_sink);
    });

    let board_thread = spawn_tagged(Priority::BoardSupervisor, 4, "board-supervisor", move || {
        let mut board = board;
        board.start();
        board.run();
    });

    // All three loops run forever (§2); join is unreachable in normal
    // operation but keeps the binary alive if they ever return.
    let _ = tcp_thread.join();
    let _ = mailbox_thread.join();
    let _ = board_thread.join();
}
