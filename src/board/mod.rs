//! Board supervisor (§4.1) — the highest-priority activity. Brings up the
//! board's local peripherals in a fixed order, then services the status LED
//! and remote-button notifications forever while feeding the watchdog.
//!
//! Grounded on this codebase's one-shot-timer idiom in `scheduler.rs`: the
//! photoresistor job here is the same shape (armed once, reschedules itself
//! on every fire) but driven by the notification wait's timeout rather than
//! a dedicated RTOS timer, since this crate has one wait loop per task
//! rather than a separate timer service.

pub mod ir;
pub mod led;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{info, warn};

use crate::error::Result;
use crate::mesh::types::{BoardLedColor, PhotoresistorSample, RemoteButton};
use crate::notify::Notification;
use crate::ports::{
    AdcChannel, Clock, FlashSubsystem, IoExpander, PhotoresistorSink, PwmChannel, RemoteButtonSink,
    TcpClientControl, WatchdogFeeder,
};
use self::led::LedChannels;

/// Posted when `status_led_color` changes and the PWM channels need
/// reconfiguring (§4.1).
pub const STATUS_LED_NOTIFICATION: u32 = 1 << 0;
/// Posted when a remote-button press has been decoded (§4.1).
pub const REMOTE_BUTTON_NOTIFICATION: u32 = 1 << 1;

/// Initial photoresistor one-shot timer period (§4.1 startup step 5).
const INITIAL_PHOTORESISTOR_PERIOD: Duration = Duration::from_secs(30);
/// Settling delay after driving the LED dark, before sampling (§4.1).
const PHOTORESISTOR_SETTLE_DELAY: Duration = Duration::from_secs(1);
/// Per-sample ADC timeout (§4.1).
const PHOTORESISTOR_SAMPLE_TIMEOUT: Duration = Duration::from_secs(2);
/// Number of samples averaged per job run (§4.1).
const PHOTORESISTOR_SAMPLE_COUNT: u32 = 5;

/// A handle for posting board notifications from interrupt-equivalent
/// contexts (IR decode, LED-change requests), decoupled from the rest of
/// the supervisor's hardware so it can be cloned and handed to callers that
/// never touch SPI/I²C/ADC directly.
#[derive(Clone)]
pub struct BoardNotifier {
    notify: Arc<Notification>,
    status_led_color: Arc<Mutex<BoardLedColor>>,
    latest_remote_button: Arc<Mutex<RemoteButton>>,
}

impl BoardNotifier {
    /// Request a status-LED colour change; collapses with any pending
    /// request not yet observed by the event loop (§5).
    pub fn request_status_led(&self, color: BoardLedColor) {
        *self.status_led_color.lock().unwrap_or_else(|e| e.into_inner()) = color;
        self.notify.post(STATUS_LED_NOTIFICATION);
    }

    /// Report a decoded remote-button press.
    pub fn report_remote_button(&self, button: RemoteButton) {
        *self
            .latest_remote_button
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = button;
        self.notify.post(REMOTE_BUTTON_NOTIFICATION);
    }
}

/// The Board supervisor. Generic over every hardware capability it owns, so
/// the event loop and startup sequence are written once against the traits
/// in `ports` and `board::led`/`board::ir`, and wired to real or simulated
/// implementations at construction (`main.rs`).
pub struct BoardSupervisor<IO, ADC, G, R, B, FL, TCP, C, W, APP> {
    io_expander: IO,
    photoresistor_adc: ADC,
    led: LedChannels<G, R, B>,
    flash: FL,
    tcp: TCP,
    clock: C,
    watchdog: W,
    app: APP,
    notify: Arc<Notification>,
    status_led_color: Arc<Mutex<BoardLedColor>>,
    latest_remote_button: Arc<Mutex<RemoteButton>>,
    watchdog_timeout_ms: u32,
    next_photoresistor_fire: Option<Duration>,
}

impl<IO, ADC, G, R, B, FL, TCP, C, W, APP> BoardSupervisor<IO, ADC, G, R, B, FL, TCP, C, W, APP>
where
    IO: IoExpander,
    ADC: AdcChannel,
    G: PwmChannel,
    R: PwmChannel,
    B: PwmChannel,
    FL: FlashSubsystem,
    TCP: TcpClientControl,
    C: Clock,
    W: WatchdogFeeder,
    APP: RemoteButtonSink + PhotoresistorSink,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        io_expander: IO,
        photoresistor_adc: ADC,
        led: LedChannels<G, R, B>,
        flash: FL,
        tcp: TCP,
        clock: C,
        watchdog: W,
        app: APP,
        watchdog_timeout_ms: u32,
    ) -> Self {
        Self {
            io_expander,
            photoresistor_adc,
            led,
            flash,
            tcp,
            clock,
            watchdog,
            app,
            notify: Arc::new(Notification::new()),
            status_led_color: Arc::new(Mutex::new(BoardLedColor::None)),
            latest_remote_button: Arc::new(Mutex::new(RemoteButton::Unknown)),
            watchdog_timeout_ms,
            next_photoresistor_fire: None,
        }
    }

    /// A cloneable handle for posting notifications from outside the
    /// supervisor (IR decode, an external "set LED" request).
    pub fn notifier(&self) -> BoardNotifier {
        BoardNotifier {
            notify: self.notify.clone(),
            status_led_color: self.status_led_color.clone(),
            latest_remote_button: self.latest_remote_button.clone(),
        }
    }

    /// Startup order (§4.1): each step is recoverable — on failure it logs
    /// and continues, never aborts boot. Must run once before [`Self::run`].
    pub fn start(&mut self) {
        // Step 1: I²C expander, both ports outputs driven low.
        match self.io_expander.configure_outputs_low() {
            Ok(()) => info!("board: I/O expander configured"),
            Err(e) => warn!("board: I/O expander bring-up failed: {e}"),
        }

        // Step 2: SPI1/W25Q/LittleFS mount-or-format, then power the flash
        // down.
        match self.flash.mount_or_format() {
            Ok(()) => info!("board: filesystem mounted"),
            Err(e) => warn!("board: filesystem mount failed: {e}"),
        }
        self.flash.power_down();

        // Step 3: W5500 EXTI + TCP client start.
        self.tcp.start();
        info!("board: TCP client started");

        // Step 4: TIM2 IR capture is passive decode (ir::decode is pure, no
        // peripheral state to bring up host-side); TIM3 is brought up only
        // on demand by `led::LedChannels::apply`, so bring the LED to its
        // idle state here to mirror the teardown-after-bring-up step.
        self.led.apply(BoardLedColor::None);

        // Step 5: Node mailbox / application init happen in the caller
        // (they are separate activities, §2); arm the photoresistor timer.
        self.next_photoresistor_fire = Some(self.clock.now() + INITIAL_PHOTORESISTOR_PERIOD);
        info!("board: photoresistor timer armed for 30s");
    }

    /// Run the event loop forever (§4.1). Intended to run on its own thread
    /// (priority 4, §2).
    pub fn run(&mut self) -> ! {
        loop {
            self.step();
        }
    }

    /// One iteration of the event loop, exposed separately so tests can
    /// drive it deterministically instead of looping forever.
    pub fn step(&mut self) {
        let timeout = Duration::from_millis((self.watchdog_timeout_ms / 2) as u64);
        let bits = self.notify.wait(timeout);

        if bits & STATUS_LED_NOTIFICATION != 0 {
            let color = *self
                .status_led_color
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            self.led.apply(color);
        }

        if bits & REMOTE_BUTTON_NOTIFICATION != 0 {
            let button = *self
                .latest_remote_button
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            self.app.process_remote_button(button);
        }

        if let Some(deadline) = self.next_photoresistor_fire {
            if self.clock.now() >= deadline {
                self.run_photoresistor_job();
            }
        }

        self.watchdog.feed();
    }

    /// Photoresistor one-shot timer job (§4.1). Always rearms before
    /// returning, whether or not it actually sampled (§9 open-question
    /// decision: no uninitialised "did it start" flag).
    fn run_photoresistor_job(&mut self) {
        if self.app.lightning_off() {
            self.led.apply(BoardLedColor::None);
            self.clock.delay_ms(PHOTORESISTOR_SETTLE_DELAY.as_millis() as u32);

            let mut sum: u32 = 0;
            let mut successes: u32 = 0;
            for _ in 0..PHOTORESISTOR_SAMPLE_COUNT {
                if let Some(raw) = self
                    .photoresistor_adc
                    .read(PHOTORESISTOR_SAMPLE_TIMEOUT)
                {
                    sum += raw as u32;
                    successes += 1;
                }
            }

            if successes > 0 {
                let avg_raw = (sum / successes) as u16;
                let inverted = PhotoresistorSample::ADC_MAX.saturating_sub(avg_raw);
                let sample = PhotoresistorSample::from_adc(inverted);
                info!(
                    "board: photoresistor adc={} voltage={:.2}V resistance={}Ohm",
                    sample.adc, sample.voltage_v, sample.resistance_ohm
                );
                let next_period_ms = self.app.process_sample(sample);
                self.next_photoresistor_fire =
                    Some(self.clock.now() + Duration::from_millis(next_period_ms as u64));
            } else {
                warn!("board: photoresistor job skipped, no successful samples");
                self.next_photoresistor_fire =
                    Some(self.clock.now() + INITIAL_PHOTORESISTOR_PERIOD);
            }
        } else {
            self.next_photoresistor_fire = Some(self.clock.now() + INITIAL_PHOTORESISTOR_PERIOD);
        }

        // Resume the commanded LED state now that the measurement window is
        // over (§4.1).
        self.notify.post(STATUS_LED_NOTIFICATION);
    }
}
