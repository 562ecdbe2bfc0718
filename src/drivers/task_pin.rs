//! Priority-tagged thread spawning for the three activities of §2.
//!
//! Grounded on this codebase's ESP32-S3 `spawn_on_core` helper, generalised
//! from "pin to one of two ESP32 cores" to "tag with an RTOS priority":
//! on host, each activity is realised as a plain `std::thread` — priority is
//! recorded in the thread name and log line only and does not change OS
//! scheduling. What is preserved is the *shape* (three independent loops,
//! bounded-wait queue operations, notification bitmasks), so the same core
//! logic later drops onto a real RTOS binding by swapping this spawn helper
//! and `notify::Notification`'s backing store for FreeRTOS primitives (§2).

/// Scheduler priority, matching §2's table (0 low … 4 high).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    BoardSupervisor = 4,
    TcpClient = 3,
    NodeMailbox = 2,
}

/// Spawn a thread tagged with its intended RTOS priority. Priority is
/// recorded in the thread name and log line only; the host OS scheduler
/// still decides.
pub fn spawn_tagged(
    priority: Priority,
    stack_kb: usize,
    name: &'static str,
    f: impl FnOnce() + Send + 'static,
) -> std::thread::JoinHandle<()> {
    log::info!(
        "spawning '{name}' (priority={priority:?}, stack={stack_kb}KB, sim: no RTOS core pinning)"
    );

    std::thread::Builder::new()
        .name(name.into())
        .stack_size(stack_kb * 1024)
        .spawn(f)
        .expect("spawn_tagged: thread creation failed")
}
