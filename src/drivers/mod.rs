//! Host/OS-level scaffolding shared by all three activities: thread
//! spawning and the watchdog feed.

pub mod task_pin;
pub mod watchdog;
