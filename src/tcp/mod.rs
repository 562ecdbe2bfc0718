pub mod client;
#[cfg(feature = "embedded")]
pub mod w5500_bus;
