//! Node configuration parameters.
//!
//! Everything the three tasks need at construction: mesh identity, network
//! defaults (§6), watchdog period, and the LittleFS parameter choice from the
//! §9 open question. Threaded into the top-level wiring once at boot, mirrors
//! the "module-level state → component singletons" design note.

use serde::{Deserialize, Serialize};

/// Static IPv4 configuration for the W5500 offload chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub mac: [u8; 6],
    pub ip: [u8; 4],
    pub netmask: [u8; 4],
    pub server_ip: [u8; 4],
    pub server_port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            mac: [0xEA, 0x11, 0x22, 0x33, 0x44, 0xEA],
            ip: [192, 168, 0, 123],
            netmask: [255, 255, 0, 0],
            server_ip: [192, 168, 0, 101],
            server_port: 2399,
        }
    }
}

/// Node-wide configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NodeConfig {
    /// This node's mesh identity (`T01` in the deployed fleet).
    pub self_id: u8,
    pub network: NetworkConfig,
    /// Hardware watchdog period; the Board supervisor must refresh at least
    /// once per half-period.
    pub watchdog_timeout_ms: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            self_id: 1,
            network: NetworkConfig::default(),
            watchdog_timeout_ms: 25_000,
        }
    }
}
