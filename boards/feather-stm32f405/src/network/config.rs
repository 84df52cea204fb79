#![deny(unsafe_code)]
//! Network configuration structures

use crate::device_id;

/// SNTP client configuration
#[derive(Debug, Clone)]
pub struct SntpConfig {
    /// NTP servers to try (in order)
    pub servers: &'static [&'static str],
    /// Per-request receive timeout in milliseconds
    pub timeout_ms: u64,
    /// Attempts per server
    pub retry_count: usize,
    /// Pause between failed attempts in milliseconds
    pub retry_delay_ms: u64,
    /// Maximum accepted stratum level (1-15)
    pub max_stratum: u8,
}

impl Default for SntpConfig {
    fn default() -> Self {
        Self {
            servers: &["pool.ntp.org", "time.google.com", "time.cloudflare.com"],
            timeout_ms: 5000,
            retry_count: 3,
            retry_delay_ms: 2000,
            max_stratum: 3,
        }
    }
}

/// Network stack configuration
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// MAC address for Ethernet
    pub mac_addr: [u8; 6],
    /// Random seed for network stack
    pub seed: u64,
}

impl NetworkConfig {
    /// Identity derived from this chip's unique ID
    pub fn from_device() -> Self {
        Self {
            mac_addr: device_id::mac_address(),
            seed: device_id::stack_seed(),
        }
    }
}
