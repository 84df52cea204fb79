//! Network time plumbing
//!
//! - **`client`**: `NetworkClient` trait for protocol implementations
//! - **`config`**: Configuration structs with `Default` implementations
//! - **`error`**: Error enum for network operations
//! - **`manager`**: DHCP bring-up on the embassy-net stack
//! - **`sntp`**: SNTP client implementing `NetworkClient`
//! - **`time_source`**: Bridge from the async network task to the clock's
//!   blocking `NetworkTimeSource`
//!
//! ## Architecture
//!
//! The embassy-net stack is `!Send` and lives entirely inside the network
//! task. The main loop never touches it: it posts a numbered request on a
//! signal and waits, bounded, for the matching answer on a second signal.

pub mod client;
pub mod config;
pub mod error;
pub mod manager;
pub mod sntp;
pub mod time_source;

pub use config::NetworkConfig;
pub use error::NetworkError;
pub use sntp::SntpClient;
pub use time_source::{SntpTimeSource, TimeExchange};
