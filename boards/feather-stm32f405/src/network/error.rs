#![deny(unsafe_code)]
//! Network error types

use defmt::Format;

/// Network operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum NetworkError {
    /// W5500 did not come up
    ChipInitFailed,
    /// DNS resolution failed
    DnsError,
    /// Socket bind/send/receive error
    SocketError,
    /// Request timeout
    Timeout,
    /// Malformed or unexpected reply
    InvalidResponse,
    /// Server not usable (e.g. stratum out of range)
    ServerError,
    /// All configured servers failed
    AllServersFailed,
}

impl core::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ChipInitFailed => write!(f, "Ethernet chip initialization failed"),
            Self::DnsError => write!(f, "DNS resolution failed"),
            Self::SocketError => write!(f, "Socket error"),
            Self::Timeout => write!(f, "Request timeout"),
            Self::InvalidResponse => write!(f, "Invalid response"),
            Self::ServerError => write!(f, "Server error"),
            Self::AllServersFailed => write!(f, "All servers failed"),
        }
    }
}

impl core::error::Error for NetworkError {}
