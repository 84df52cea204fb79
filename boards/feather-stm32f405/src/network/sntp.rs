#![deny(unsafe_code)]
//! SNTP client implementing NetworkClient
//!
//! One `run` walks the configured servers in order, retrying each a few
//! times, and returns the first valid server time. Nothing is written to
//! the RTC here: the clock engine decides whether to accept the answer.

use defmt::{error, info, warn, Debug2Format, Format};
use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpEndpoint, Stack};
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Instant, Timer};
use rtic_monotonics::fugit::ExtU64;
use rtic_monotonics::Monotonic;

use crate::Mono;

use super::client::NetworkClient;
use super::config::SntpConfig;
use super::error::NetworkError;

const NTP_PORT: u16 = 123;
const NTP_PACKET_LEN: usize = 48;
/// LI = 0, VN = 3, Mode = 3 (client)
const NTP_CLIENT_REQUEST: u8 = 0x1B;
/// 1900-01-01 to 1970-01-01 in seconds
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

/// UTC timestamp with microsecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub struct Timestamp {
    /// Seconds since 1970-01-01 00:00:00 UTC
    pub unix_secs: u64,
    /// Microseconds component (0-999,999)
    pub micros: u32,
}

impl Timestamp {
    pub const fn new(unix_secs: u64, micros: u32) -> Self {
        Self { unix_secs, micros }
    }

    /// Convert an NTP timestamp (seconds since 1900, 2^-32 s fraction)
    pub fn from_ntp(ntp_secs: u64, ntp_frac: u32) -> Self {
        let unix_secs = ntp_secs.saturating_sub(NTP_UNIX_OFFSET);
        let micros = ((u64::from(ntp_frac) * 1_000_000) >> 32) as u32;
        Self::new(unix_secs, micros)
    }

    /// Shift forward by `micros`, carrying into seconds
    pub fn advanced_by(self, micros: u64) -> Self {
        let total = u64::from(self.micros) + micros;
        Self::new(
            self.unix_secs.saturating_add(total / 1_000_000),
            (total % 1_000_000) as u32,
        )
    }
}

/// SNTP client for time synchronization
pub struct SntpClient {
    config: SntpConfig,
}

impl SntpClient {
    pub fn new() -> Self {
        Self::with_config(SntpConfig::default())
    }

    pub fn with_config(config: SntpConfig) -> Self {
        Self { config }
    }

    async fn sync(&self, stack: &Stack<'static>) -> Result<Timestamp, NetworkError> {
        info!("Starting SNTP synchronization");
        for server in self.config.servers {
            for attempt in 0..self.config.retry_count {
                info!(
                    "Attempting SNTP sync with {} (attempt {})",
                    server,
                    attempt + 1
                );
                match self.request(stack, server).await {
                    Ok(timestamp) => return Ok(timestamp),
                    Err(e) => {
                        warn!("SNTP request failed: {}, retrying...", e);
                        Mono::delay(self.config.retry_delay_ms.millis()).await;
                    }
                }
            }
        }
        error!("All SNTP sync attempts failed");
        Err(NetworkError::AllServersFailed)
    }

    async fn request(&self, stack: &Stack<'static>, server: &str) -> Result<Timestamp, NetworkError> {
        let server_ip = stack
            .dns_query(server, DnsQueryType::A)
            .await
            .map_err(|_| NetworkError::DnsError)?
            .first()
            .copied()
            .ok_or(NetworkError::DnsError)?;

        let server_endpoint = IpEndpoint::new(server_ip, NTP_PORT);
        info!("Resolved {} to {}", server, Debug2Format(&server_endpoint));

        let mut rx_meta = [PacketMetadata::EMPTY; 2];
        let mut rx_buffer = [0u8; 64];
        let mut tx_meta = [PacketMetadata::EMPTY; 2];
        let mut tx_buffer = [0u8; 64];
        let mut socket = UdpSocket::new(
            *stack,
            &mut rx_meta,
            &mut rx_buffer,
            &mut tx_meta,
            &mut tx_buffer,
        );
        socket.bind(0).map_err(|_| NetworkError::SocketError)?;

        let mut packet = [0u8; NTP_PACKET_LEN];
        packet[0] = NTP_CLIENT_REQUEST;
        let transmit_time = Instant::now();
        socket
            .send_to(&packet, server_endpoint)
            .await
            .map_err(|_| NetworkError::SocketError)?;

        let mut response = [0u8; NTP_PACKET_LEN];
        let timeout = Timer::after(Duration::from_millis(self.config.timeout_ms));
        let (recv_len, from) = match select(timeout, socket.recv_from(&mut response)).await {
            Either::First(_) => return Err(NetworkError::Timeout),
            Either::Second(result) => result.map_err(|_| NetworkError::SocketError)?,
        };
        let receive_time = Instant::now();

        if recv_len < NTP_PACKET_LEN || from.endpoint.addr != server_ip {
            return Err(NetworkError::InvalidResponse);
        }

        let stratum = response[1];
        if stratum == 0 || stratum > self.config.max_stratum {
            warn!(
                "Invalid stratum {} (max {})",
                stratum, self.config.max_stratum
            );
            return Err(NetworkError::ServerError);
        }

        let tx_secs = u32::from_be_bytes([response[40], response[41], response[42], response[43]]);
        let tx_frac = u32::from_be_bytes([response[44], response[45], response[46], response[47]]);
        if tx_secs == 0 {
            return Err(NetworkError::InvalidResponse);
        }

        let rtt_correction_micros = receive_time.duration_since(transmit_time).as_micros() / 2;
        let timestamp =
            Timestamp::from_ntp(u64::from(tx_secs), tx_frac).advanced_by(rtt_correction_micros);

        info!(
            "NTP time {}.{:06} UTC from stratum {} (RTT correction: {} us)",
            timestamp.unix_secs, timestamp.micros, stratum, rtt_correction_micros
        );
        Ok(timestamp)
    }
}

impl Default for SntpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkClient for SntpClient {
    type Output = Timestamp;

    async fn run(&mut self, stack: &Stack<'static>) -> Result<Self::Output, NetworkError> {
        self.sync(stack).await
    }
}
