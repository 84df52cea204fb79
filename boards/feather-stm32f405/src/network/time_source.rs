#![deny(unsafe_code)]
//! Blocking network time source over the async network task
//!
//! The main loop cannot await. It posts a numbered request on one signal
//! and spins, with a deadline, on a second signal for the answer. Answers
//! carry the request number, so a late reply to an abandoned request is
//! dropped instead of being taken as fresh time. They also carry the
//! instant they were produced: an answer that sat in the mailbox is aged
//! forward on pickup, or dropped once older than [`STALE_AFTER`].

use core::sync::atomic::{AtomicBool, Ordering};

use defmt::{info, warn};
use embassy_net::Stack;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{block_for, Duration, Instant};
use ring_clock_hal::NetworkTimeSource;

use super::client::NetworkClient;
use super::error::NetworkError;
use super::sntp::Timestamp;

/// Outstanding requests and unread answers older than this are abandoned
const STALE_AFTER: Duration = Duration::from_secs(60);
/// Spin granularity while waiting for an answer
const POLL_STEP: Duration = Duration::from_millis(1);

/// Answer to request `seq`, stamped when the network task produced it
struct Response {
    seq: u32,
    answered_at: Instant,
    result: Result<u64, NetworkError>,
}

/// Request/response mailbox between the main loop and the network task
pub struct TimeExchange {
    requests: Signal<CriticalSectionRawMutex, u32>,
    responses: Signal<CriticalSectionRawMutex, Response>,
    link_up: AtomicBool,
}

impl TimeExchange {
    pub const fn new() -> Self {
        Self {
            requests: Signal::new(),
            responses: Signal::new(),
            link_up: AtomicBool::new(false),
        }
    }

    pub fn set_link_up(&self, up: bool) {
        self.link_up.store(up, Ordering::Release);
    }

    pub fn is_link_up(&self) -> bool {
        self.link_up.load(Ordering::Acquire)
    }

    /// Network side: answer requests forever with `client`
    pub async fn serve<C>(&self, client: &mut C, stack: &Stack<'static>) -> !
    where
        C: NetworkClient<Output = Timestamp>,
    {
        loop {
            let seq = self.requests.wait().await;
            info!("Time request #{} received", seq);
            let result = client.run(stack).await.map(|ts| ts.unix_secs);
            self.responses.signal(Response {
                seq,
                answered_at: Instant::now(),
                result,
            });
        }
    }
}

impl Default for TimeExchange {
    fn default() -> Self {
        Self::new()
    }
}

/// Main-loop handle on a [`TimeExchange`]
pub struct SntpTimeSource {
    exchange: &'static TimeExchange,
    seq: u32,
    requested_at: Option<Instant>,
}

impl SntpTimeSource {
    pub fn new(exchange: &'static TimeExchange) -> Self {
        Self {
            exchange,
            seq: 0,
            requested_at: None,
        }
    }

    fn ensure_requested(&mut self, now: Instant) {
        let outstanding = self
            .requested_at
            .is_some_and(|at| now.saturating_duration_since(at) < STALE_AFTER);
        if !outstanding {
            self.seq = self.seq.wrapping_add(1);
            self.exchange.requests.signal(self.seq);
            self.requested_at = Some(now);
        }
    }

    fn accept(&self, response: Response) -> Option<u64> {
        let age = Instant::now().saturating_duration_since(response.answered_at);
        match response.result {
            Ok(epoch) => {
                let epoch = aged_epoch(epoch, age.as_millis(), STALE_AFTER.as_millis());
                if epoch.is_none() {
                    warn!(
                        "Time response #{} is {} ms old, discarded",
                        response.seq,
                        age.as_millis()
                    );
                }
                epoch
            }
            Err(e) => {
                warn!("Time request #{} failed: {}", response.seq, e);
                None
            }
        }
    }
}

/// Move `epoch` forward by the `age_ms` it waited, rounded to the second
///
/// `None` once the answer is `max_age_ms` old or more.
fn aged_epoch(epoch: u64, age_ms: u64, max_age_ms: u64) -> Option<u64> {
    if age_ms >= max_age_ms {
        return None;
    }
    epoch.checked_add((age_ms + 500) / 1000)
}

impl NetworkTimeSource for SntpTimeSource {
    fn is_connected(&self) -> bool {
        self.exchange.is_link_up()
    }

    fn request_epoch(&mut self, timeout_ms: u32) -> Option<u64> {
        let start = Instant::now();
        self.ensure_requested(start);
        let deadline = start + Duration::from_millis(u64::from(timeout_ms));

        loop {
            if let Some(response) = self.exchange.responses.try_take() {
                if response.seq == self.seq {
                    self.requested_at = None;
                    return self.accept(response);
                }
                warn!("Dropping stale time response #{}", response.seq);
            }

            if Instant::now() >= deadline {
                return None;
            }
            block_for(POLL_STEP);
        }
    }
}
