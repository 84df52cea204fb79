#![deny(unsafe_code)]
//! Internal RTC driver
//!
//! Wraps the embassy RTC for calendar access and programs the wakeup timer
//! directly through the PAC, since embassy only exposes it to its own
//! low-power executor.
//!
//! ## Wakeup timer
//! - Clocked from ck_spre (1 Hz from the 32.768 kHz LSE)
//! - Reload value 0, so it fires every second
//! - Routed to EXTI line 22, rising edge, interrupt `RTC_WKUP`

use defmt::{info, warn};
use embassy_stm32::pac;
use embassy_stm32::pac::rtc::vals::Wucksel;
use embassy_stm32::rtc::{DateTime, DayOfWeek, Rtc};
use ring_clock_core::CalendarTime;
use ring_clock_hal::{HardwareFault, RealTimeClock};

/// EXTI line wired to the RTC wakeup event
const WAKEUP_EXTI_LINE: usize = 22;

/// Polls of WUTWF before giving up on the wakeup timer
const WUTWF_POLLS: u32 = 10_000;

/// Written on first power-up, when the backup domain holds no time
/// (2025-01-04 14:13:20 UTC)
const FALLBACK_EPOCH: u64 = 1_736_000_000;

/// STM32F405 RTC with a 1 Hz wakeup interrupt
pub struct FeatherRtc {
    rtc: Rtc,
}

impl FeatherRtc {
    pub fn new(rtc: Rtc) -> Self {
        Self { rtc }
    }
}

impl RealTimeClock for FeatherRtc {
    fn start(&mut self) -> Result<(), HardwareFault> {
        // The calendar keeps running from the backup domain across resets
        if self.rtc.now().is_ok() {
            return Ok(());
        }

        warn!("RTC calendar not running, seeding with {}", FALLBACK_EPOCH);
        self.write_epoch(FALLBACK_EPOCH)
            .map_err(|_| HardwareFault::InitFailed)
    }

    fn arm_periodic_tick(&mut self) -> Result<(), HardwareFault> {
        let rtc = pac::RTC;
        unlock(rtc);

        rtc.cr().modify(|w| w.set_wute(false));
        if !(0..WUTWF_POLLS).any(|_| rtc.isr().read().wutwf()) {
            lock(rtc);
            return Err(HardwareFault::ArmFailed);
        }

        rtc.wutr().write(|w| w.set_wut(0));
        rtc.cr().modify(|w| {
            w.set_wucksel(Wucksel::CLOCKSPARE);
            w.set_wutie(true);
            w.set_wute(true);
        });
        rtc.isr().modify(|w| w.set_wutf(false));
        lock(rtc);

        let exti = pac::EXTI;
        exti.rtsr(0).modify(|w| w.set_line(WAKEUP_EXTI_LINE, true));
        exti.ftsr(0).modify(|w| w.set_line(WAKEUP_EXTI_LINE, false));
        exti.pr(0).write(|w| w.set_line(WAKEUP_EXTI_LINE, true));
        exti.imr(0).modify(|w| w.set_line(WAKEUP_EXTI_LINE, true));

        info!("RTC wakeup timer armed: 1 Hz on EXTI{}", WAKEUP_EXTI_LINE);
        Ok(())
    }

    fn read_epoch(&mut self) -> Result<u64, HardwareFault> {
        let now = self.rtc.now().map_err(|_| HardwareFault::ReadFailed)?;
        CalendarTime::new(
            now.year(),
            now.month(),
            now.day(),
            now.hour(),
            now.minute(),
            now.second(),
        )
        .map(|time| time.to_epoch())
        .ok_or(HardwareFault::ReadFailed)
    }

    fn write_epoch(&mut self, epoch: u64) -> Result<(), HardwareFault> {
        let time = CalendarTime::from_epoch(epoch).ok_or(HardwareFault::WriteRejected)?;
        let datetime = DateTime::from(
            time.year(),
            time.month(),
            time.day(),
            day_of_week(time.weekday()),
            time.hour(),
            time.minute(),
            time.second(),
            0,
        )
        .map_err(|_| HardwareFault::WriteRejected)?;

        self.rtc
            .set_datetime(datetime)
            .map_err(|_| HardwareFault::WriteRejected)
    }
}

/// Acknowledge a wakeup event. Called from the `RTC_WKUP` handler.
pub fn clear_wakeup_flag() {
    pac::RTC.isr().modify(|w| w.set_wutf(false));
    pac::EXTI
        .pr(0)
        .write(|w| w.set_line(WAKEUP_EXTI_LINE, true));
}

/// 1 = Sunday .. 7 = Saturday
fn day_of_week(weekday: u8) -> DayOfWeek {
    match weekday {
        1 => DayOfWeek::Sunday,
        2 => DayOfWeek::Monday,
        3 => DayOfWeek::Tuesday,
        4 => DayOfWeek::Wednesday,
        5 => DayOfWeek::Thursday,
        6 => DayOfWeek::Friday,
        _ => DayOfWeek::Saturday,
    }
}

fn unlock(rtc: pac::rtc::Rtc) {
    rtc.wpr().write(|w| w.set_key(0xCA));
    rtc.wpr().write(|w| w.set_key(0x53));
}

fn lock(rtc: pac::rtc::Rtc) {
    rtc.wpr().write(|w| w.set_key(0xFF));
}
