//! Calendar time snapshots

use crate::calendar::{self, SECONDS_PER_DAY};

/// Calendar time of day and date
///
/// Fields are always internally consistent: values can only be built from
/// an epoch count or through the checked [`CalendarTime::new`]. `valid` is
/// false until a trustworthy source (explicit set or network sync) has
/// supplied the time at least once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarTime {
    hour: u8,
    minute: u8,
    second: u8,
    day: u8,
    month: u8,
    year: u16,
    weekday: u8,
    valid: bool,
}

impl CalendarTime {
    /// 1970-01-01 00:00:00, a Thursday
    pub const UNIX_EPOCH: Self = Self {
        hour: 0,
        minute: 0,
        second: 0,
        day: 1,
        month: 1,
        year: calendar::EPOCH_YEAR,
        weekday: 5,
        valid: false,
    };

    /// Build a calendar time from its civil fields
    ///
    /// Returns `None` for dates before 1970 or values out of range.
    /// The weekday is derived from the date.
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Option<Self> {
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        let days = calendar::days_from_civil(year, month, day)?;
        Some(Self {
            hour,
            minute,
            second,
            day,
            month,
            year,
            weekday: calendar::weekday_from_days(days),
            valid: false,
        })
    }

    /// Convert seconds since 1970-01-01T00:00:00 to calendar time
    ///
    /// Returns `None` past the end of year 65535.
    pub fn from_epoch(epoch: u64) -> Option<Self> {
        let days = epoch / SECONDS_PER_DAY;
        let secs_today = epoch % SECONDS_PER_DAY;
        let (year, month, day) = calendar::civil_from_days(days)?;

        Some(Self {
            // secs_today < 86400, so every component fits in a u8
            hour: (secs_today / 3600) as u8,
            minute: ((secs_today % 3600) / 60) as u8,
            second: (secs_today % 60) as u8,
            day,
            month,
            year,
            weekday: calendar::weekday_from_days(days),
            valid: false,
        })
    }

    /// Seconds since 1970-01-01T00:00:00
    pub fn to_epoch(&self) -> u64 {
        // Fields were checked on construction, so the date exists
        let days = calendar::days_from_civil(self.year, self.month, self.day).unwrap_or(0);
        days * SECONDS_PER_DAY
            + u64::from(self.hour) * 3600
            + u64::from(self.minute) * 60
            + u64::from(self.second)
    }

    /// Copy of this time carrying the given validity
    pub fn with_validity(self, valid: bool) -> Self {
        Self { valid, ..self }
    }

    /// Hour (0-23)
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute (0-59)
    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Second (0-59)
    pub fn second(&self) -> u8 {
        self.second
    }

    /// Day of month (1-31)
    pub fn day(&self) -> u8 {
        self.day
    }

    /// Month (1-12)
    pub fn month(&self) -> u8 {
        self.month
    }

    /// Full year, e.g. 2025
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Day of week, 1 = Sunday .. 7 = Saturday
    pub fn weekday(&self) -> u8 {
        self.weekday
    }

    /// Whether the time came from a trustworthy source
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// (hour, minute, second)
    pub fn hms(&self) -> (u8, u8, u8) {
        (self.hour, self.minute, self.second)
    }

    /// Minute and second both read zero
    pub fn is_top_of_hour(&self) -> bool {
        self.minute == 0 && self.second == 0
    }

    /// 00:00:00
    pub fn is_midnight(&self) -> bool {
        self.hour == 0 && self.is_top_of_hour()
    }
}

impl Default for CalendarTime {
    fn default() -> Self {
        Self::UNIX_EPOCH
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// 2024-02-29 00:00:00
    const LEAP_DAY_2024: u64 = 1_709_164_800;

    #[test]
    fn test_epoch_zero() {
        let t = CalendarTime::from_epoch(0).unwrap();
        assert_eq!(t, CalendarTime::UNIX_EPOCH);
        assert!(!t.is_valid());
    }

    #[test]
    fn test_leap_day_2024() {
        let t = CalendarTime::from_epoch(LEAP_DAY_2024).unwrap();
        assert_eq!((t.year(), t.month(), t.day()), (2024, 2, 29));
        assert_eq!(t.hms(), (0, 0, 0));

        let next = CalendarTime::from_epoch(LEAP_DAY_2024 + 86_400).unwrap();
        assert_eq!((next.year(), next.month(), next.day()), (2024, 3, 1));
    }

    #[test]
    fn test_march_first_2025_follows_february_28th() {
        let feb_28 = CalendarTime::new(2025, 2, 28, 0, 0, 0).unwrap().to_epoch();
        let mar_1 = CalendarTime::new(2025, 3, 1, 0, 0, 0).unwrap().to_epoch();
        assert_eq!(mar_1 - feb_28, 86_400);

        let t = CalendarTime::from_epoch(mar_1).unwrap();
        assert_eq!((t.year(), t.month(), t.day()), (2025, 3, 1));
    }

    #[test]
    fn test_end_of_century() {
        let t = CalendarTime::new(1999, 12, 31, 23, 59, 59).unwrap();
        let converted = CalendarTime::from_epoch(t.to_epoch()).unwrap();
        assert_eq!(converted, t);

        let rolled = CalendarTime::from_epoch(t.to_epoch() + 1).unwrap();
        assert_eq!((rolled.year(), rolled.month(), rolled.day()), (2000, 1, 1));
        assert_eq!(rolled.hms(), (0, 0, 0));
        // 2000-01-01 was a Saturday
        assert_eq!(rolled.weekday(), 7);
    }

    #[test]
    fn test_new_rejects_out_of_range_fields() {
        assert!(CalendarTime::new(2025, 1, 1, 24, 0, 0).is_none());
        assert!(CalendarTime::new(2025, 1, 1, 0, 60, 0).is_none());
        assert!(CalendarTime::new(2025, 1, 1, 0, 0, 60).is_none());
        assert!(CalendarTime::new(2025, 2, 29, 0, 0, 0).is_none());
        assert!(CalendarTime::new(1969, 12, 31, 0, 0, 0).is_none());
    }

    #[test]
    fn test_top_of_hour_and_midnight() {
        let top = CalendarTime::new(2025, 6, 1, 14, 0, 0).unwrap();
        assert!(top.is_top_of_hour());
        assert!(!top.is_midnight());

        let midnight = CalendarTime::new(2025, 6, 2, 0, 0, 0).unwrap();
        assert!(midnight.is_midnight());

        let not_top = CalendarTime::new(2025, 6, 1, 14, 0, 1).unwrap();
        assert!(!not_top.is_top_of_hour());
    }

    #[test]
    fn test_round_trip_conversion() {
        let test_dates = [
            0u64,       // 1970-01-01 00:00:00
            946684800,  // 2000-01-01 00:00:00
            1609459200, // 2021-01-01 00:00:00
            1704067200, // 2024-01-01 00:00:00
            2147483647, // 2038-01-19 03:14:07 (32-bit Unix time limit)
            4102444800, // 2100-01-01 00:00:00
        ];

        for &epoch in &test_dates {
            let t = CalendarTime::from_epoch(epoch).unwrap();
            assert_eq!(epoch, t.to_epoch(), "Round trip failed for timestamp {}", epoch);
        }
    }

    proptest! {
        #[test]
        fn epoch_round_trip(epoch in 0u64..4_102_444_800) {
            let t = CalendarTime::from_epoch(epoch).unwrap();
            prop_assert_eq!(t.to_epoch(), epoch);
            prop_assert!(t.day() >= 1);
            prop_assert!(t.day() <= calendar::days_in_month(t.year(), t.month()));
            prop_assert!(t.hour() < 24 && t.minute() < 60 && t.second() < 60);
        }

        #[test]
        fn weekday_advances_daily(epoch in 0u64..4_102_444_800) {
            let today = CalendarTime::from_epoch(epoch).unwrap();
            let tomorrow = CalendarTime::from_epoch(epoch + 86_400).unwrap();
            prop_assert_eq!(tomorrow.weekday(), today.weekday() % 7 + 1);
        }
    }
}
