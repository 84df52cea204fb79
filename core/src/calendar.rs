//! Calendar date conversions for the proleptic Gregorian calendar
//!
//! Converts between days since the Unix epoch (1970-01-01) and civil
//! (year, month, day) dates by walking the year and month-length tables.
//! Every year and every month boundary is accounted for explicitly, so
//! leap days and month rollovers come out exactly right.
//!
//! **Limitations**:
//! - Valid range: 1970-01-01 to 65535-12-31 (u16 year limit)
//! - No leap seconds (NTP ignores them too)
//! - Time zones are applied by the caller as a whole-hour offset

/// Seconds in one civil day
pub const SECONDS_PER_DAY: u64 = 86_400;

/// First year representable (the Unix epoch)
pub const EPOCH_YEAR: u16 = 1970;

/// 1970-01-01 was a Thursday
const EPOCH_WEEKDAY_OFFSET: u64 = 4;

/// Month lengths in a common year, January first
const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Check if year is a leap year (Gregorian calendar)
///
/// Correctly implements standard leap year rules:
/// - Divisible by 4: leap year
/// - EXCEPT divisible by 100: not a leap year
/// - EXCEPT divisible by 400: leap year
///
/// Examples:
/// - 2000: leap (divisible by 400)
/// - 1900: NOT leap (divisible by 100 but not 400)
/// - 2024: leap (divisible by 4, not by 100)
/// - 2100: NOT leap (divisible by 100 but not 400)
pub fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `year`
pub fn days_in_year(year: u16) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Number of days in `month` (1-12) of `year`, or 0 for an invalid month
pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        1..=12 => DAYS_IN_MONTH[usize::from(month - 1)],
        _ => 0,
    }
}

/// Day of week for a day count since the epoch, 1 = Sunday .. 7 = Saturday
pub fn weekday_from_days(days_since_epoch: u64) -> u8 {
    // Value is in 0..7, so the cast cannot truncate
    ((days_since_epoch + EPOCH_WEEKDAY_OFFSET) % 7) as u8 + 1
}

/// Convert days since Unix epoch to civil date (year, month, day)
///
/// Walks whole years first, then the month table of the final year.
/// Returns `None` if the date lies beyond year 65535.
pub fn civil_from_days(days_since_epoch: u64) -> Option<(u16, u8, u8)> {
    let mut remaining = days_since_epoch;
    let mut year = EPOCH_YEAR;
    loop {
        let year_len = u64::from(days_in_year(year));
        if remaining < year_len {
            break;
        }
        remaining -= year_len;
        year = year.checked_add(1)?;
    }

    let mut month = 1u8;
    loop {
        let month_len = u64::from(days_in_month(year, month));
        if remaining < month_len {
            break;
        }
        remaining -= month_len;
        month += 1;
    }

    // remaining < 31 after the month walk
    Some((year, month, remaining as u8 + 1))
}

/// Convert civil date (year, month, day) to days since Unix epoch
///
/// Returns `None` for dates before 1970-01-01 or that do not exist
/// (month 13, February 30th, ...).
pub fn days_from_civil(year: u16, month: u8, day: u8) -> Option<u64> {
    if year < EPOCH_YEAR || day == 0 || day > days_in_month(year, month) {
        return None;
    }

    let year_days: u64 = (EPOCH_YEAR..year).map(|y| u64::from(days_in_year(y))).sum();
    let month_days: u64 = (1..month).map(|m| u64::from(days_in_month(year, m))).sum();

    Some(year_days + month_days + u64::from(day) - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leap_year() {
        assert!(is_leap_year(2000)); // Divisible by 400
        assert!(is_leap_year(2024)); // Divisible by 4
        assert!(!is_leap_year(1900)); // Divisible by 100, not 400
        assert!(!is_leap_year(2023)); // Not divisible by 4
        assert!(!is_leap_year(2100)); // Divisible by 100, not 400
    }

    #[test]
    fn test_month_lengths() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2100, 2), 28);
        assert_eq!(days_in_month(2025, 4), 30);
        assert_eq!(days_in_month(2025, 12), 31);
        assert_eq!(days_in_month(2025, 0), 0);
        assert_eq!(days_in_month(2025, 13), 0);
    }

    #[test]
    fn test_unix_epoch() {
        assert_eq!(civil_from_days(0), Some((1970, 1, 1)));
        assert_eq!(days_from_civil(1970, 1, 1), Some(0));
        // Thursday
        assert_eq!(weekday_from_days(0), 5);
    }

    #[test]
    fn test_known_dates() {
        // 2000-01-01 was a Saturday
        assert_eq!(days_from_civil(2000, 1, 1), Some(10_957));
        assert_eq!(weekday_from_days(10_957), 7);
        // 2024-02-29 was a Thursday
        assert_eq!(days_from_civil(2024, 2, 29), Some(19_782));
        assert_eq!(weekday_from_days(19_782), 5);
        // 2025-01-05 was a Sunday
        let sunday = days_from_civil(2025, 1, 5).unwrap();
        assert_eq!(weekday_from_days(sunday), 1);
    }

    #[test]
    fn test_month_and_year_rollover() {
        let jan_31 = days_from_civil(2025, 1, 31).unwrap();
        assert_eq!(civil_from_days(jan_31 + 1), Some((2025, 2, 1)));

        let dec_31 = days_from_civil(1999, 12, 31).unwrap();
        assert_eq!(civil_from_days(dec_31 + 1), Some((2000, 1, 1)));

        let feb_28_2100 = days_from_civil(2100, 2, 28).unwrap();
        assert_eq!(civil_from_days(feb_28_2100 + 1), Some((2100, 3, 1)));
    }

    #[test]
    fn test_rejects_impossible_dates() {
        assert_eq!(days_from_civil(1969, 12, 31), None);
        assert_eq!(days_from_civil(2025, 2, 29), None);
        assert_eq!(days_from_civil(2025, 13, 1), None);
        assert_eq!(days_from_civil(2025, 4, 0), None);
    }

    #[test]
    fn test_year_overflow() {
        let last_day = days_from_civil(u16::MAX, 12, 31).unwrap();
        assert_eq!(civil_from_days(last_day), Some((u16::MAX, 12, 31)));
        assert_eq!(civil_from_days(last_day + 1), None);
    }
}
