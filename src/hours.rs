//! Helpers for the HHH.MM clock-decimal convention used on paper logbooks.
//!
//! A value like 123.30 means 123 hours 30 minutes: the fractional part is a
//! minute count, not a fraction of an hour. These functions trust well-formed
//! input (fractional part 00-59); `validate_clock_decimal` is applied at the
//! model boundary so malformed values never reach the formatters.

use bigdecimal::BigDecimal;
use chrono::Duration;
use num_traits::ToPrimitive;

/// Split an HHH.MM decimal into whole hours and minutes.
fn split_clock_decimal(value: &BigDecimal) -> (i64, i64) {
    let value = value.to_f64().unwrap_or(0.0);
    let hours = value.trunc() as i64;
    let minutes = ((value - hours as f64) * 100.0).round() as i64;
    (hours, minutes)
}

/// Format an HHH.MM decimal as an "H:MM" display string (123.30 -> "123:30").
pub fn format_hours_hhmm(value: &BigDecimal) -> String {
    let (hours, minutes) = split_clock_decimal(value);
    format!("{hours}:{minutes:02}")
}

/// Convert an HHH.MM decimal into a duration (123.30 -> 123h 30m).
pub fn clock_decimal_to_duration(value: &BigDecimal) -> Duration {
    let (hours, minutes) = split_clock_decimal(value);
    Duration::hours(hours) + Duration::minutes(minutes)
}

/// Format a duration as "H:MM" (hours are not capped at 24).
pub fn format_duration_hhmm(duration: Duration) -> String {
    let total_minutes = duration.num_minutes();
    format!("{}:{:02}", total_minutes / 60, total_minutes % 60)
}

/// Check that a decimal is a well-formed, non-negative HHH.MM value.
///
/// Rejects fractional parts that would map to 60+ minutes (e.g. 5.75, which
/// would otherwise format as the nonsensical "5:75").
pub fn validate_clock_decimal(value: &BigDecimal) -> bool {
    if value < &BigDecimal::from(0) {
        return false;
    }
    let (_, minutes) = split_clock_decimal(value);
    (0..=59).contains(&minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_hours_hhmm() {
        assert_eq!(format_hours_hhmm(&dec("123.30")), "123:30");
        assert_eq!(format_hours_hhmm(&dec("5.05")), "5:05");
        assert_eq!(format_hours_hhmm(&dec("0.00")), "0:00");
        assert_eq!(format_hours_hhmm(&dec("0.59")), "0:59");
    }

    #[test]
    fn test_clock_decimal_to_duration() {
        assert_eq!(
            clock_decimal_to_duration(&dec("123.30")),
            Duration::hours(123) + Duration::minutes(30)
        );
        assert_eq!(clock_decimal_to_duration(&dec("0.05")), Duration::minutes(5));
        assert_eq!(clock_decimal_to_duration(&dec("2")), Duration::hours(2));
    }

    #[test]
    fn test_format_duration_hhmm() {
        assert_eq!(format_duration_hhmm(Duration::zero()), "0:00");
        assert_eq!(
            format_duration_hhmm(Duration::hours(123) + Duration::minutes(30)),
            "123:30"
        );
        // Totals can exceed a day; hours keep accumulating
        assert_eq!(format_duration_hhmm(Duration::hours(30)), "30:00");
    }

    #[test]
    fn test_validate_clock_decimal() {
        assert!(validate_clock_decimal(&dec("123.30")));
        assert!(validate_clock_decimal(&dec("0")));
        assert!(validate_clock_decimal(&dec("5.59")));
        // 60+ minutes in the fractional part is malformed
        assert!(!validate_clock_decimal(&dec("5.75")));
        assert!(!validate_clock_decimal(&dec("5.60")));
        assert!(!validate_clock_decimal(&dec("-1.00")));
    }
}
