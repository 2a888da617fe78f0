// libs/appointment-cell/src/services/validation.rs
use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use regex::Regex;
use tracing::debug;

use crate::models::AppointmentError;

pub const MAX_EMAIL_LENGTH: usize = 120;

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern compiles"));

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,4}$").expect("email pattern compiles")
});

/// Parses a strict `YYYY-MM-DD` calendar day. Impossible days such as
/// `2025-02-30` are rejected as badly formatted.
pub fn parse_appointment_date(raw: Option<&str>) -> Result<NaiveDate, AppointmentError> {
    let raw = raw.ok_or(AppointmentError::InvalidDateFormat)?;

    if !DATE_PATTERN.is_match(raw) {
        debug!("Rejected appointment date with bad format: {:?}", raw);
        return Err(AppointmentError::InvalidDateFormat);
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| AppointmentError::InvalidDateFormat)
}

/// First day that can be booked: the day after `today`.
pub fn earliest_bookable_date(today: NaiveDate) -> NaiveDate {
    today.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX)
}

pub fn ensure_bookable(date: NaiveDate, today: NaiveDate) -> Result<(), AppointmentError> {
    if date < earliest_bookable_date(today) {
        debug!("Rejected appointment date {} (today is {})", date, today);
        return Err(AppointmentError::DateInPast);
    }
    Ok(())
}

pub fn validate_worker_email(raw: Option<&str>) -> Result<&str, AppointmentError> {
    match raw {
        Some(email) if email.chars().count() <= MAX_EMAIL_LENGTH && EMAIL_PATTERN.is_match(email) => Ok(email),
        _ => Err(AppointmentError::InvalidEmail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_strict_date_format() {
        assert_eq!(parse_appointment_date(Some("2999-01-01")).unwrap(), day(2999, 1, 1));

        for raw in ["", "2999-1-01", "01-01-2999", "2999/01/01", "2999-01-01T10:00:00", " 2999-01-01", "2999-01-01\n"] {
            assert_matches!(parse_appointment_date(Some(raw)), Err(AppointmentError::InvalidDateFormat), "{raw:?}");
        }
        assert_matches!(parse_appointment_date(None), Err(AppointmentError::InvalidDateFormat));
    }

    #[test]
    fn test_impossible_calendar_day_is_a_format_error() {
        assert_matches!(parse_appointment_date(Some("2025-02-30")), Err(AppointmentError::InvalidDateFormat));
        assert_matches!(parse_appointment_date(Some("2025-13-01")), Err(AppointmentError::InvalidDateFormat));
    }

    #[test]
    fn test_today_is_not_bookable_but_tomorrow_is() {
        let today = day(2026, 10, 18);

        assert_matches!(ensure_bookable(today, today), Err(AppointmentError::DateInPast));
        assert_matches!(ensure_bookable(day(2026, 10, 17), today), Err(AppointmentError::DateInPast));
        assert!(ensure_bookable(day(2026, 10, 19), today).is_ok());
        assert_eq!(earliest_bookable_date(day(2026, 12, 31)), day(2027, 1, 1));
    }

    #[test]
    fn test_worker_email_rules() {
        assert_eq!(validate_worker_email(Some("jane.doe@example.com")).unwrap(), "jane.doe@example.com");

        let local = "a".repeat(MAX_EMAIL_LENGTH);
        let too_long = format!("{}@example.com", local);
        for raw in ["not-an-email", "a@b", "a@example.c", "a@example.online", "a b@example.com", too_long.as_str()] {
            assert_matches!(validate_worker_email(Some(raw)), Err(AppointmentError::InvalidEmail), "{raw:?}");
        }
        assert_matches!(validate_worker_email(None), Err(AppointmentError::InvalidEmail));
    }

    #[test]
    fn test_email_at_length_limit_is_accepted() {
        let domain = "@example.com";
        let email = format!("{}{}", "a".repeat(MAX_EMAIL_LENGTH - domain.len()), domain);
        assert_eq!(email.len(), MAX_EMAIL_LENGTH);
        assert!(validate_worker_email(Some(&email)).is_ok());
    }
}
