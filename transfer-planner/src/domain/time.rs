//! Timetable time handling.
//!
//! Scan times are plain seconds since midnight of the service day. Trips that
//! run past midnight keep counting (`25:10:00` is `90_600`), so no arithmetic
//! in the planner ever wraps around.

use chrono::{Datelike, NaiveDate};

/// Seconds since midnight of the service day. May exceed 86 400.
pub type Time = u32;

/// A length of time in seconds.
pub type Duration = u32;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse a `H:MM:SS` / `HH:MM:SS` timetable time into seconds.
///
/// Hours are not capped at 23, since services after midnight are written
/// as `24:05:00` and later.
///
/// # Examples
///
/// ```
/// use transfer_planner::domain::parse_time;
///
/// assert_eq!(parse_time("09:00:00"), Ok(32_400));
/// assert_eq!(parse_time("7:30:15"), Ok(27_015));
/// assert_eq!(parse_time("25:10:00"), Ok(90_600));
///
/// assert!(parse_time("09:00").is_err());
/// assert!(parse_time("09:60:00").is_err());
/// ```
pub fn parse_time(s: &str) -> Result<Time, TimeError> {
    let mut parts = s.trim().split(':');

    let (Some(h), Some(m), Some(sec), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TimeError::new("expected HH:MM:SS format"));
    };

    let hours: u32 = parse_digits(h).ok_or_else(|| TimeError::new("invalid hour digits"))?;
    let minutes: u32 = parse_digits(m).ok_or_else(|| TimeError::new("invalid minute digits"))?;
    let seconds: u32 = parse_digits(sec).ok_or_else(|| TimeError::new("invalid second digits"))?;

    if m.len() != 2 || sec.len() != 2 {
        return Err(TimeError::new("minutes and seconds must be two digits"));
    }
    if minutes > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }
    if seconds > 59 {
        return Err(TimeError::new("second must be 0-59"));
    }

    hours
        .checked_mul(3600)
        .and_then(|t| t.checked_add(minutes * 60 + seconds))
        .ok_or_else(|| TimeError::new("time out of range"))
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Render a time as `HH:MM:SS`.
///
/// ```
/// use transfer_planner::domain::format_time;
///
/// assert_eq!(format_time(36_000), "10:00:00");
/// assert_eq!(format_time(90_061), "25:01:01");
/// ```
pub fn format_time(time: Time) -> String {
    let hours = time / 3600;
    let minutes = (time % 3600) / 60;
    let seconds = time % 60;

    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// The calendar day a scan is run for.
///
/// Carries the date as a `YYYYMMDD` number together with the weekday index
/// (0 = Sunday … 6 = Saturday), which is the form service calendars are
/// evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceDay {
    date: u32,
    weekday: u8,
}

impl ServiceDay {
    /// Create a service day from a `YYYYMMDD` date number and weekday index.
    ///
    /// The weekday is taken modulo 7.
    pub fn new(date: u32, weekday: u8) -> Self {
        Self {
            date,
            weekday: weekday % 7,
        }
    }

    /// Derive the service day for a calendar date.
    ///
    /// # Examples
    ///
    /// ```
    /// use transfer_planner::domain::ServiceDay;
    /// use chrono::NaiveDate;
    ///
    /// // 1 January 2019 was a Tuesday
    /// let day = ServiceDay::from_date(NaiveDate::from_ymd_opt(2019, 1, 1).unwrap());
    /// assert_eq!(day.date_number(), 20190101);
    /// assert_eq!(day.weekday(), 2);
    /// ```
    pub fn from_date(date: NaiveDate) -> Self {
        let number = date.year() as u32 * 10_000 + date.month() * 100 + date.day();
        Self::new(number, date.weekday().num_days_from_sunday() as u8)
    }

    /// Returns the `YYYYMMDD` date number.
    pub fn date_number(&self) -> u32 {
        self.date
    }

    /// Returns the weekday index, 0 = Sunday.
    pub fn weekday(&self) -> u8 {
        self.weekday
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_times() {
        assert_eq!(parse_time("00:00:00"), Ok(0));
        assert_eq!(parse_time("10:00:00"), Ok(36_000));
        assert_eq!(parse_time(" 10:00:30 "), Ok(36_030));
        assert_eq!(parse_time("48:00:00"), Ok(172_800));
    }

    #[test]
    fn reject_malformed_times() {
        assert!(parse_time("").is_err());
        assert!(parse_time("10").is_err());
        assert!(parse_time("10:00").is_err());
        assert!(parse_time("10:00:00:00").is_err());
        assert!(parse_time("aa:00:00").is_err());
        assert!(parse_time("10:0:00").is_err());
        assert!(parse_time("10:00:5").is_err());
        assert!(parse_time("10:-1:00").is_err());
    }

    #[test]
    fn reject_out_of_range_components() {
        assert!(parse_time("10:60:00").is_err());
        assert!(parse_time("10:00:60").is_err());
    }

    #[test]
    fn format_pads_components() {
        assert_eq!(format_time(0), "00:00:00");
        assert_eq!(format_time(3661), "01:01:01");
        assert_eq!(format_time(32_400), "09:00:00");
    }

    #[test]
    fn service_day_weekdays() {
        // 5 January 2020 was a Sunday
        let sunday = ServiceDay::from_date(NaiveDate::from_ymd_opt(2020, 1, 5).unwrap());
        assert_eq!(sunday.weekday(), 0);
        assert_eq!(sunday.date_number(), 20200105);

        let saturday = ServiceDay::from_date(NaiveDate::from_ymd_opt(2020, 1, 11).unwrap());
        assert_eq!(saturday.weekday(), 6);
    }

    #[test]
    fn service_day_wraps_weekday() {
        assert_eq!(ServiceDay::new(20200101, 9).weekday(), 2);
    }
}
