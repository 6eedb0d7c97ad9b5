//! Service calendar type.
//!
//! A `Service` says on which days the trips referencing it run: a validity
//! date range, a weekday bitmap, and per-date exceptions that add or remove
//! single days.

use std::collections::HashMap;

use super::ServiceDay;

/// Weekday flags indexed by days from Sunday (0 = Sunday … 6 = Saturday).
pub type Weekdays = [bool; 7];

/// Every day of the week.
pub const ALL_DAYS: Weekdays = [true; 7];

/// Service calendar shared by every trip with the same service id.
///
/// # Examples
///
/// ```
/// use transfer_planner::domain::{Service, ServiceDay};
///
/// // Weekdays only, for 2019
/// let service = Service::new(20190101, 20191231, [false, true, true, true, true, true, false])
///     .with_exception(20190101, false); // not on New Year's Day
///
/// assert!(!service.runs_on(ServiceDay::new(20190101, 2)));
/// assert!(service.runs_on(ServiceDay::new(20190102, 3)));
/// assert!(!service.runs_on(ServiceDay::new(20190105, 6)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    /// First date (`YYYYMMDD`) the service is valid, inclusive
    pub start_date: u32,
    /// Last date (`YYYYMMDD`) the service is valid, inclusive
    pub end_date: u32,
    /// Weekdays the service runs on within its validity range
    pub days: Weekdays,
    /// Per-date overrides: `true` adds the date, `false` removes it
    pub exceptions: HashMap<u32, bool>,
}

impl Service {
    /// Create a calendar without exceptions.
    pub fn new(start_date: u32, end_date: u32, days: Weekdays) -> Self {
        Self {
            start_date,
            end_date,
            days,
            exceptions: HashMap::new(),
        }
    }

    /// Create a calendar that runs every day between the two dates.
    pub fn every_day(start_date: u32, end_date: u32) -> Self {
        Self::new(start_date, end_date, ALL_DAYS)
    }

    /// Add a per-date exception.
    pub fn with_exception(mut self, date: u32, runs: bool) -> Self {
        self.exceptions.insert(date, runs);
        self
    }

    /// Returns true if the service runs on the given day.
    ///
    /// An explicit exception for the date always decides. Otherwise the date
    /// must lie inside the validity range and its weekday must be set.
    pub fn runs_on(&self, day: ServiceDay) -> bool {
        if let Some(&runs) = self.exceptions.get(&day.date_number()) {
            return runs;
        }

        let date = day.date_number();

        date >= self.start_date
            && date <= self.end_date
            && self.days[usize::from(day.weekday())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEEKDAYS: Weekdays = [false, true, true, true, true, true, false];

    #[test]
    fn runs_inside_range_on_set_weekday() {
        let service = Service::new(20190101, 20191231, WEEKDAYS);

        // Wednesday 2 January 2019
        assert!(service.runs_on(ServiceDay::new(20190102, 3)));
    }

    #[test]
    fn does_not_run_on_unset_weekday() {
        let service = Service::new(20190101, 20191231, WEEKDAYS);

        // Sunday 6 January 2019
        assert!(!service.runs_on(ServiceDay::new(20190106, 0)));
    }

    #[test]
    fn does_not_run_outside_range() {
        let service = Service::every_day(20190101, 20191231);

        assert!(!service.runs_on(ServiceDay::new(20181231, 1)));
        assert!(!service.runs_on(ServiceDay::new(20200101, 3)));
        assert!(service.runs_on(ServiceDay::new(20190101, 2)));
        assert!(service.runs_on(ServiceDay::new(20191231, 2)));
    }

    #[test]
    fn excluded_date_does_not_run() {
        let service = Service::every_day(20190101, 20191231).with_exception(20190704, false);

        assert!(!service.runs_on(ServiceDay::new(20190704, 4)));
        assert!(service.runs_on(ServiceDay::new(20190705, 5)));
    }

    #[test]
    fn included_date_runs_outside_pattern() {
        // Weekday service running on one extra Sunday, and one day after the range ends
        let service = Service::new(20190101, 20190131, WEEKDAYS)
            .with_exception(20190106, true)
            .with_exception(20190201, true);

        assert!(service.runs_on(ServiceDay::new(20190106, 0)));
        assert!(service.runs_on(ServiceDay::new(20190201, 5)));
        assert!(!service.runs_on(ServiceDay::new(20190204, 1)));
    }
}
