//! Depart-after queries: earliest arrival from a set of origins to a set of
//! destinations, leaving no earlier than a given time.

use chrono::NaiveDate;
use tracing::debug;

use super::journey_factory::JourneyFactory;
use super::scan_results::OriginDepartureTimes;
use super::scanner::ConnectionScanner;
use crate::domain::{Journey, ServiceDay, StopId, Time};

/// Post-processing applied to a query's journeys.
///
/// Filters run in the order they were added, each receiving the output of
/// the previous one.
pub trait JourneyFilter: Send + Sync {
    /// Filter (or reorder) a list of journeys.
    fn apply(&self, journeys: Vec<Journey>) -> Vec<Journey>;
}

impl<F> JourneyFilter for F
where
    F: Fn(Vec<Journey>) -> Vec<Journey> + Send + Sync,
{
    fn apply(&self, journeys: Vec<Journey>) -> Vec<Journey> {
        self(journeys)
    }
}

/// Plans journeys leaving every origin at the same time.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use chrono::NaiveDate;
/// use transfer_planner::domain::{Service, StopId, StopTime, Trip};
/// use transfer_planner::planner::{ConnectionScanner, DepartAfterQuery};
/// use transfer_planner::timetable::TimetableBuilder;
///
/// let timetable = TimetableBuilder::new()
///     .trip(Trip::new("T1", "S1", Arc::new(Service::every_day(20190101, 20191231)), vec![
///         StopTime::new("A", 36_000, 36_000),
///         StopTime::new("B", 37_800, 37_800),
///     ]))
///     .build();
///
/// let query = DepartAfterQuery::new(ConnectionScanner::new(&timetable));
/// let date = NaiveDate::from_ymd_opt(2019, 6, 1).unwrap();
/// let journeys = query.plan(&[StopId::new("A")], &[StopId::new("B")], date, 32_400);
///
/// assert_eq!(journeys.len(), 1);
/// assert_eq!(journeys[0].arrival_time(), 37_800);
/// ```
pub struct DepartAfterQuery<'a> {
    scanner: ConnectionScanner<'a>,
    factory: JourneyFactory,
    filters: Vec<Box<dyn JourneyFilter + 'a>>,
}

impl<'a> DepartAfterQuery<'a> {
    /// Create a query with no filters.
    pub fn new(scanner: ConnectionScanner<'a>) -> Self {
        Self {
            scanner,
            factory: JourneyFactory::new(),
            filters: Vec::new(),
        }
    }

    /// Add a filter to run after reconstruction.
    pub fn with_filter(mut self, filter: impl JourneyFilter + 'a) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Plan journeys from `origins` to `destinations` on `date`, leaving at
    /// or after `time`.
    ///
    /// Returns one journey per reachable destination, in destination order,
    /// after every filter has run.
    pub fn plan(
        &self,
        origins: &[StopId],
        destinations: &[StopId],
        date: NaiveDate,
        time: Time,
    ) -> Vec<Journey> {
        let origin_times: OriginDepartureTimes =
            origins.iter().map(|origin| (origin.clone(), time)).collect();
        let day = ServiceDay::from_date(date);

        let index = self.scanner.scan(&origin_times, day);
        let journeys = self.factory.journeys(&index, destinations);

        debug!(
            origins = origins.len(),
            destinations = destinations.len(),
            found = journeys.len(),
            %date,
            "Depart-after query complete"
        );

        self.filters
            .iter()
            .fold(journeys, |journeys, filter| filter.apply(journeys))
    }
}
