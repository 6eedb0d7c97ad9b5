//! Trip type.
//!
//! A `Trip` is one scheduled run of a vehicle: its identity, the calendar it
//! runs to, and every stop-time in calling order.

use std::sync::Arc;

use super::{Service, ServiceDay, StopId, StopTime, StopTimeIndex, Time};

/// One scheduled vehicle run.
///
/// Trips are shared between every hop generated from them, so they are held
/// behind `Arc` throughout the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    /// Trip identifier; two hops continue the same ride iff their ids match
    pub trip_id: String,
    /// Identifier of the calendar the trip runs to
    pub service_id: String,
    /// The calendar itself
    pub service: Arc<Service>,
    /// Calls in order
    pub stop_times: Vec<StopTime>,
}

impl Trip {
    /// Creates a trip.
    pub fn new(
        trip_id: impl Into<String>,
        service_id: impl Into<String>,
        service: Arc<Service>,
        stop_times: Vec<StopTime>,
    ) -> Self {
        Self {
            trip_id: trip_id.into(),
            service_id: service_id.into(),
            service,
            stop_times,
        }
    }

    /// Returns true if the trip runs on the given day.
    pub fn runs_on(&self, day: ServiceDay) -> bool {
        self.service.runs_on(day)
    }

    /// Find the ridden part of this trip between two stops.
    ///
    /// Boards at the first stop-time at `origin` that allows pickup and
    /// departs no earlier than `depart_after`, then alights at the first
    /// later stop-time at `destination` that allows dropoff.
    ///
    /// Returns the board and alight indices, or `None` if the trip does not
    /// serve that ride.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use transfer_planner::domain::{Service, StopId, StopTime, StopTimeIndex, Trip};
    ///
    /// let trip = Trip::new("T1", "S1", Arc::new(Service::every_day(20190101, 20191231)), vec![
    ///     StopTime::new("A", 1000, 1000),
    ///     StopTime::new("B", 1010, 1012),
    ///     StopTime::new("C", 1020, 1020),
    /// ]);
    ///
    /// let ride = trip.find_ride(&StopId::new("A"), 900, &StopId::new("C"));
    /// assert_eq!(ride, Some((StopTimeIndex(0), StopTimeIndex(2))));
    ///
    /// // Too late to board at A
    /// assert_eq!(trip.find_ride(&StopId::new("A"), 1001, &StopId::new("C")), None);
    /// ```
    pub fn find_ride(
        &self,
        origin: &StopId,
        depart_after: Time,
        destination: &StopId,
    ) -> Option<(StopTimeIndex, StopTimeIndex)> {
        let board = self
            .stop_times
            .iter()
            .position(|st| st.can_board(origin, depart_after))?;

        let alight = self.stop_times[board + 1..]
            .iter()
            .position(|st| st.can_alight(destination))?;

        Some((StopTimeIndex(board), StopTimeIndex(board + 1 + alight)))
    }
}
