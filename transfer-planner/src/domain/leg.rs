//! Journey leg types.
//!
//! A `Leg` is either a ride on one trip (`TimetableLeg`) or a walking
//! `Transfer`. Timetable legs refer to a contiguous slice of their trip's
//! stop-times, so every stop actually passed is available, not just the
//! endpoints of the hops that were scanned.

use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::{DomainError, StopId, StopTime, StopTimeIndex, Time, Transfer, Trip};

/// A ride on a single trip.
///
/// Uses `Arc<Trip>` for cheap cloning while journeys are rebuilt and
/// compacted.
///
/// # Invariants
///
/// - `alight_idx > board_idx` (must travel forward on the trip)
/// - Both indices are valid for the trip's stop-times
#[derive(Debug, Clone)]
pub struct TimetableLeg {
    trip: Arc<Trip>,
    board_idx: StopTimeIndex,
    alight_idx: StopTimeIndex,
}

impl TimetableLeg {
    /// Construct a leg, validating the indices.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - `alight_idx <= board_idx` (must travel forward)
    /// - Either index is out of bounds
    pub fn new(
        trip: Arc<Trip>,
        board_idx: StopTimeIndex,
        alight_idx: StopTimeIndex,
    ) -> Result<Self, DomainError> {
        if alight_idx.0 <= board_idx.0 {
            return Err(DomainError::InvalidLeg(
                "alight index must be after board index",
            ));
        }

        if alight_idx.0 >= trip.stop_times.len() {
            return Err(DomainError::InvalidStopTimeIndex);
        }

        Ok(TimetableLeg {
            trip,
            board_idx,
            alight_idx,
        })
    }

    /// Build the leg that rides `trip` from `origin` to `destination`,
    /// boarding no earlier than `depart_after`.
    ///
    /// Returns `None` if the trip does not serve that ride.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use transfer_planner::domain::{Service, StopId, StopTime, TimetableLeg, Trip};
    ///
    /// let trip = Arc::new(Trip::new("T1", "S1", Arc::new(Service::every_day(20190101, 20191231)), vec![
    ///     StopTime::new("A", 1000, 1000),
    ///     StopTime::new("B", 1010, 1012),
    ///     StopTime::new("C", 1020, 1020),
    /// ]));
    ///
    /// let leg = TimetableLeg::find(&trip, &StopId::new("A"), 1000, &StopId::new("C")).unwrap();
    /// assert_eq!(leg.stop_times().len(), 3);
    /// assert_eq!(leg.departure_time(), 1000);
    /// assert_eq!(leg.arrival_time(), 1020);
    /// ```
    pub fn find(
        trip: &Arc<Trip>,
        origin: &StopId,
        depart_after: Time,
        destination: &StopId,
    ) -> Option<Self> {
        let (board_idx, alight_idx) = trip.find_ride(origin, depart_after, destination)?;

        Some(TimetableLeg {
            trip: trip.clone(),
            board_idx,
            alight_idx,
        })
    }

    /// Returns the trip this leg is on.
    pub fn trip(&self) -> &Arc<Trip> {
        &self.trip
    }

    /// Returns the boarding stop-time index.
    pub fn board_idx(&self) -> StopTimeIndex {
        self.board_idx
    }

    /// Returns the alighting stop-time index.
    pub fn alight_idx(&self) -> StopTimeIndex {
        self.alight_idx
    }

    /// Returns the stop-times ridden, from board to alight inclusive.
    pub fn stop_times(&self) -> &[StopTime] {
        &self.trip.stop_times[self.board_idx.0..=self.alight_idx.0]
    }

    /// Returns the boarding stop.
    pub fn origin(&self) -> &StopId {
        &self.trip.stop_times[self.board_idx.0].stop
    }

    /// Returns the alighting stop.
    pub fn destination(&self) -> &StopId {
        &self.trip.stop_times[self.alight_idx.0].stop
    }

    /// Returns the scheduled departure from the boarding stop.
    pub fn departure_time(&self) -> Time {
        self.trip.stop_times[self.board_idx.0].departure_time
    }

    /// Returns the scheduled arrival at the alighting stop.
    pub fn arrival_time(&self) -> Time {
        self.trip.stop_times[self.alight_idx.0].arrival_time
    }

    /// Returns the number of intermediate stops (excluding board and alight).
    pub fn intermediate_stop_count(&self) -> usize {
        self.alight_idx.0 - self.board_idx.0 - 1
    }
}

impl PartialEq for TimetableLeg {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.trip, &other.trip)
            && self.board_idx == other.board_idx
            && self.alight_idx == other.alight_idx
    }
}

impl Eq for TimetableLeg {}

impl Serialize for TimetableLeg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("TimetableLeg", 4)?;
        s.serialize_field("trip_id", &self.trip.trip_id)?;
        s.serialize_field("origin", self.origin())?;
        s.serialize_field("destination", self.destination())?;
        s.serialize_field("stop_times", self.stop_times())?;
        s.end()
    }
}

/// A leg of a journey: a ride or a walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Leg {
    /// A ride on one trip
    Timetable(TimetableLeg),
    /// A walk between stops
    Transfer(Transfer),
}

impl Leg {
    /// Returns the origin stop of this leg.
    pub fn origin(&self) -> &StopId {
        match self {
            Leg::Timetable(leg) => leg.origin(),
            Leg::Transfer(transfer) => &transfer.origin,
        }
    }

    /// Returns the destination stop of this leg.
    pub fn destination(&self) -> &StopId {
        match self {
            Leg::Timetable(leg) => leg.destination(),
            Leg::Transfer(transfer) => &transfer.destination,
        }
    }

    /// Returns true if this is a ride.
    pub fn is_timetable(&self) -> bool {
        matches!(self, Leg::Timetable(_))
    }

    /// Returns true if this is a walk.
    pub fn is_transfer(&self) -> bool {
        matches!(self, Leg::Transfer(_))
    }

    /// Returns the ride if this is a timetable leg.
    pub fn as_timetable(&self) -> Option<&TimetableLeg> {
        match self {
            Leg::Timetable(leg) => Some(leg),
            Leg::Transfer(_) => None,
        }
    }

    /// Returns the walk if this is a transfer leg.
    pub fn as_transfer(&self) -> Option<&Transfer> {
        match self {
            Leg::Timetable(_) => None,
            Leg::Transfer(transfer) => Some(transfer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Service;

    fn stop(s: &str) -> StopId {
        StopId::new(s)
    }

    fn make_trip() -> Arc<Trip> {
        Arc::new(Trip::new(
            "LN1111",
            "1",
            Arc::new(Service::every_day(20190101, 20991231)),
            vec![
                StopTime::new("A", 1000, 1000),
                StopTime::new("B", 1010, 1012),
                StopTime::new("C", 1020, 1022),
                StopTime::new("D", 1030, 1030),
            ],
        ))
    }

    #[test]
    fn leg_construction_valid() {
        let leg = TimetableLeg::new(make_trip(), StopTimeIndex(0), StopTimeIndex(3)).unwrap();

        assert_eq!(leg.departure_time(), 1000);
        assert_eq!(leg.arrival_time(), 1030);
        assert_eq!(leg.origin(), &stop("A"));
        assert_eq!(leg.destination(), &stop("D"));
    }

    #[test]
    fn leg_invalid_alight_before_board() {
        let result = TimetableLeg::new(make_trip(), StopTimeIndex(2), StopTimeIndex(1));
        assert!(matches!(result, Err(DomainError::InvalidLeg(_))));
    }

    #[test]
    fn leg_invalid_same_index() {
        let result = TimetableLeg::new(make_trip(), StopTimeIndex(1), StopTimeIndex(1));
        assert!(matches!(result, Err(DomainError::InvalidLeg(_))));
    }

    #[test]
    fn leg_invalid_out_of_bounds() {
        let result = TimetableLeg::new(make_trip(), StopTimeIndex(0), StopTimeIndex(10));
        assert!(matches!(result, Err(DomainError::InvalidStopTimeIndex)));
    }

    #[test]
    fn find_uses_departure_bound() {
        let trip = make_trip();

        let leg = TimetableLeg::find(&trip, &stop("B"), 1011, &stop("D")).unwrap();
        assert_eq!(leg.board_idx(), StopTimeIndex(1));
        assert_eq!(leg.alight_idx(), StopTimeIndex(3));
        assert_eq!(leg.departure_time(), 1012);

        assert!(TimetableLeg::find(&trip, &stop("B"), 1013, &stop("D")).is_none());
    }

    #[test]
    fn stop_times_include_intermediate_calls() {
        let leg = TimetableLeg::find(&make_trip(), &stop("A"), 0, &stop("D")).unwrap();

        let stops: Vec<&str> = leg.stop_times().iter().map(|st| st.stop.as_str()).collect();
        assert_eq!(stops, vec!["A", "B", "C", "D"]);
        assert_eq!(leg.intermediate_stop_count(), 2);
    }

    #[test]
    fn leg_equality() {
        let trip = make_trip();
        let leg1 = TimetableLeg::new(trip.clone(), StopTimeIndex(0), StopTimeIndex(2)).unwrap();
        let leg2 = TimetableLeg::new(trip.clone(), StopTimeIndex(0), StopTimeIndex(2)).unwrap();
        let leg3 = TimetableLeg::new(trip, StopTimeIndex(0), StopTimeIndex(3)).unwrap();

        assert_eq!(leg1, leg2);
        assert_ne!(leg1, leg3);
    }

    #[test]
    fn leg_variants() {
        let ride = Leg::Timetable(TimetableLeg::find(&make_trip(), &stop("A"), 0, &stop("B")).unwrap());
        let walk = Leg::Transfer(Transfer::new("B", "E", 120));

        assert!(ride.is_timetable());
        assert!(!ride.is_transfer());
        assert!(ride.as_timetable().is_some());
        assert!(ride.as_transfer().is_none());

        assert!(walk.is_transfer());
        assert!(walk.as_transfer().is_some());
        assert_eq!(walk.origin(), &stop("B"));
        assert_eq!(walk.destination(), &stop("E"));
    }

    #[test]
    fn serializes_with_tag() {
        let ride = Leg::Timetable(TimetableLeg::find(&make_trip(), &stop("A"), 0, &stop("B")).unwrap());
        let json = serde_json::to_value(&ride).unwrap();

        assert_eq!(json["type"], "timetable");
        assert_eq!(json["trip_id"], "LN1111");
        assert_eq!(json["origin"], "A");
        assert_eq!(json["destination"], "B");
        assert_eq!(json["stop_times"].as_array().unwrap().len(), 2);

        let walk = Leg::Transfer(Transfer::new("B", "E", 120));
        let json = serde_json::to_value(&walk).unwrap();
        assert_eq!(json["type"], "transfer");
        assert_eq!(json["duration"], 120);
    }
}
