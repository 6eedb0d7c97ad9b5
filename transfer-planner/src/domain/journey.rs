//! Journey type.
//!
//! A `Journey` is an ordered sequence of legs from origin to destination,
//! with its departure and arrival derived from the rides it contains.

use serde::Serialize;

use super::{DomainError, Leg, StopId, Time};

/// A complete journey from origin to destination.
///
/// Departure is the first ride's scheduled departure, brought forward by any
/// walks before it; arrival is the last ride's scheduled arrival, pushed back
/// by any walks after it. A journey of walks only has no ride to anchor on
/// and reports `0` for both.
///
/// # Invariants
///
/// - At least one leg
/// - Consecutive legs connect (destination of one = origin of next)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Journey {
    origin: StopId,
    destination: StopId,
    departure_time: Time,
    arrival_time: Time,
    legs: Vec<Leg>,
}

impl Journey {
    /// Constructs a journey from legs.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - The list of legs is empty
    /// - Legs don't connect (destination != next origin)
    ///
    /// # Examples
    ///
    /// ```
    /// use transfer_planner::domain::{Journey, Leg, Transfer};
    ///
    /// let journey = Journey::new(vec![
    ///     Leg::Transfer(Transfer::new("A", "B", 60)),
    ///     Leg::Transfer(Transfer::new("B", "C", 60)),
    /// ]).unwrap();
    ///
    /// assert_eq!(journey.origin().as_str(), "A");
    /// assert_eq!(journey.destination().as_str(), "C");
    ///
    /// // Walking only: nothing to take times from
    /// assert!(!journey.has_ride());
    /// assert_eq!(journey.departure_time(), 0);
    ///
    /// assert!(Journey::new(vec![]).is_err());
    /// ```
    pub fn new(legs: Vec<Leg>) -> Result<Self, DomainError> {
        let (Some(first), Some(last)) = (legs.first(), legs.last()) else {
            return Err(DomainError::EmptyJourney);
        };

        for window in legs.windows(2) {
            let prev_dest = window[0].destination();
            let next_origin = window[1].origin();
            if prev_dest != next_origin {
                return Err(DomainError::LegsNotConnected(
                    prev_dest.clone(),
                    next_origin.clone(),
                ));
            }
        }

        Ok(Journey {
            origin: first.origin().clone(),
            destination: last.destination().clone(),
            departure_time: departure_time_of(&legs),
            arrival_time: arrival_time_of(&legs),
            legs,
        })
    }

    /// Returns the origin stop.
    pub fn origin(&self) -> &StopId {
        &self.origin
    }

    /// Returns the destination stop.
    pub fn destination(&self) -> &StopId {
        &self.destination
    }

    /// Returns the departure time from the origin.
    pub fn departure_time(&self) -> Time {
        self.departure_time
    }

    /// Returns the arrival time at the destination.
    pub fn arrival_time(&self) -> Time {
        self.arrival_time
    }

    /// Returns all legs in order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Returns the number of legs, rides and walks alike.
    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    /// Returns the number of rides.
    pub fn ride_count(&self) -> usize {
        self.legs.iter().filter(|l| l.is_timetable()).count()
    }

    /// Returns true if the journey contains at least one ride.
    pub fn has_ride(&self) -> bool {
        self.legs.iter().any(Leg::is_timetable)
    }

    /// Returns the stops where one leg ends and the next begins, in order.
    pub fn interchanges(&self) -> impl Iterator<Item = &StopId> {
        self.legs.iter().skip(1).map(Leg::origin)
    }

    /// Returns the total journey duration in seconds.
    pub fn duration(&self) -> Time {
        self.arrival_time.saturating_sub(self.departure_time)
    }
}

/// First ride's departure minus the walks that precede it.
fn departure_time_of(legs: &[Leg]) -> Time {
    let mut walked = 0;

    for leg in legs {
        match leg {
            Leg::Transfer(transfer) => walked += transfer.duration,
            Leg::Timetable(ride) => return ride.departure_time().saturating_sub(walked),
        }
    }

    0
}

/// Last ride's arrival plus the walks that follow it.
fn arrival_time_of(legs: &[Leg]) -> Time {
    let mut walked = 0;

    for leg in legs.iter().rev() {
        match leg {
            Leg::Transfer(transfer) => walked += transfer.duration,
            Leg::Timetable(ride) => return ride.arrival_time() + walked,
        }
    }

    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Service, StopTime, TimetableLeg, Transfer, Trip};
    use std::sync::Arc;

    fn stop(s: &str) -> StopId {
        StopId::new(s)
    }

    fn ride(from: &str, to: &str, dep: Time, arr: Time) -> Leg {
        let trip = Arc::new(Trip::new(
            format!("{from}{to}"),
            "1",
            Arc::new(Service::every_day(20190101, 20991231)),
            vec![StopTime::new(from, dep, dep), StopTime::new(to, arr, arr)],
        ));

        Leg::Timetable(TimetableLeg::find(&trip, &stop(from), dep, &stop(to)).unwrap())
    }

    fn walk(from: &str, to: &str, duration: Time) -> Leg {
        Leg::Transfer(Transfer::new(from, to, duration))
    }

    #[test]
    fn journey_single_ride() {
        let journey = Journey::new(vec![ride("A", "B", 1000, 1030)]).unwrap();

        assert_eq!(journey.origin(), &stop("A"));
        assert_eq!(journey.destination(), &stop("B"));
        assert_eq!(journey.departure_time(), 1000);
        assert_eq!(journey.arrival_time(), 1030);
        assert_eq!(journey.duration(), 30);
        assert_eq!(journey.leg_count(), 1);
        assert_eq!(journey.ride_count(), 1);
        assert!(journey.has_ride());
        assert_eq!(journey.interchanges().count(), 0);
    }

    #[test]
    fn departure_brought_forward_by_leading_walk() {
        let journey = Journey::new(vec![walk("A", "B", 60), ride("B", "C", 1100, 1130)]).unwrap();

        assert_eq!(journey.origin(), &stop("A"));
        assert_eq!(journey.departure_time(), 1040);
        assert_eq!(journey.arrival_time(), 1130);
    }

    #[test]
    fn arrival_pushed_back_by_trailing_walks() {
        let journey = Journey::new(vec![
            walk("A", "B", 60),
            ride("B", "C", 1100, 1130),
            walk("C", "D", 60),
            walk("D", "E", 30),
        ])
        .unwrap();

        assert_eq!(journey.departure_time(), 1040);
        assert_eq!(journey.arrival_time(), 1220);
        assert_eq!(journey.ride_count(), 1);
        assert_eq!(journey.leg_count(), 4);
    }

    #[test]
    fn times_come_from_first_and_last_ride() {
        let journey = Journey::new(vec![
            ride("A", "B", 1000, 1015),
            walk("B", "C", 5),
            ride("C", "D", 1100, 1115),
        ])
        .unwrap();

        assert_eq!(journey.departure_time(), 1000);
        assert_eq!(journey.arrival_time(), 1115);

        let interchanges: Vec<&str> = journey.interchanges().map(StopId::as_str).collect();
        assert_eq!(interchanges, vec!["B", "C"]);
    }

    #[test]
    fn walking_only_journey_has_zero_times() {
        let journey = Journey::new(vec![walk("A", "B", 60)]).unwrap();

        assert!(!journey.has_ride());
        assert_eq!(journey.departure_time(), 0);
        assert_eq!(journey.arrival_time(), 0);
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(Journey::new(vec![]), Err(DomainError::EmptyJourney));
    }

    #[test]
    fn rejects_disconnected_legs() {
        let result = Journey::new(vec![ride("A", "B", 1000, 1015), ride("C", "D", 1100, 1115)]);

        assert_eq!(
            result,
            Err(DomainError::LegsNotConnected(stop("B"), stop("C")))
        );
    }

    #[test]
    fn serializes_summary_fields() {
        let journey = Journey::new(vec![ride("A", "B", 1000, 1030)]).unwrap();
        let json = serde_json::to_value(&journey).unwrap();

        assert_eq!(json["origin"], "A");
        assert_eq!(json["destination"], "B");
        assert_eq!(json["departure_time"], 1000);
        assert_eq!(json["arrival_time"], 1030);
        assert_eq!(json["legs"].as_array().unwrap().len(), 1);
    }
}
