//! Timetable hops, walking transfers, and the edge type that unites them.

use std::sync::Arc;

use serde::Serialize;

use super::{Duration, StopId, Time, Trip};

/// A scheduled hop: one ridden segment of a trip between a boarding and an
/// alighting stop-time.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Boarding stop
    pub origin: StopId,
    /// Alighting stop
    pub destination: StopId,
    /// Departure from `origin`
    pub departure_time: Time,
    /// Arrival at `destination`
    pub arrival_time: Time,
    /// Trip the hop belongs to
    pub trip: Arc<Trip>,
}

impl Connection {
    /// Creates a hop.
    pub fn new(
        origin: impl Into<StopId>,
        destination: impl Into<StopId>,
        departure_time: Time,
        arrival_time: Time,
        trip: Arc<Trip>,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            departure_time,
            arrival_time,
            trip,
        }
    }

    /// Returns the id of the owning trip.
    pub fn trip_id(&self) -> &str {
        &self.trip.trip_id
    }
}

/// A fixed-duration walk between two distinct stops.
///
/// `start_time` and `end_time` give the time-of-day window the walk is
/// available in. Transfers built from plain minimum-transfer records are
/// open all day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
    /// Stop walked from
    pub origin: StopId,
    /// Stop walked to
    pub destination: StopId,
    /// Walking time
    pub duration: Duration,
    /// Start of the availability window
    pub start_time: Time,
    /// End of the availability window
    pub end_time: Time,
}

impl Transfer {
    /// Creates a transfer available at any time.
    pub fn new(origin: impl Into<StopId>, destination: impl Into<StopId>, duration: Duration) -> Self {
        Self::with_window(origin, destination, duration, 0, Time::MAX)
    }

    /// Creates a transfer available between `start_time` and `end_time`.
    pub fn with_window(
        origin: impl Into<StopId>,
        destination: impl Into<StopId>,
        duration: Duration,
        start_time: Time,
        end_time: Time,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            duration,
            start_time,
            end_time,
        }
    }
}

/// How a stop was reached: by riding a hop or by walking a transfer.
///
/// Edges borrow from the timetable they were scanned over, so predecessor
/// indexes are cheap to build and copy.
#[derive(Debug, Clone, Copy)]
pub enum Edge<'a> {
    /// A timetable hop
    Connection(&'a Connection),
    /// A walking transfer
    Transfer(&'a Transfer),
}

impl<'a> Edge<'a> {
    /// Returns the stop this edge leaves from.
    pub fn origin(&self) -> &'a StopId {
        match *self {
            Edge::Connection(c) => &c.origin,
            Edge::Transfer(t) => &t.origin,
        }
    }

    /// Returns the stop this edge arrives at.
    pub fn destination(&self) -> &'a StopId {
        match *self {
            Edge::Connection(c) => &c.destination,
            Edge::Transfer(t) => &t.destination,
        }
    }

    /// Returns true if this edge is a walk.
    pub fn is_transfer(&self) -> bool {
        matches!(self, Edge::Transfer(_))
    }

    /// Returns the trip id if this edge is a hop.
    pub fn trip_id(&self) -> Option<&'a str> {
        match *self {
            Edge::Connection(c) => Some(c.trip_id()),
            Edge::Transfer(_) => None,
        }
    }

    /// Returns true if going from `self` to `next` (or back) means changing:
    /// either edge is a walk, or the two hops are on different trips.
    ///
    /// The same rule decides interchange time in the scan and leg boundaries
    /// in journey reconstruction.
    pub fn requires_change(&self, next: &Edge<'_>) -> bool {
        match (self, next) {
            (Edge::Connection(a), Edge::Connection(b)) => a.trip_id() != b.trip_id(),
            _ => true,
        }
    }
}

impl PartialEq for Edge<'_> {
    fn eq(&self, other: &Self) -> bool {
        // Edges are equal if they point at the same timetable entry
        match (*self, *other) {
            (Edge::Connection(a), Edge::Connection(b)) => std::ptr::eq(a, b),
            (Edge::Transfer(a), Edge::Transfer(b)) => std::ptr::eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Edge<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Service;

    fn trip(id: &str) -> Arc<Trip> {
        Arc::new(Trip::new(
            id,
            "1",
            Arc::new(Service::every_day(20190101, 20991231)),
            vec![],
        ))
    }

    #[test]
    fn transfer_defaults_to_open_window() {
        let t = Transfer::new("A", "B", 60);

        assert_eq!(t.start_time, 0);
        assert_eq!(t.end_time, Time::MAX);
        assert_eq!(t.duration, 60);
    }

    #[test]
    fn edge_endpoints() {
        let c = Connection::new("A", "B", 1000, 1015, trip("1"));
        let t = Transfer::new("B", "C", 10);

        assert_eq!(Edge::Connection(&c).origin(), &StopId::new("A"));
        assert_eq!(Edge::Connection(&c).destination(), &StopId::new("B"));
        assert_eq!(Edge::Transfer(&t).origin(), &StopId::new("B"));
        assert_eq!(Edge::Transfer(&t).destination(), &StopId::new("C"));
        assert_eq!(Edge::Connection(&c).trip_id(), Some("1"));
        assert_eq!(Edge::Transfer(&t).trip_id(), None);
    }

    #[test]
    fn same_trip_needs_no_change() {
        let a = Connection::new("A", "B", 1000, 1015, trip("1"));
        let b = Connection::new("B", "C", 1020, 1030, trip("1"));

        assert!(!Edge::Connection(&a).requires_change(&Edge::Connection(&b)));
    }

    #[test]
    fn different_trip_needs_change() {
        let a = Connection::new("A", "B", 1000, 1015, trip("1"));
        let b = Connection::new("B", "C", 1020, 1030, trip("2"));

        assert!(Edge::Connection(&a).requires_change(&Edge::Connection(&b)));
    }

    #[test]
    fn transfers_always_need_change() {
        let a = Connection::new("A", "B", 1000, 1015, trip("1"));
        let t = Transfer::new("B", "C", 10);
        let u = Transfer::new("C", "D", 10);

        assert!(Edge::Connection(&a).requires_change(&Edge::Transfer(&t)));
        assert!(Edge::Transfer(&t).requires_change(&Edge::Connection(&a)));
        assert!(Edge::Transfer(&t).requires_change(&Edge::Transfer(&u)));
    }

    #[test]
    fn edge_equality_is_identity() {
        let a = Connection::new("A", "B", 1000, 1015, trip("1"));
        let b = a.clone();

        assert_eq!(Edge::Connection(&a), Edge::Connection(&a));
        assert_ne!(Edge::Connection(&a), Edge::Connection(&b));
    }
}
