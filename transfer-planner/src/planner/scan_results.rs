//! Per-scan label store.
//!
//! Holds the earliest known arrival at each stop and the edge that achieved
//! it. A store is created for one scan (or one profile round), mutated as the
//! scan commits improvements, read once to rebuild journeys, then dropped.

use std::collections::HashMap;

use crate::domain::{Connection, Edge, StopId, Time, Transfer};
use crate::timetable::Interchange;

/// The edge that achieved the earliest arrival at each stop.
///
/// Origins have no entry unless something reached them earlier than their
/// seed time.
pub type ConnectionIndex<'a> = HashMap<StopId, Edge<'a>>;

/// Departure time at each origin stop.
pub type OriginDepartureTimes = HashMap<StopId, Time>;

/// Mutable earliest-arrival labels for one scan.
///
/// All checks treat an unlabelled stop as "not reachable" or "not better";
/// an unknown stop is a normal state, never an error.
#[derive(Debug)]
pub struct ScanResults<'a> {
    interchange: &'a Interchange,
    earliest_arrivals: HashMap<StopId, Time>,
    connection_index: ConnectionIndex<'a>,
}

impl<'a> ScanResults<'a> {
    /// Create a store seeded with the departure time at each origin.
    pub fn new(interchange: &'a Interchange, origins: OriginDepartureTimes) -> Self {
        Self {
            interchange,
            earliest_arrivals: origins,
            connection_index: HashMap::new(),
        }
    }

    /// Returns true if the hop can be boarded given the current labels.
    ///
    /// Boarding needs the label at the hop's origin plus any interchange time
    /// to be no later than the hop's departure. Interchange is only charged
    /// when the stop was reached by a walk or by a different trip.
    pub fn is_reachable(&self, connection: &Connection) -> bool {
        let Some(&arrival) = self.earliest_arrivals.get(&connection.origin) else {
            return false;
        };

        arrival.saturating_add(self.required_interchange(connection)) <= connection.departure_time
    }

    fn required_interchange(&self, connection: &Connection) -> Time {
        match self.connection_index.get(&connection.origin) {
            None => 0,
            Some(Edge::Connection(previous)) if previous.trip_id() == connection.trip_id() => 0,
            Some(_) => self.interchange_at(&connection.origin),
        }
    }

    fn interchange_at(&self, stop: &StopId) -> Time {
        self.interchange.get(stop).copied().unwrap_or(0)
    }

    /// Returns true if the hop arrives strictly earlier than the current label
    /// at its destination (or the destination is unlabelled).
    pub fn is_better(&self, connection: &Connection) -> bool {
        self.improves(&connection.destination, connection.arrival_time)
    }

    /// Record the hop as the best way to reach its destination.
    ///
    /// Returns true if the destination had no predecessor before.
    pub fn set_connection(&mut self, connection: &'a Connection) -> bool {
        self.record(
            &connection.destination,
            connection.arrival_time,
            Edge::Connection(connection),
        )
    }

    /// Returns true if walking the transfer reaches its destination strictly
    /// earlier than the current label there.
    ///
    /// Always false when the transfer's origin is unlabelled.
    pub fn is_transfer_better(&self, transfer: &Transfer) -> bool {
        self.transfer_arrival_time(transfer)
            .is_some_and(|arrival| self.improves(&transfer.destination, arrival))
    }

    /// Record the transfer as the best way to reach its destination.
    ///
    /// Returns true if the destination had no predecessor before. A transfer
    /// from an unlabelled stop has no arrival time and is not recorded.
    pub fn set_transfer(&mut self, transfer: &'a Transfer) -> bool {
        let Some(arrival) = self.transfer_arrival_time(transfer) else {
            return false;
        };

        self.record(&transfer.destination, arrival, Edge::Transfer(transfer))
    }

    /// Label at the origin plus walking time plus the origin's interchange.
    fn transfer_arrival_time(&self, transfer: &Transfer) -> Option<Time> {
        let departure = *self.earliest_arrivals.get(&transfer.origin)?;

        Some(
            departure
                .saturating_add(transfer.duration)
                .saturating_add(self.interchange_at(&transfer.origin)),
        )
    }

    fn improves(&self, stop: &StopId, arrival: Time) -> bool {
        self.earliest_arrivals
            .get(stop)
            .is_none_or(|&current| current > arrival)
    }

    fn record(&mut self, stop: &StopId, arrival: Time, edge: Edge<'a>) -> bool {
        self.earliest_arrivals.insert(stop.clone(), arrival);
        self.connection_index.insert(stop.clone(), edge).is_none()
    }

    /// Returns the earliest known arrival at `stop`.
    pub fn earliest_arrival(&self, stop: &StopId) -> Option<Time> {
        self.earliest_arrivals.get(stop).copied()
    }

    /// Returns every labelled stop with its earliest arrival, origins included.
    pub fn earliest_arrivals(&self) -> &HashMap<StopId, Time> {
        &self.earliest_arrivals
    }

    /// Returns the predecessor index built so far.
    pub fn connection_index(&self) -> &ConnectionIndex<'a> {
        &self.connection_index
    }

    /// Consume the store, keeping only the predecessor index.
    pub fn into_connection_index(self) -> ConnectionIndex<'a> {
        self.connection_index
    }

    /// Returns true if every destination is already labelled no later than
    /// `departure_time`.
    pub fn is_finished(&self, destinations: &[StopId], departure_time: Time) -> bool {
        destinations.iter().all(|d| {
            self.earliest_arrivals
                .get(d)
                .is_some_and(|&arrival| arrival <= departure_time)
        })
    }
}
