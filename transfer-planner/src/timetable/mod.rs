//! The timetable bundle the scanners run over.
//!
//! A `Timetable` holds every hop sorted by arrival time, the walking
//! transfers leaving each stop, and the per-stop interchange time. It is
//! immutable once built and is shared between scans (and between pattern
//! workers behind an `Arc`).
//!
//! Parsing source files is left to the caller; `TimetableBuilder` takes
//! already-parsed trips and transfer records and does the structural work:
//! hop generation, routing self-transfers to the interchange map, and the
//! arrival-time sort the scanner relies on.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{Connection, Duration, ServiceDay, StopId, StopTime, Transfer, Trip};

/// Walking transfers indexed by the stop they leave from.
pub type TransfersByOrigin = HashMap<StopId, Vec<Transfer>>;

/// Minimum time needed to change vehicles at a stop.
pub type Interchange = HashMap<StopId, Duration>;

/// Immutable timetable: hops, transfers and interchange times.
///
/// # Invariants
///
/// - `connections` is sorted ascending by arrival time
/// - Every stop a hop touches has an entry in `transfers` (possibly empty)
#[derive(Debug, Clone, Default)]
pub struct Timetable {
    /// Every hop, sorted by arrival time
    pub connections: Vec<Connection>,
    /// Walking transfers by origin stop
    pub transfers: TransfersByOrigin,
    /// Interchange time by stop
    pub interchange: Interchange,
}

impl Timetable {
    /// Generate the hops of one trip.
    ///
    /// A hop runs from a call that allows pickup to a later call that allows
    /// dropoff. Calls allowing both close every open boarding point and
    /// become the only one, since riders already aboard continue from there
    /// on the same trip. A pickup-only call opens an extra boarding point
    /// alongside the earlier ones. A set-down-only call ends hops but boards
    /// nobody, and calls allowing neither are passed through.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use transfer_planner::domain::{Service, StopTime, Trip};
    /// use transfer_planner::timetable::Timetable;
    ///
    /// let trip = Arc::new(Trip::new("T1", "S1", Arc::new(Service::every_day(20190101, 20191231)), vec![
    ///     StopTime::new("A", 1000, 1000),
    ///     StopTime::new("B", 1010, 1012),
    ///     StopTime::new("C", 1020, 1020),
    /// ]));
    ///
    /// let hops = Timetable::connections_for_trip(&trip);
    /// assert_eq!(hops.len(), 2);
    /// assert_eq!(hops[1].origin.as_str(), "B");
    /// assert_eq!(hops[1].departure_time, 1012);
    /// ```
    pub fn connections_for_trip(trip: &Arc<Trip>) -> Vec<Connection> {
        let mut boarding: Vec<&StopTime> = Vec::new();
        let mut connections = Vec::new();

        for stop_time in &trip.stop_times {
            if stop_time.drop_off {
                for origin in &boarding {
                    connections.push(Connection::new(
                        origin.stop.clone(),
                        stop_time.stop.clone(),
                        origin.departure_time,
                        stop_time.arrival_time,
                        trip.clone(),
                    ));
                }
            }

            match (stop_time.pick_up, stop_time.drop_off) {
                (true, true) => {
                    boarding.clear();
                    boarding.push(stop_time);
                }
                (true, false) => boarding.push(stop_time),
                (false, _) => {}
            }
        }

        connections
    }

    /// Returns clones of the hops whose trip runs on `day`, still sorted by
    /// arrival time.
    ///
    /// Clones are cheap: stop ids and trips are reference counted.
    pub fn connections_running_on(&self, day: ServiceDay) -> Vec<Connection> {
        self.connections
            .iter()
            .filter(|c| c.trip.runs_on(day))
            .cloned()
            .collect()
    }

    /// Returns the transfers leaving `stop`.
    pub fn transfers_from(&self, stop: &StopId) -> &[Transfer] {
        self.transfers.get(stop).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the interchange time at `stop`, zero if none is recorded.
    pub fn interchange_at(&self, stop: &StopId) -> Duration {
        self.interchange.get(stop).copied().unwrap_or(0)
    }

    /// Returns every stop with a transfer list: hop endpoints and transfer
    /// origins, in no particular order.
    pub fn stops(&self) -> impl Iterator<Item = &StopId> {
        self.transfers.keys()
    }
}

/// Builder that assembles a `Timetable` from parsed records.
#[derive(Debug, Default)]
pub struct TimetableBuilder {
    trips: Vec<Arc<Trip>>,
    transfers: TransfersByOrigin,
    interchange: Interchange,
}

impl TimetableBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trip; its hops are generated at build time.
    pub fn trip(mut self, trip: Trip) -> Self {
        self.trips.push(Arc::new(trip));
        self
    }

    /// Add a walking transfer.
    ///
    /// A transfer from a stop to itself is a minimum change time and is
    /// recorded as that stop's interchange instead.
    pub fn transfer(mut self, transfer: Transfer) -> Self {
        if transfer.origin == transfer.destination {
            self.interchange.insert(transfer.origin, transfer.duration);
        } else {
            self.transfers
                .entry(transfer.origin.clone())
                .or_default()
                .push(transfer);
        }
        self
    }

    /// Set the interchange time at a stop.
    pub fn interchange(mut self, stop: impl Into<StopId>, duration: Duration) -> Self {
        self.interchange.insert(stop.into(), duration);
        self
    }

    /// Generate hops, sort them by arrival and build the timetable.
    pub fn build(self) -> Timetable {
        let mut transfers = self.transfers;
        let mut connections = Vec::new();

        for trip in &self.trips {
            for connection in Timetable::connections_for_trip(trip) {
                transfers.entry(connection.origin.clone()).or_default();
                transfers.entry(connection.destination.clone()).or_default();
                connections.push(connection);
            }
        }

        // Stable: equal arrivals keep trip insertion order
        connections.sort_by_key(|c| c.arrival_time);

        debug!(
            trips = self.trips.len(),
            connections = connections.len(),
            stops = transfers.len(),
            "Timetable built"
        );

        Timetable {
            connections,
            transfers,
            interchange: self.interchange,
        }
    }
}
