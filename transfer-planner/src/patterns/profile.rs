//! Profile scan: every distinct earliest-arrival journey from one origin
//! across a whole service day.
//!
//! Rather than scanning once per departure second, each round scans from a
//! departure frontier, records the journeys it finds, and moves the frontier
//! to one second after the earliest of their departures. The next round
//! therefore finds the next-departing journeys, and only hops that still
//! depart after the frontier are kept for it.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::domain::{Connection, Journey, StopId, Time};
use crate::planner::{JourneyFactory, ScanResults, propagate_transfers, relax};
use crate::timetable::{Interchange, TransfersByOrigin};

/// Journeys from one origin, by destination then by the departure frontier
/// of the round that found them.
pub type PatternTree = HashMap<StopId, BTreeMap<Time, Journey>>;

/// Repeated connection scans over one day's hops.
///
/// The hop list is expected to be pre-filtered to the service day; no
/// calendar check is made here.
#[derive(Debug, Clone, Copy)]
pub struct TransferPatternScanner<'a> {
    connections: &'a [Connection],
    transfers: &'a TransfersByOrigin,
    interchange: &'a Interchange,
    factory: JourneyFactory,
}

impl<'a> TransferPatternScanner<'a> {
    /// Create a scanner over the hops running on one day, sorted by arrival.
    pub fn new(
        connections: &'a [Connection],
        transfers: &'a TransfersByOrigin,
        interchange: &'a Interchange,
    ) -> Self {
        Self {
            connections,
            transfers,
            interchange,
            factory: JourneyFactory::new(),
        }
    }

    /// Build the tree of journeys from `origin` to every stop reachable by
    /// at least one ride.
    ///
    /// Destinations only reachable on foot are left out. A destination may
    /// hold the same journey under several frontiers when it remained the
    /// best option over several rounds.
    pub fn shortest_path_tree(&self, origin: &StopId) -> PatternTree {
        let mut tree = PatternTree::new();
        let mut working: Vec<&'a Connection> = self.connections.iter().collect();
        let mut frontier: Time = 0;
        let mut rounds = 0usize;

        while !working.is_empty() {
            rounds += 1;

            let mut results =
                ScanResults::new(self.interchange, HashMap::from([(origin.clone(), frontier)]));
            working = self.scan_round(&working, &mut results, origin, frontier);

            let mut next_frontier: Option<Time> = None;

            for destination in results.earliest_arrivals().keys() {
                let Some(journey) = self.factory.journey(results.connection_index(), destination)
                else {
                    continue;
                };

                if !journey.has_ride() {
                    continue;
                }

                let candidate = journey.departure_time().saturating_add(1);
                next_frontier = Some(next_frontier.map_or(candidate, |n| n.min(candidate)));

                tree.entry(destination.clone())
                    .or_default()
                    .insert(frontier, journey);
            }

            trace!(
                origin = %origin,
                frontier,
                remaining = working.len(),
                "Profile round complete"
            );

            match next_frontier {
                // Journeys never depart before the frontier they were found from
                Some(next) => frontier = next.max(frontier.saturating_add(1)),
                // Nothing departs after this frontier with a ride, so every
                // later round would find nothing and drain the working list
                None => break,
            }
        }

        debug!(
            origin = %origin,
            rounds,
            destinations = tree.len(),
            journeys = tree.values().map(BTreeMap::len).sum::<usize>(),
            "Transfer pattern tree built"
        );

        tree
    }

    /// One pass over the working list from the current frontier.
    ///
    /// Every hop is offered to the label store; those departing after the
    /// frontier are returned as the next round's working list.
    fn scan_round(
        &self,
        working: &[&'a Connection],
        results: &mut ScanResults<'a>,
        origin: &StopId,
        frontier: Time,
    ) -> Vec<&'a Connection> {
        propagate_transfers(results, self.transfers, origin);

        let mut retained = Vec::with_capacity(working.len());

        for &connection in working {
            if connection.departure_time > frontier {
                retained.push(connection);
            }

            relax(results, self.transfers, connection);
        }

        retained
    }
}
