//! Rebuild journeys from a predecessor index.
//!
//! Walking the index backwards from a destination gives the chain of hops
//! and walks that achieved its earliest arrival. Consecutive hops on one trip
//! are merged into a single ride, then rides are extended backwards where
//! the same trip could have been boarded earlier in the chain. A single-pass
//! scan in arrival order often alternates between two trips serving the same
//! stops; extension removes those spurious changes.

use tracing::warn;

use super::scan_results::ConnectionIndex;
use crate::domain::{Edge, Journey, Leg, StopId, TimetableLeg};

/// Turns predecessor indexes into journeys.
#[derive(Debug, Clone, Copy, Default)]
pub struct JourneyFactory;

impl JourneyFactory {
    /// Create a journey factory.
    pub fn new() -> Self {
        Self
    }

    /// Rebuild a journey to each destination, in order.
    ///
    /// Destinations with no chain in the index are omitted.
    pub fn journeys(&self, index: &ConnectionIndex<'_>, destinations: &[StopId]) -> Vec<Journey> {
        destinations
            .iter()
            .filter_map(|destination| self.journey(index, destination))
            .collect()
    }

    /// Rebuild the journey to one destination, if the index reaches it.
    pub fn journey(&self, index: &ConnectionIndex<'_>, destination: &StopId) -> Option<Journey> {
        let legs = extract_legs(index, destination)?;

        match Journey::new(compact_legs(&legs)) {
            Ok(journey) => Some(journey),
            Err(e) => {
                warn!(destination = %destination, error = %e, "Discarding malformed journey");
                None
            }
        }
    }
}

/// Walk the index back from `destination`, splitting the chain into legs
/// wherever a change is needed.
///
/// Returns `None` if the destination has no predecessor, or if a ride cannot
/// be matched against its trip's stop-times.
fn extract_legs(index: &ConnectionIndex<'_>, destination: &StopId) -> Option<Vec<Leg>> {
    let mut runs: Vec<Vec<Edge<'_>>> = Vec::new();
    let mut run: Vec<Edge<'_>> = Vec::new();
    let mut previous: Option<Edge<'_>> = None;
    let mut stop = destination;
    let mut steps = 0usize;

    while let Some(&edge) = index.get(stop) {
        // Strict improvement rules out cycles; guard against a corrupt index
        steps += 1;
        if steps > index.len() {
            warn!(destination = %destination, "Predecessor chain does not terminate");
            return None;
        }

        if previous.is_some_and(|p| p.requires_change(&edge)) {
            runs.push(std::mem::take(&mut run));
        }

        run.push(edge);
        previous = Some(edge);
        stop = edge.origin();
    }

    if run.is_empty() {
        return None;
    }
    runs.push(run);

    // Runs were collected destination-first, and each run back to front
    runs.iter_mut().rev().map(|run| to_leg(run)).collect()
}

/// Turn one run of same-leg edges (in reverse order) into a leg.
fn to_leg(run: &mut [Edge<'_>]) -> Option<Leg> {
    run.reverse();

    match *run.first()? {
        Edge::Transfer(transfer) => Some(Leg::Transfer(transfer.clone())),
        Edge::Connection(first) => {
            let destination = run.last()?.destination();

            TimetableLeg::find(&first.trip, &first.origin, first.departure_time, destination)
                .map(Leg::Timetable)
        }
    }
}

/// Extend each ride backwards through the legs before it while its trip
/// still serves the longer ride.
///
/// Works from the last leg to the first. For a ride at position `i`, every
/// earlier leg `j` is tried in turn: the departure bound is the departure of
/// ride `j`, or the running bound less the walking time when `j` is a walk.
/// Each success absorbs legs `j..i`. Endpoints are unchanged and the leg
/// count never grows.
fn compact_legs(legs: &[Leg]) -> Vec<Leg> {
    let mut compacted = Vec::with_capacity(legs.len());
    let mut i = legs.len();

    while i > 0 {
        i -= 1;

        let mut ride = match &legs[i] {
            Leg::Transfer(transfer) => {
                compacted.push(Leg::Transfer(transfer.clone()));
                continue;
            }
            Leg::Timetable(ride) => ride.clone(),
        };

        let mut departure_bound = ride.departure_time();
        let mut absorbed_from = i;

        for j in (0..i).rev() {
            departure_bound = match &legs[j] {
                Leg::Transfer(transfer) => departure_bound.saturating_sub(transfer.duration),
                Leg::Timetable(earlier) => earlier.departure_time(),
            };

            let extended = TimetableLeg::find(
                ride.trip(),
                legs[j].origin(),
                departure_bound,
                ride.destination(),
            );

            if let Some(extended) = extended {
                ride = extended;
                absorbed_from = j;
            }
        }

        i = absorbed_from;
        compacted.push(Leg::Timetable(ride));
    }

    compacted.reverse();
    compacted
}
