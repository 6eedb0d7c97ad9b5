//! Earliest-arrival connection scan.
//!
//! One forward pass over the hop list in arrival order. Because a hop can
//! only be boarded at a stop that was reached before it departs, and every
//! hop that could reach that stop arrives earlier, a single pass settles the
//! earliest arrival at every stop.

use tracing::{debug, trace};

use super::scan_results::{ConnectionIndex, OriginDepartureTimes, ScanResults};
use crate::domain::{Connection, ServiceDay, StopId};
use crate::timetable::{Interchange, Timetable, TransfersByOrigin};

/// Earliest-arrival scanner over an immutable timetable.
///
/// The scanner only borrows the timetable; each call to [`scan`] creates
/// and owns its own label store, so one scanner can serve any number of
/// scans.
///
/// [`scan`]: ConnectionScanner::scan
#[derive(Debug, Clone, Copy)]
pub struct ConnectionScanner<'a> {
    connections: &'a [Connection],
    transfers: &'a TransfersByOrigin,
    interchange: &'a Interchange,
}

impl<'a> ConnectionScanner<'a> {
    /// Create a scanner over a whole timetable.
    pub fn new(timetable: &'a Timetable) -> Self {
        Self::with_connections(
            &timetable.connections,
            &timetable.transfers,
            &timetable.interchange,
        )
    }

    /// Create a scanner over an explicit hop list.
    ///
    /// `connections` must be sorted ascending by arrival time.
    pub fn with_connections(
        connections: &'a [Connection],
        transfers: &'a TransfersByOrigin,
        interchange: &'a Interchange,
    ) -> Self {
        Self {
            connections,
            transfers,
            interchange,
        }
    }

    /// Find the edge that achieves the earliest arrival at every stop
    /// reachable from `origins` on `day`.
    ///
    /// Hops whose trip does not run on `day` are skipped. The pass always
    /// covers the whole hop list, so every reachable stop is labelled, not
    /// just the ones a caller is interested in.
    ///
    /// Origins are seeded in stop id order, so when walks from two origins
    /// tie at a stop the smaller origin's walk is kept.
    pub fn scan(&self, origins: &OriginDepartureTimes, day: ServiceDay) -> ConnectionIndex<'a> {
        let mut results = ScanResults::new(self.interchange, origins.clone());

        let mut seeds: Vec<&StopId> = origins.keys().collect();
        seeds.sort_unstable();

        for origin in seeds {
            propagate_transfers(&mut results, self.transfers, origin);
        }

        let mut committed = 0usize;

        for connection in self.connections {
            if !connection.trip.runs_on(day) {
                continue;
            }

            if relax(&mut results, self.transfers, connection) {
                committed += 1;
            }
        }

        debug!(
            origins = origins.len(),
            connections = self.connections.len(),
            committed,
            labelled = results.earliest_arrivals().len(),
            date = day.date_number(),
            "Connection scan complete"
        );

        results.into_connection_index()
    }
}

/// Offer one hop to the label store: if it can be boarded and improves its
/// destination, commit it and walk on from there.
///
/// Returns true if the hop was committed.
pub(crate) fn relax<'a>(
    results: &mut ScanResults<'a>,
    transfers: &'a TransfersByOrigin,
    connection: &'a Connection,
) -> bool {
    if !(results.is_reachable(connection) && results.is_better(connection)) {
        return false;
    }

    results.set_connection(connection);
    propagate_transfers(results, transfers, &connection.destination);

    true
}

/// Walk outward from `from` along every transfer that improves its
/// destination, continuing only from stops whose label just improved.
///
/// Uses an explicit worklist so cyclic transfer graphs terminate without
/// deep recursion: strict improvement means no stop is revisited forever.
pub(crate) fn propagate_transfers<'a>(
    results: &mut ScanResults<'a>,
    transfers: &'a TransfersByOrigin,
    from: &StopId,
) {
    let mut pending: Vec<&StopId> = vec![from];

    while let Some(stop) = pending.pop() {
        let Some(outgoing) = transfers.get(stop) else {
            continue;
        };

        for transfer in outgoing {
            if results.is_transfer_better(transfer) {
                results.set_transfer(transfer);
                trace!(
                    from = %transfer.origin,
                    to = %transfer.destination,
                    duration = transfer.duration,
                    "Transfer improved label"
                );
                pending.push(&transfer.destination);
            }
        }
    }
}
