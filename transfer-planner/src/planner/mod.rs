//! Earliest-arrival journey planning with the Connection Scan Algorithm.
//!
//! A scan makes one pass over the timetable's hops in arrival order, keeping
//! the earliest arrival at each stop in a [`ScanResults`] label store and
//! propagating walking transfers as labels improve. The resulting
//! predecessor index is turned into journeys by [`JourneyFactory`], which
//! also removes spurious changes between parallel trips.

mod journey_factory;
mod query;
mod scan_results;
mod scanner;

pub use journey_factory::JourneyFactory;
pub use query::{DepartAfterQuery, JourneyFilter};
pub use scan_results::{ConnectionIndex, OriginDepartureTimes, ScanResults};
pub use scanner::ConnectionScanner;

pub(crate) use scanner::{propagate_transfers, relax};
