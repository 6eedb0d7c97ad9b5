//! Stop-time types for trips.
//!
//! A `StopTime` is one scheduled call of a trip at a stop. A `StopTimeIndex`
//! is an unambiguous position within a trip's stop-time sequence.

use serde::Serialize;

use super::{StopId, Time};

/// Index of a stop-time within a trip's stop-time sequence.
///
/// Used instead of `StopId` to disambiguate trips that call at the same
/// stop more than once (loops, out-and-back workings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopTimeIndex(pub usize);

/// A scheduled call of a trip at a stop.
///
/// `pick_up` and `drop_off` record whether passengers may board and alight
/// here; calls that only allow one of them still appear in the sequence so
/// that ridden legs can list every stop passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopTime {
    /// Stop called at
    pub stop: StopId,
    /// Scheduled arrival time
    pub arrival_time: Time,
    /// Scheduled departure time
    pub departure_time: Time,
    /// Whether boarding is allowed
    pub pick_up: bool,
    /// Whether alighting is allowed
    pub drop_off: bool,
}

impl StopTime {
    /// Creates a call where boarding and alighting are both allowed.
    pub fn new(stop: impl Into<StopId>, arrival_time: Time, departure_time: Time) -> Self {
        Self {
            stop: stop.into(),
            arrival_time,
            departure_time,
            pick_up: true,
            drop_off: true,
        }
    }

    /// Returns true if a passenger at this stop at `time` can board here.
    pub fn can_board(&self, stop: &StopId, time: Time) -> bool {
        self.pick_up && &self.stop == stop && self.departure_time >= time
    }

    /// Returns true if a passenger can alight here at `stop`.
    pub fn can_alight(&self, stop: &StopId) -> bool {
        self.drop_off && &self.stop == stop
    }
}
