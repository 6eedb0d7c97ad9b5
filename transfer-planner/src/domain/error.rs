//! Domain error types.
//!
//! These errors represent construction failures of validated domain types.
//! They never come out of a scan: an unreachable stop is an absent result,
//! not an error.

use super::StopId;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Stop-time index is out of bounds for the trip
    #[error("invalid stop-time index: out of bounds")]
    InvalidStopTimeIndex,

    /// Invalid leg construction (e.g., alight before board)
    #[error("invalid leg: {0}")]
    InvalidLeg(&'static str),

    /// Consecutive legs don't meet at the same stop
    #[error("legs do not connect: {0} is followed by {1}")]
    LegsNotConnected(StopId, StopId),

    /// Journey has no legs
    #[error("journey must have at least one leg")]
    EmptyJourney,
}
