//! Journey planning over a static timetable with the Connection Scan
//! Algorithm.
//!
//! - [`domain`]: stops, trips, hops, walking transfers, legs and journeys.
//! - [`timetable`]: the sorted hop list and transfer tables a scan runs over.
//! - [`planner`]: earliest-arrival scans and journey reconstruction.
//! - [`patterns`]: whole-day profile scans producing transfer patterns.
//!
//! The library logs through `tracing` and never installs a subscriber.

pub mod domain;
pub mod patterns;
pub mod planner;
pub mod timetable;
