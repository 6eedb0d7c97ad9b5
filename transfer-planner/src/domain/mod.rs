//! Domain types for the transfer pattern planner.
//!
//! This module contains the timetable model the scanners work over: stops,
//! times, calendars, trips and their stop-times, hops and walking transfers,
//! plus the legs and journeys rebuilt from a scan. Types that carry
//! invariants enforce them at construction time.

mod connection;
mod error;
mod journey;
mod leg;
mod service;
mod stop;
mod stop_time;
mod time;
mod trip;

pub use connection::{Connection, Edge, Transfer};
pub use error::DomainError;
pub use journey::Journey;
pub use leg::{Leg, TimetableLeg};
pub use service::{ALL_DAYS, Service, Weekdays};
pub use stop::StopId;
pub use stop_time::{StopTime, StopTimeIndex};
pub use time::{Duration, ServiceDay, Time, TimeError, format_time, parse_time};
pub use trip::Trip;
