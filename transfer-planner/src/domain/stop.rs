//! Stop identifier type.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// Opaque identifier of a stop.
///
/// Stop ids come straight from the timetable source. The planner never looks
/// inside them; the only property it relies on is their ordering, which
/// decides how transfer pattern keys are built.
///
/// Backed by `Arc<str>` so cloning into label maps is cheap.
///
/// # Examples
///
/// ```
/// use transfer_planner::domain::StopId;
///
/// let tbw = StopId::new("TBW");
/// assert_eq!(tbw.as_str(), "TBW");
///
/// // Ordering is plain string ordering
/// assert!(StopId::new("NRW") < tbw);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(Arc<str>);

impl StopId {
    /// Creates a stop id from any string-like value.
    pub fn new(id: impl AsRef<str>) -> Self {
        StopId(Arc::from(id.as_ref()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StopId {
    fn from(value: &str) -> Self {
        StopId::new(value)
    }
}

impl From<String> for StopId {
    fn from(value: String) -> Self {
        StopId(Arc::from(value))
    }
}

impl Borrow<str> for StopId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.as_str())
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StopId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
