//! Transfer pattern rows and where they are kept.
//!
//! A transfer pattern is the sequence of stops where a journey changes,
//! keyed by its unordered pair of endpoints. Storing the same row twice is a
//! no-op, so writers can retry freely.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, params};
use serde::Serialize;
use tracing::{error, warn};

use super::profile::PatternTree;
use crate::domain::{Journey, StopId};

/// Errors from a pattern store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The SQLite backend failed
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Another writer panicked while holding the store
    #[error("store lock poisoned")]
    Poisoned,

    /// The store cannot accept writes right now
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// One `(pair key, pattern)` row.
///
/// The pair key is both endpoint ids concatenated, smaller id first. The
/// pattern lists the change stops comma-separated, in the direction from the
/// smaller id to the larger, so a journey and its reverse share a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TransferPattern {
    /// Endpoint pair key
    pub journey: String,
    /// Comma-separated change stops
    pub pattern: String,
}

impl TransferPattern {
    /// Create a row directly.
    pub fn new(journey: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            journey: journey.into(),
            pattern: pattern.into(),
        }
    }

    /// Derive the row for a journey.
    ///
    /// # Examples
    ///
    /// ```
    /// use transfer_planner::domain::{Journey, Leg, Transfer};
    /// use transfer_planner::patterns::TransferPattern;
    ///
    /// let journey = Journey::new(vec![
    ///     Leg::Transfer(Transfer::new("ZZZ", "MMM", 60)),
    ///     Leg::Transfer(Transfer::new("MMM", "NNN", 60)),
    ///     Leg::Transfer(Transfer::new("NNN", "AAA", 60)),
    /// ]).unwrap();
    ///
    /// let row = TransferPattern::from_journey(&journey);
    /// assert_eq!(row.journey, "AAAZZZ");
    /// assert_eq!(row.pattern, "NNN,MMM");
    /// ```
    pub fn from_journey(journey: &Journey) -> Self {
        let origin = journey.origin();
        let destination = journey.destination();
        let mut changes: Vec<&str> = journey.interchanges().map(StopId::as_str).collect();

        let key = if origin > destination {
            changes.reverse();
            format!("{destination}{origin}")
        } else {
            format!("{origin}{destination}")
        };

        Self::new(key, changes.join(","))
    }

    /// Derive the rows for every journey in a tree, without duplicates and
    /// in sorted order.
    pub fn from_tree(tree: &PatternTree) -> Vec<Self> {
        tree.values()
            .flat_map(|journeys| journeys.values())
            .map(Self::from_journey)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Destination for transfer pattern rows.
pub trait PatternStore: Send + Sync {
    /// Prepare the store, creating tables as needed. Safe to call twice.
    fn init(&self) -> Result<(), StoreError>;

    /// Store a batch of rows, ignoring ones already present.
    ///
    /// Returns the number of rows that were new.
    fn store(&self, patterns: &[TransferPattern]) -> Result<usize, StoreError>;
}

/// SQLite-backed pattern store.
///
/// The connection sits behind a mutex so one store can be shared by every
/// worker thread; each batch is written in its own transaction.
#[derive(Debug)]
pub struct SqlitePatternStore {
    conn: Mutex<Connection>,
}

impl SqlitePatternStore {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self {
            conn: Mutex::new(Connection::open(path)?),
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    /// Read back every stored row, sorted.
    pub fn patterns(&self) -> Result<Vec<TransferPattern>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let mut stmt =
            conn.prepare("SELECT journey, pattern FROM transfer_patterns ORDER BY journey, pattern")?;

        let rows = stmt.query_map([], |row| {
            Ok(TransferPattern {
                journey: row.get(0)?,
                pattern: row.get(1)?,
            })
        })?;

        Ok(rows.collect::<Result<_, _>>()?)
    }
}

impl PatternStore for SqlitePatternStore {
    fn init(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS transfer_patterns (
                journey TEXT NOT NULL,
                pattern TEXT NOT NULL,
                PRIMARY KEY (journey, pattern)
            )",
            [],
        )?;

        Ok(())
    }

    fn store(&self, patterns: &[TransferPattern]) -> Result<usize, StoreError> {
        if patterns.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let tx = conn.transaction()?;
        let mut inserted = 0;

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO transfer_patterns (journey, pattern) VALUES (?1, ?2)",
            )?;

            for row in patterns {
                inserted += stmt.execute(params![row.journey, row.pattern])?;
            }
        }

        tx.commit()?;

        Ok(inserted)
    }
}

/// In-memory pattern store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryPatternStore {
    rows: Mutex<BTreeSet<TransferPattern>>,
}

impl MemoryPatternStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every stored row, sorted.
    pub fn patterns(&self) -> Vec<TransferPattern> {
        match self.rows.lock() {
            Ok(rows) => rows.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }
}

impl PatternStore for MemoryPatternStore {
    fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn store(&self, patterns: &[TransferPattern]) -> Result<usize, StoreError> {
        let mut rows = self.rows.lock().map_err(|_| StoreError::Poisoned)?;

        Ok(patterns
            .iter()
            .filter(|row| rows.insert((*row).clone()))
            .count())
    }
}

/// What became of a batch handed to [`store_with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Written; carries the number of new rows
    Stored(usize),
    /// Every attempt failed; carries the size of the lost batch
    Dropped(usize),
}

/// Store a batch, retrying up to `attempts` times in total.
///
/// A batch that still fails is logged and dropped: losing one origin's
/// patterns must not stop the rest of the job.
pub fn store_with_retry<S>(store: &S, patterns: &[TransferPattern], attempts: usize) -> WriteOutcome
where
    S: PatternStore + ?Sized,
{
    let attempts = attempts.max(1);

    for attempt in 1..=attempts {
        match store.store(patterns) {
            Ok(inserted) => return WriteOutcome::Stored(inserted),
            Err(e) if attempt < attempts => {
                warn!(attempt, attempts, error = %e, "Pattern write failed, retrying");
            }
            Err(e) => {
                error!(
                    attempts,
                    rows = patterns.len(),
                    error = %e,
                    "Pattern write failed, dropping batch"
                );
            }
        }
    }

    WriteOutcome::Dropped(patterns.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Leg, Service, StopTime, Time, TimetableLeg, Transfer, Trip};
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn walk(from: &str, to: &str) -> Leg {
        Leg::Transfer(Transfer::new(from, to, 60))
    }

    fn ride(from: &str, to: &str, dep: Time) -> Leg {
        let trip = Arc::new(Trip::new(
            format!("{from}{to}"),
            "1",
            Arc::new(Service::every_day(20190101, 20991231)),
            vec![StopTime::new(from, dep, dep), StopTime::new(to, dep + 60, dep + 60)],
        ));

        Leg::Timetable(TimetableLeg::find(&trip, &StopId::new(from), dep, &StopId::new(to)).unwrap())
    }

    fn journey(legs: Vec<Leg>) -> Journey {
        Journey::new(legs).unwrap()
    }

    #[test]
    fn pattern_of_a_direct_journey_is_empty() {
        let row = TransferPattern::from_journey(&journey(vec![ride("AAA", "BBB", 1000)]));

        assert_eq!(row, TransferPattern::new("AAABBB", ""));
    }

    #[test]
    fn pattern_lists_change_stops() {
        let row = TransferPattern::from_journey(&journey(vec![
            ride("AAA", "BBB", 1000),
            walk("BBB", "CCC"),
            ride("CCC", "DDD", 1200),
        ]));

        assert_eq!(row, TransferPattern::new("AAADDD", "BBB,CCC"));
    }

    #[test]
    fn reverse_journeys_share_a_row() {
        let outbound = TransferPattern::from_journey(&journey(vec![
            ride("AAA", "BBB", 1000),
            ride("BBB", "CCC", 1100),
            ride("CCC", "DDD", 1200),
        ]));
        let inbound = TransferPattern::from_journey(&journey(vec![
            ride("DDD", "CCC", 1000),
            ride("CCC", "BBB", 1100),
            ride("BBB", "AAA", 1200),
        ]));

        assert_eq!(outbound, TransferPattern::new("AAADDD", "BBB,CCC"));
        assert_eq!(outbound, inbound);
    }

    #[test]
    fn tree_rows_are_deduplicated() {
        let direct = journey(vec![ride("AAA", "BBB", 1000)]);
        let later = journey(vec![ride("AAA", "BBB", 1100)]);
        let changing = journey(vec![ride("AAA", "CCC", 1000), ride("CCC", "BBB", 1100)]);

        let tree: PatternTree = HashMap::from([(
            StopId::new("BBB"),
            BTreeMap::from([(0, direct), (1001, later), (1101, changing)]),
        )]);

        let rows = TransferPattern::from_tree(&tree);

        assert_eq!(
            rows,
            vec![
                TransferPattern::new("AAABBB", ""),
                TransferPattern::new("AAABBB", "CCC"),
            ]
        );
    }

    #[test]
    fn sqlite_store_ignores_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqlitePatternStore::open(dir.path().join("patterns.db")).unwrap();
        store.init().unwrap();
        store.init().unwrap();

        let rows = vec![
            TransferPattern::new("AAABBB", ""),
            TransferPattern::new("AAACCC", "BBB"),
        ];

        assert_eq!(store.store(&rows).unwrap(), 2);
        assert_eq!(store.store(&rows).unwrap(), 0);
        assert_eq!(
            store.store(&[TransferPattern::new("AAACCC", "DDD")]).unwrap(),
            1
        );

        assert_eq!(
            store.patterns().unwrap(),
            vec![
                TransferPattern::new("AAABBB", ""),
                TransferPattern::new("AAACCC", "BBB"),
                TransferPattern::new("AAACCC", "DDD"),
            ]
        );
    }

    #[test]
    fn sqlite_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patterns.db");

        {
            let store = SqlitePatternStore::open(&path).unwrap();
            store.init().unwrap();
            store.store(&[TransferPattern::new("AAABBB", "")]).unwrap();
        }

        let store = SqlitePatternStore::open(&path).unwrap();
        store.init().unwrap();
        assert_eq!(store.patterns().unwrap().len(), 1);
    }

    #[test]
    fn sqlite_store_without_init_fails() {
        let store = SqlitePatternStore::open_in_memory().unwrap();

        let result = store.store(&[TransferPattern::new("AAABBB", "")]);

        assert!(matches!(result, Err(StoreError::Database(_))));
    }

    #[test]
    fn memory_store_ignores_duplicates() {
        let store = MemoryPatternStore::new();
        let rows = vec![TransferPattern::new("AAABBB", ""), TransferPattern::new("AAABBB", "")];

        assert_eq!(store.store(&rows).unwrap(), 1);
        assert_eq!(store.patterns(), vec![TransferPattern::new("AAABBB", "")]);
    }

    /// Fails a fixed number of times, then delegates.
    struct FlakyStore {
        failures: AtomicUsize,
        inner: MemoryPatternStore,
    }

    impl FlakyStore {
        fn new(failures: usize) -> Self {
            Self {
                failures: AtomicUsize::new(failures),
                inner: MemoryPatternStore::new(),
            }
        }
    }

    impl PatternStore for FlakyStore {
        fn init(&self) -> Result<(), StoreError> {
            Ok(())
        }

        fn store(&self, patterns: &[TransferPattern]) -> Result<usize, StoreError> {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(StoreError::Unavailable("flaky".into()));
            }
            self.inner.store(patterns)
        }
    }

    #[test]
    fn retry_recovers_from_transient_failures() {
        let store = FlakyStore::new(2);
        let rows = vec![TransferPattern::new("AAABBB", "")];

        assert_eq!(store_with_retry(&store, &rows, 3), WriteOutcome::Stored(1));
        assert_eq!(store.inner.patterns().len(), 1);
    }

    #[test]
    fn retry_drops_batch_after_last_attempt() {
        let store = FlakyStore::new(5);
        let rows = vec![TransferPattern::new("AAABBB", ""), TransferPattern::new("AAACCC", "")];

        assert_eq!(store_with_retry(&store, &rows, 3), WriteOutcome::Dropped(2));
        assert!(store.inner.patterns().is_empty());
        assert_eq!(store.failures.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let store = MemoryPatternStore::new();

        assert_eq!(
            store_with_retry(&store, &[TransferPattern::new("AAABBB", "")], 0),
            WriteOutcome::Stored(1)
        );
    }

    #[test]
    fn rows_serialize_as_pairs() {
        let json = serde_json::to_value(TransferPattern::new("AAABBB", "CCC")).unwrap();

        assert_eq!(json, serde_json::json!({ "journey": "AAABBB", "pattern": "CCC" }));
    }
}
