//! Configuration for transfer pattern generation.

/// Environment variable holding the worker thread count.
pub const WORKERS_VAR: &str = "TP_WORKERS";

/// Environment variable holding the write attempt limit.
pub const MAX_WRITE_ATTEMPTS_VAR: &str = "TP_MAX_WRITE_ATTEMPTS";

/// Configuration parameters for a pattern job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternConfig {
    /// Number of worker threads. Zero is treated as one.
    pub workers: usize,

    /// Attempts made to store one origin's rows before they are dropped.
    pub max_write_attempts: usize,
}

impl PatternConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(workers: usize, max_write_attempts: usize) -> Self {
        Self {
            workers,
            max_write_attempts,
        }
    }

    /// Defaults overridden by whatever `lookup` returns for
    /// [`WORKERS_VAR`] and [`MAX_WRITE_ATTEMPTS_VAR`].
    ///
    /// Pass `|name| std::env::var(name).ok()` to read the process
    /// environment. Values that do not parse as a count are ignored.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).and_then(|value| value.trim().parse::<usize>().ok());
        let defaults = Self::default();

        Self {
            workers: read(WORKERS_VAR).unwrap_or(defaults.workers),
            max_write_attempts: read(MAX_WRITE_ATTEMPTS_VAR).unwrap_or(defaults.max_write_attempts),
        }
    }

    /// Worker threads actually started.
    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            max_write_attempts: 3,
        }
    }
}
