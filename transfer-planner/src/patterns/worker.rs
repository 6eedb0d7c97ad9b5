//! Fixed pool of worker threads generating patterns one origin at a time.
//!
//! Each worker owns a private origin channel and shares one event channel
//! with the coordinator. A worker announces itself ready, then reports each
//! finished origin; every report doubles as a request for more work. When
//! the queue is empty the coordinator drops that worker's sender, which
//! ends the worker's loop.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::config::PatternConfig;
use super::profile::TransferPatternScanner;
use super::repository::{PatternStore, StoreError, TransferPattern, WriteOutcome, store_with_retry};
use crate::domain::{Connection, ServiceDay, StopId};
use crate::timetable::Timetable;

/// Errors that stop a pattern job.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The store could not be prepared
    #[error("could not initialise pattern store: {0}")]
    Store(#[from] StoreError),

    /// A worker thread could not be started
    #[error("could not spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// A worker thread panicked
    #[error("pattern worker {0} panicked")]
    WorkerPanicked(usize),
}

/// Totals for a finished job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobSummary {
    /// Origins whose tree was computed
    pub origins: usize,
    /// New rows written to the store
    pub rows_written: usize,
    /// Batches lost after every write attempt failed
    pub batches_dropped: usize,
}

#[derive(Debug)]
enum WorkerEvent {
    Ready(usize),
    Done {
        worker: usize,
        origin: StopId,
        outcome: WriteOutcome,
    },
}

/// Pattern generation for every origin over one service day.
#[derive(Debug)]
pub struct PatternJob<S> {
    timetable: Arc<Timetable>,
    day: ServiceDay,
    store: Arc<S>,
    config: PatternConfig,
}

impl<S> PatternJob<S>
where
    S: PatternStore + 'static,
{
    /// Create a job over `timetable` for the hops running on `day`.
    pub fn new(timetable: Arc<Timetable>, day: ServiceDay, store: Arc<S>, config: PatternConfig) -> Self {
        Self {
            timetable,
            day,
            store,
            config,
        }
    }

    /// Compute and store the patterns of every origin, returning once all
    /// workers have stopped.
    ///
    /// Blocks the calling thread; must not be called from within an async
    /// runtime.
    pub fn run(&self, origins: Vec<StopId>) -> Result<JobSummary, JobError> {
        self.store.init()?;

        let connections = Arc::new(self.timetable.connections_running_on(self.day));
        let worker_count = self.config.worker_count();
        let total = origins.len();

        info!(
            origins = total,
            workers = worker_count,
            hops = connections.len(),
            day = self.day.date_number(),
            "Starting pattern job"
        );

        let (events_tx, mut events_rx) = mpsc::channel(worker_count);
        let mut senders: Vec<Option<mpsc::Sender<StopId>>> = Vec::with_capacity(worker_count);
        let mut handles = Vec::with_capacity(worker_count);

        for id in 0..worker_count {
            let (origin_tx, origin_rx) = mpsc::channel(1);
            let worker = PatternWorker {
                id,
                timetable: Arc::clone(&self.timetable),
                connections: Arc::clone(&connections),
                store: Arc::clone(&self.store),
                max_write_attempts: self.config.max_write_attempts,
                origins: origin_rx,
                events: events_tx.clone(),
            };

            let spawned = thread::Builder::new()
                .name(format!("pattern_worker_{id}"))
                .spawn(move || worker.run());

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    // Closing the existing channels lets started workers exit
                    drop(senders);
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(JobError::Spawn(e));
                }
            }
            senders.push(Some(origin_tx));
        }

        drop(events_tx);

        let mut queue: VecDeque<StopId> = origins.into();
        let mut summary = JobSummary::default();

        while let Some(event) = events_rx.blocking_recv() {
            let worker = match event {
                WorkerEvent::Ready(worker) => worker,
                WorkerEvent::Done {
                    worker,
                    origin,
                    outcome,
                } => {
                    summary.origins += 1;
                    match outcome {
                        WriteOutcome::Stored(rows) => summary.rows_written += rows,
                        WriteOutcome::Dropped(_) => summary.batches_dropped += 1,
                    }
                    info!(
                        origin = %origin,
                        worker,
                        completed = summary.origins,
                        total,
                        "Origin complete"
                    );
                    worker
                }
            };

            dispatch(&mut queue, &mut senders[worker], worker);
        }

        let mut panicked = None;
        for (id, handle) in handles.into_iter().enumerate() {
            if handle.join().is_err() {
                error!(worker = id, "Pattern worker panicked");
                panicked.get_or_insert(id);
            }
        }

        if let Some(id) = panicked {
            return Err(JobError::WorkerPanicked(id));
        }

        if !queue.is_empty() {
            warn!(remaining = queue.len(), "Pattern job ended with origins left");
        }

        info!(
            origins = summary.origins,
            rows = summary.rows_written,
            dropped = summary.batches_dropped,
            "Pattern job complete"
        );

        Ok(summary)
    }
}

/// Hand the next origin to a ready worker, or close its channel when the
/// queue is empty.
fn dispatch(queue: &mut VecDeque<StopId>, sender: &mut Option<mpsc::Sender<StopId>>, worker: usize) {
    let Some(origin) = queue.pop_front() else {
        *sender = None;
        return;
    };

    let Some(tx) = sender.as_ref() else {
        queue.push_front(origin);
        return;
    };

    if let Err(mpsc::error::SendError(origin)) = tx.blocking_send(origin) {
        warn!(worker, origin = %origin, "Worker has gone away, requeueing origin");
        queue.push_front(origin);
        *sender = None;
    }
}

struct PatternWorker<S> {
    id: usize,
    timetable: Arc<Timetable>,
    connections: Arc<Vec<Connection>>,
    store: Arc<S>,
    max_write_attempts: usize,
    origins: mpsc::Receiver<StopId>,
    events: mpsc::Sender<WorkerEvent>,
}

impl<S: PatternStore> PatternWorker<S> {
    fn run(mut self) {
        debug!(worker = self.id, "Pattern worker started");

        if self.events.blocking_send(WorkerEvent::Ready(self.id)).is_err() {
            return;
        }

        while let Some(origin) = self.origins.blocking_recv() {
            let outcome = self.process(&origin);

            let event = WorkerEvent::Done {
                worker: self.id,
                origin,
                outcome,
            };
            if self.events.blocking_send(event).is_err() {
                warn!(worker = self.id, "Coordinator has gone away");
                break;
            }
        }

        debug!(worker = self.id, "Pattern worker stopped");
    }

    fn process(&self, origin: &StopId) -> WriteOutcome {
        let scanner = TransferPatternScanner::new(
            &self.connections,
            &self.timetable.transfers,
            &self.timetable.interchange,
        );

        let tree = scanner.shortest_path_tree(origin);
        let rows = TransferPattern::from_tree(&tree);

        debug!(worker = self.id, origin = %origin, rows = rows.len(), "Storing patterns");

        store_with_retry(self.store.as_ref(), &rows, self.max_write_attempts)
    }
}
