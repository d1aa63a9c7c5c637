//! Dispatcher: worker pool plus the bounded result channel.

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, error, warn};

use crate::crypto::AddressScheme;
use crate::matcher::{MarkerKind, Pattern};
use crate::notify::NotifyHandle;

use super::cpu::{CpuWorker, WorkerReport, WorkerStats, DEFAULT_REPORT_EVERY};

/// A matched address, moved once from a worker to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VanityResult {
    /// Which rule matched
    pub marker: MarkerKind,
    /// The derived address
    pub address: String,
    /// The exportable secret (WIF)
    pub secret: String,
    /// The ID of the worker that found this result
    pub worker_id: usize,
}

impl fmt::Display for VanityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Address: {}, key: {}",
            self.marker.symbol(),
            self.address,
            self.secret
        )
    }
}

/// Sizing of a [`Dispatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub workers: usize,
    pub channel_capacity: usize,
    /// Attempts between progress checkpoints.
    pub report_every: u64,
}

impl PoolConfig {
    /// `workers` threads with a channel of the same capacity.
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            channel_capacity: workers,
            report_every: DEFAULT_REPORT_EVERY,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("failed to spawn thread: {0}")]
    Spawn(#[from] io::Error),
}

/// Final account of a run.
#[derive(Debug, Default)]
pub struct PoolReport {
    /// One entry per worker that exited normally or with an error.
    pub workers: Vec<WorkerReport>,
    /// Results still queued when the pool was joined.
    pub undelivered: Vec<VanityResult>,
}

impl PoolReport {
    /// Sum of per-worker attempt counts.
    pub fn total_keys(&self) -> u64 {
        self.workers.iter().map(|w| w.keys_generated).sum()
    }

    /// Workers that stopped because of an error.
    pub fn failed(&self) -> impl Iterator<Item = &WorkerReport> {
        self.workers.iter().filter(|w| w.outcome.is_err())
    }
}

/// Runs N workers against one bounded result channel.
///
/// A coordinator thread joins every worker before releasing its own sender,
/// so the channel closes only once all workers have exited.
pub struct Dispatcher {
    num_workers: usize,
    coordinator: Option<JoinHandle<Vec<WorkerReport>>>,
    result_rx: Receiver<VanityResult>,
    stop_flag: Arc<AtomicBool>,
    stats: Arc<WorkerStats>,
    start_time: Instant,
}

impl Dispatcher {
    /// Spawns the workers and the coordinator.
    pub fn spawn<S>(
        scheme: Arc<S>,
        pattern: Pattern,
        config: PoolConfig,
        notify: Option<NotifyHandle>,
    ) -> Result<Self, PoolError>
    where
        S: AddressScheme + 'static,
    {
        let (result_tx, result_rx) = bounded(config.channel_capacity);
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(WorkerStats::new());

        let spawned = Self::spawn_workers(
            scheme,
            pattern,
            config,
            &result_tx,
            notify,
            &stop_flag,
            &stats,
        )
        .and_then(|handles| {
            thread::Builder::new()
                .name("vanity-coordinator".into())
                .spawn(move || {
                    let reports = collect_reports(handles);
                    drop(result_tx);
                    reports
                })
        });

        let coordinator = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                stop_flag.store(true, Ordering::Relaxed);
                return Err(PoolError::Spawn(e));
            }
        };

        Ok(Self {
            num_workers: config.workers,
            coordinator: Some(coordinator),
            result_rx,
            stop_flag,
            stats,
            start_time: Instant::now(),
        })
    }

    /// Spawns worker threads.
    fn spawn_workers<S>(
        scheme: Arc<S>,
        pattern: Pattern,
        config: PoolConfig,
        result_tx: &Sender<VanityResult>,
        notify: Option<NotifyHandle>,
        stop_flag: &Arc<AtomicBool>,
        stats: &Arc<WorkerStats>,
    ) -> io::Result<Vec<JoinHandle<WorkerReport>>>
    where
        S: AddressScheme + 'static,
    {
        (0..config.workers)
            .map(|id| {
                let worker = CpuWorker::new(
                    id,
                    scheme.clone(),
                    pattern,
                    result_tx.clone(),
                    notify.clone(),
                    stop_flag.clone(),
                    stats.clone(),
                    config.report_every,
                );

                thread::Builder::new()
                    .name(format!("vanity-worker-{}", id))
                    .spawn(move || worker.run())
            })
            .collect()
    }

    /// Waits for a result with a timeout.
    ///
    /// `Disconnected` means every worker has exited and the channel is empty.
    pub fn wait_for_result(&self, timeout: Duration) -> Result<VanityResult, RecvTimeoutError> {
        self.result_rx.recv_timeout(timeout)
    }

    /// Returns a blocking iterator over results that ends when the channel closes.
    pub fn results(&self) -> impl Iterator<Item = VanityResult> + '_ {
        self.result_rx.iter()
    }

    /// Forwards every result to `sink` in arrival order until the channel
    /// closes, then joins the pool.
    pub fn drain<F>(self, mut sink: F) -> PoolReport
    where
        F: FnMut(VanityResult),
    {
        for result in self.results() {
            sink(result);
        }
        self.join()
    }

    /// Signals all workers to stop after their current iteration.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Stops the workers and waits for them.
    ///
    /// Results still in the channel are returned in
    /// [`PoolReport::undelivered`] rather than dropped.
    pub fn join(mut self) -> PoolReport {
        self.stop();
        let undelivered: Vec<_> = self.result_rx.iter().collect();
        let workers = self.join_coordinator();
        PoolReport {
            workers,
            undelivered,
        }
    }

    fn join_coordinator(&mut self) -> Vec<WorkerReport> {
        match self.coordinator.take().map(JoinHandle::join) {
            Some(Ok(reports)) => reports,
            Some(Err(_)) => {
                error!("coordinator thread panicked");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Returns the number of workers.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Returns the total keys generated across all workers.
    pub fn total_keys(&self) -> u64 {
        self.stats.total_keys()
    }

    /// Returns the total matches found.
    pub fn total_matches(&self) -> u64 {
        self.stats.total_matches()
    }

    /// Returns the elapsed time since the pool was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the current generation rate (keys per second).
    pub fn keys_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_keys() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Returns a clone of the stop flag for external use (e.g., signal handlers).
    pub fn stop_flag_clone(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Returns true if the pool has been signaled to stop.
    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        if self.coordinator.is_none() {
            return;
        }
        self.stop();
        // Unblock any worker waiting on a full channel.
        let dropped = self.result_rx.iter().count();
        if dropped > 0 {
            warn!(dropped, "dispatcher dropped with undelivered results");
        }
        self.join_coordinator();
    }
}

fn collect_reports(handles: Vec<JoinHandle<WorkerReport>>) -> Vec<WorkerReport> {
    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.join() {
            Ok(report) => {
                match &report.outcome {
                    Ok(()) => debug!(worker = report.id, keys = report.keys_generated, "worker exited"),
                    Err(e) => error!(
                        worker = report.id,
                        keys = report.keys_generated,
                        error = %e,
                        "worker stopped"
                    ),
                }
                reports.push(report);
            }
            Err(_) => error!("worker thread panicked"),
        }
    }
    reports
}
