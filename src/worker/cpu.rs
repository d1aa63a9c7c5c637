//! CPU-based worker for the generate-derive-classify loop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use tracing::{debug, info};

use crate::crypto::{AddressScheme, CryptoError};
use crate::matcher::Pattern;
use crate::notify::NotifyHandle;

use super::VanityResult;

/// Attempts between progress checkpoints.
pub const DEFAULT_REPORT_EVERY: u64 = 100_000_000;

/// Shared statistics for all workers.
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Total keys generated (attempts)
    pub keys_generated: AtomicU64,
    /// Matches found
    pub matches_found: AtomicU64,
}

impl WorkerStats {
    /// Creates new worker stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total keys generated.
    pub fn total_keys(&self) -> u64 {
        self.keys_generated.load(Ordering::Relaxed)
    }

    /// Returns the total matches found.
    pub fn total_matches(&self) -> u64 {
        self.matches_found.load(Ordering::Relaxed)
    }
}

/// Reason a worker stopped early. Fatal to that worker only.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("key generation: {0}")]
    KeyGeneration(#[source] CryptoError),
    #[error("address derivation: {0}")]
    AddressDerivation(#[source] CryptoError),
    #[error("secret encoding: {0}")]
    SecretEncoding(#[source] CryptoError),
}

/// What a worker did before it exited.
#[derive(Debug)]
pub struct WorkerReport {
    pub id: usize,
    /// Attempts made by this worker, including a final failed one.
    pub keys_generated: u64,
    pub outcome: Result<(), WorkerError>,
}

/// A CPU worker that generates and classifies keypairs.
pub struct CpuWorker<S> {
    id: usize,
    scheme: Arc<S>,
    pattern: Pattern,
    result_tx: Sender<VanityResult>,
    notify: Option<NotifyHandle>,
    stop_flag: Arc<AtomicBool>,
    stats: Arc<WorkerStats>,
    report_every: u64,
}

impl<S: AddressScheme> CpuWorker<S> {
    /// Creates a new CPU worker.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        scheme: Arc<S>,
        pattern: Pattern,
        result_tx: Sender<VanityResult>,
        notify: Option<NotifyHandle>,
        stop_flag: Arc<AtomicBool>,
        stats: Arc<WorkerStats>,
        report_every: u64,
    ) -> Self {
        Self {
            id,
            scheme,
            pattern,
            result_tx,
            notify,
            stop_flag,
            stats,
            report_every: report_every.max(1),
        }
    }

    /// Runs the worker loop until:
    /// - The stop flag is set
    /// - The result channel is closed
    /// - A capability fails (reported in the outcome)
    pub fn run(self) -> WorkerReport {
        let mut local = 0u64;
        let outcome = self.search(&mut local);
        WorkerReport {
            id: self.id,
            keys_generated: local,
            outcome,
        }
    }

    fn search(&self, local: &mut u64) -> Result<(), WorkerError> {
        while !self.stop_flag.load(Ordering::Relaxed) {
            *local += 1;
            let attempts = self.stats.keys_generated.fetch_add(1, Ordering::Relaxed) + 1;
            if attempts % self.report_every == 0 {
                info!(
                    attempts_millions = attempts / 1_000_000,
                    matches = self.stats.total_matches(),
                    "progress checkpoint"
                );
            }

            let keypair = self.scheme.generate().map_err(WorkerError::KeyGeneration)?;
            let address = self
                .scheme
                .derive_address(&keypair)
                .map_err(WorkerError::AddressDerivation)?;

            let Some(marker) = self.pattern.classify(address.as_str()) else {
                continue;
            };

            let secret = self
                .scheme
                .encode_secret(&keypair)
                .map_err(WorkerError::SecretEncoding)?;
            self.stats.matches_found.fetch_add(1, Ordering::Relaxed);

            let result = VanityResult {
                marker,
                address: address.into_string(),
                secret,
                worker_id: self.id,
            };
            debug!(worker = self.id, %marker, address = %result.address, "match found");

            let pending = self.notify.as_ref().map(|notify| (notify, result.clone()));

            // Blocks while the channel is full; an error means nobody is listening.
            if self.result_tx.send(result).is_err() {
                debug!(worker = self.id, "result channel closed, exiting");
                break;
            }

            if let Some((notify, result)) = pending {
                notify.submit(result);
            }
        }
        Ok(())
    }
}
