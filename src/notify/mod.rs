//! Best-effort delivery of matches to an external sink.
//!
//! Workers hand matches to a bounded queue without ever blocking. A small
//! fixed pool of notifier threads drains the queue and forwards each match
//! to a [`NotifySink`]. Failures are logged and dropped, never retried.

mod telegram;

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::{debug, warn};

use crate::worker::VanityResult;

pub use telegram::TelegramSink;

/// Errors raised while notifying.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("http request failed: {0}")]
    Http(reqwest::Error),
    #[error("api rejected request: {0}")]
    Api(String),
    #[error("failed to spawn notifier thread: {0}")]
    Spawn(#[from] io::Error),
}

/// Destination for match notifications.
pub trait NotifySink: Send + Sync {
    fn notify(&self, message: &str) -> Result<(), NotifyError>;
}

/// Cloneable, non-blocking submission handle given to each worker.
#[derive(Debug, Clone)]
pub struct NotifyHandle {
    tx: Sender<VanityResult>,
}

impl NotifyHandle {
    /// Queues a match for delivery. Never blocks.
    ///
    /// Returns false if the match was dropped because the queue is full or
    /// the notifier has shut down.
    pub fn submit(&self, result: VanityResult) -> bool {
        match self.tx.try_send(result) {
            Ok(()) => true,
            Err(TrySendError::Full(result)) => {
                warn!(address = %result.address, "notification queue full, dropping");
                false
            }
            Err(TrySendError::Disconnected(result)) => {
                warn!(address = %result.address, "notifier stopped, dropping");
                false
            }
        }
    }
}

/// Fixed pool of notifier threads draining a bounded queue.
pub struct Notifier {
    tx: Sender<VanityResult>,
    handles: Vec<JoinHandle<()>>,
}

impl Notifier {
    /// Spawns `workers` notifier threads behind a queue of `capacity`.
    pub fn spawn(
        sink: Arc<dyn NotifySink>,
        workers: usize,
        capacity: usize,
    ) -> Result<Self, NotifyError> {
        let (tx, rx) = bounded(capacity);

        let handles = (0..workers)
            .map(|id| {
                let sink = sink.clone();
                let rx: Receiver<VanityResult> = rx.clone();
                thread::Builder::new()
                    .name(format!("vanity-notifier-{}", id))
                    .spawn(move || {
                        for result in rx.iter() {
                            match sink.notify(&result.to_string()) {
                                Ok(()) => debug!(address = %result.address, "notification sent"),
                                Err(e) => {
                                    warn!(address = %result.address, error = %e, "notification failed")
                                }
                            }
                        }
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { tx, handles })
    }

    /// Returns a submission handle for a worker.
    pub fn handle(&self) -> NotifyHandle {
        NotifyHandle {
            tx: self.tx.clone(),
        }
    }

    /// Closes the queue and waits for pending notifications to finish.
    ///
    /// Outstanding [`NotifyHandle`]s keep the queue open, so drop them (stop
    /// the workers) first.
    pub fn shutdown(self) {
        drop(self.tx);
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::MarkerKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Condvar, Mutex};

    fn result(n: usize) -> VanityResult {
        VanityResult {
            marker: MarkerKind::LowDiversity,
            address: format!("1addr{}", n),
            secret: format!("Ksecret{}", n),
            worker_id: 0,
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        messages: Mutex<Vec<String>>,
    }

    impl NotifySink for RecordingSink {
        fn notify(&self, message: &str) -> Result<(), NotifyError> {
            self.messages.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FailingSink {
        calls: AtomicUsize,
    }

    impl NotifySink for FailingSink {
        fn notify(&self, _message: &str) -> Result<(), NotifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(NotifyError::Api("chat not found".into()))
        }
    }

    /// Blocks every delivery until released.
    #[derive(Default)]
    struct GatedSink {
        open: Mutex<bool>,
        cond: Condvar,
    }

    impl GatedSink {
        fn release(&self) {
            *self.open.lock().unwrap() = true;
            self.cond.notify_all();
        }
    }

    impl NotifySink for GatedSink {
        fn notify(&self, _message: &str) -> Result<(), NotifyError> {
            let mut open = self.open.lock().unwrap();
            while !*open {
                open = self.cond.wait(open).unwrap();
            }
            Ok(())
        }
    }

    #[test]
    fn test_delivers_every_submission() {
        let sink = Arc::new(RecordingSink::default());
        let notifier = Notifier::spawn(sink.clone(), 2, 16).unwrap();
        let handle = notifier.handle();
        for n in 0..10 {
            assert!(handle.submit(result(n)));
        }
        drop(handle);
        notifier.shutdown();

        let mut messages = sink.messages.lock().unwrap().clone();
        messages.sort();
        assert_eq!(messages.len(), 10);
        assert!(messages.contains(&"🌈 Address: 1addr3, key: Ksecret3".to_string()));
    }

    #[test]
    fn test_failures_are_not_fatal() {
        let sink = Arc::new(FailingSink::default());
        let notifier = Notifier::spawn(sink.clone(), 1, 8).unwrap();
        let handle = notifier.handle();
        for n in 0..5 {
            handle.submit(result(n));
        }
        drop(handle);
        notifier.shutdown();
        assert_eq!(sink.calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_full_queue_does_not_block() {
        let sink = Arc::new(GatedSink::default());
        let notifier = Notifier::spawn(sink.clone(), 1, 1).unwrap();
        let handle = notifier.handle();

        // One in flight, one queued, the rest dropped without blocking.
        let accepted = (0..10).filter(|&n| handle.submit(result(n))).count();
        assert!(accepted >= 1 && accepted <= 2);

        sink.release();
        drop(handle);
        notifier.shutdown();
    }
}
