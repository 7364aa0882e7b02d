use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::errors::CourierError;
use crate::receipt::ReceiptRecord;

/// Capability interface through which the engine reports to whatever
/// renders status. The engine never depends on a concrete presentation
/// technology.
pub trait CourierObserver: Send + Sync {
    /// A per-item failure that will not be retried.
    fn on_error(&self, error: CourierError);
    /// A fresh point-in-time snapshot of the receipt log.
    fn on_receipts_updated(&self, receipts: Vec<ReceiptRecord>);
}

/// Event carried from the worker to the delivery thread.
enum ObserverEvent {
    Error(CourierError),
    Receipts(Vec<ReceiptRecord>),
}

/// Delivers observer callbacks on a dedicated thread.
///
/// The worker side only enqueues onto an unbounded channel, so a slow
/// renderer never blocks a cycle and callbacks never reenter worker
/// state. Dropping the pump disconnects the channel and joins the
/// delivery thread once queued events have drained.
pub struct ObserverPump {
    sender: Option<Sender<ObserverEvent>>,
    handle: Option<thread::JoinHandle<()>>,
    stats: Arc<PumpStats>,
}

/// Pump runtime counters.
#[derive(Default)]
struct PumpStats {
    delivered: AtomicUsize,
}

impl ObserverPump {
    /// Spawn the delivery thread for `inner`.
    pub fn spawn(inner: Arc<dyn CourierObserver>) -> Self {
        let (sender, receiver) = mpsc::channel::<ObserverEvent>();
        let stats = Arc::new(PumpStats::default());
        let stats_thread = Arc::clone(&stats);
        let handle = thread::spawn(move || {
            while let Ok(event) = receiver.recv() {
                match event {
                    ObserverEvent::Error(error) => inner.on_error(error),
                    ObserverEvent::Receipts(receipts) => inner.on_receipts_updated(receipts),
                }
                stats_thread.delivered.fetch_add(1, Ordering::Relaxed);
            }
        });
        Self {
            sender: Some(sender),
            handle: Some(handle),
            stats,
        }
    }

    /// Total number of callbacks delivered so far.
    pub fn delivered_count(&self) -> usize {
        self.stats.delivered.load(Ordering::Relaxed)
    }

    fn send(&self, event: ObserverEvent) {
        if let Some(sender) = self.sender.as_ref() {
            // A disconnected receiver means the pump is shutting down;
            // there is nobody left to render the event.
            let _ = sender.send(event);
        }
    }
}

impl CourierObserver for ObserverPump {
    fn on_error(&self, error: CourierError) {
        self.send(ObserverEvent::Error(error));
    }

    fn on_receipts_updated(&self, receipts: Vec<ReceiptRecord>) {
        self.send(ObserverEvent::Receipts(receipts));
    }
}

impl Drop for ObserverPump {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Observer that records every callback; used by tests and as a
/// fallback sink when no renderer is attached.
#[derive(Default)]
pub struct RecordingObserver {
    errors: Mutex<Vec<CourierError>>,
    snapshots: Mutex<Vec<Vec<ReceiptRecord>>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Error messages reported so far.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .lock()
            .expect("recording observer poisoned")
            .iter()
            .map(|error| error.to_string())
            .collect()
    }

    /// Snapshots published so far, oldest first.
    pub fn snapshots(&self) -> Vec<Vec<ReceiptRecord>> {
        self.snapshots
            .lock()
            .expect("recording observer poisoned")
            .clone()
    }

    /// The most recently published snapshot, if any.
    pub fn latest_snapshot(&self) -> Option<Vec<ReceiptRecord>> {
        self.snapshots
            .lock()
            .expect("recording observer poisoned")
            .last()
            .cloned()
    }
}

impl CourierObserver for RecordingObserver {
    fn on_error(&self, error: CourierError) {
        self.errors
            .lock()
            .expect("recording observer poisoned")
            .push(error);
    }

    fn on_receipts_updated(&self, receipts: Vec<ReceiptRecord>) {
        self.snapshots
            .lock()
            .expect("recording observer poisoned")
            .push(receipts);
    }
}
