use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use crate::dispatch::OutboundDispatcher;
use crate::observer::CourierObserver;

/// Periodic driver for dispatcher cycles.
///
/// Embedders with their own scheduler can invoke
/// [`OutboundDispatcher::run_cycle`] directly; this worker is the
/// batteries-included variant: one thread, one cycle per poll
/// interval, and a stop request that takes effect after at most the
/// in-flight cycle (which itself is bounded by the batch size).
pub struct CycleWorker {
    shared: Arc<WorkerShared>,
    handle: Option<thread::JoinHandle<()>>,
}

struct WorkerShared {
    stop: Mutex<bool>,
    wakeup: Condvar,
    cycles: AtomicUsize,
}

impl CycleWorker {
    /// Spawn the worker thread. Cycle errors are routed to the
    /// observer; the worker keeps going.
    pub fn spawn(
        dispatcher: Arc<OutboundDispatcher>,
        observer: Arc<dyn CourierObserver>,
        poll_interval: Duration,
    ) -> Self {
        let shared = Arc::new(WorkerShared {
            stop: Mutex::new(false),
            wakeup: Condvar::new(),
            cycles: AtomicUsize::new(0),
        });
        let shared_thread = Arc::clone(&shared);
        let handle = thread::spawn(move || {
            loop {
                {
                    let stopped = shared_thread.stop.lock().expect("worker stop flag poisoned");
                    if *stopped {
                        return;
                    }
                }
                if let Err(error) = dispatcher.run_cycle() {
                    observer.on_error(error);
                }
                shared_thread.cycles.fetch_add(1, Ordering::Relaxed);

                let stopped = shared_thread.stop.lock().expect("worker stop flag poisoned");
                let (stopped, _) = shared_thread
                    .wakeup
                    .wait_timeout_while(stopped, poll_interval, |stopped| !*stopped)
                    .expect("worker stop flag poisoned");
                if *stopped {
                    return;
                }
            }
        });
        Self {
            shared,
            handle: Some(handle),
        }
    }

    /// Number of completed dispatcher cycles.
    pub fn cycles_completed(&self) -> usize {
        self.shared.cycles.load(Ordering::Relaxed)
    }

    /// Request a stop. Takes effect before the next cycle starts; an
    /// in-flight cycle finishes its current batch first.
    pub fn stop(&self) {
        let mut stopped = self.shared.stop.lock().expect("worker stop flag poisoned");
        *stopped = true;
        self.shared.wakeup.notify_all();
    }
}

impl Drop for CycleWorker {
    fn drop(&mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
