use std::sync::{Arc, Condvar, Mutex, RwLock};
use std::time::Duration;

use crate::constants::correlation::RECIPIENT_SUFFIX_MARKER;
use crate::errors::CourierError;
use crate::types::StatusText;

/// Immutable delivery-status record reconciled from a receipt document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiptRecord {
    /// Message id as carried by the receipt, including the recipient
    /// suffix (for example `…-51-935-E00`).
    pub message_id: String,
    /// Message id without the recipient suffix; equal across all
    /// receipts produced by one dispatched file.
    pub message_id_trimmed: String,
    /// Status text of the transmission.
    pub status_info: StatusText,
}

impl ReceiptRecord {
    /// Build a record, deriving the trimmed message id.
    ///
    /// Fails when `message_id` carries no recipient suffix marker; a
    /// receipt without one breaks the exchange protocol assumption and
    /// must be reported rather than recorded with a bogus trim.
    pub fn new(
        message_id: impl Into<String>,
        status_info: impl Into<StatusText>,
    ) -> Result<Self, CourierError> {
        let message_id = message_id.into();
        let trimmed = match message_id.find(RECIPIENT_SUFFIX_MARKER) {
            Some(pos) => message_id[..pos].to_string(),
            None => {
                return Err(CourierError::MissingSuffixMarker {
                    id: message_id,
                    marker: RECIPIENT_SUFFIX_MARKER,
                });
            }
        };
        Ok(Self {
            message_id,
            message_id_trimmed: trimmed,
            status_info: status_info.into(),
        })
    }

    /// Recipient suffix of the message id (for example `E00`).
    pub fn recipient_suffix(&self) -> &str {
        let tail = &self.message_id[self.message_id_trimmed.len()..];
        tail.strip_prefix('-').unwrap_or(tail)
    }
}

/// Thread-safe, insertion-ordered, append-only log of reconciled
/// receipts, shared between the reconciler and the observer.
///
/// The log grows for the life of the process and is never truncated at
/// runtime; receipt cleanup happens on disk, not here.
#[derive(Clone, Default)]
pub struct ReceiptLog {
    inner: Arc<RwLock<Vec<ReceiptRecord>>>,
    notifier: Arc<(Mutex<LogStats>, Condvar)>,
}

/// Internal append notification counters.
#[derive(Default)]
struct LogStats {
    appends: u64,
}

impl ReceiptLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record at the end of the log.
    pub fn append(&self, record: ReceiptRecord) {
        let mut inner = self.inner.write().expect("receipt log poisoned");
        inner.push(record);
        drop(inner);
        let (lock, cvar) = &*self.notifier;
        let mut stats = lock.lock().expect("receipt log stats poisoned");
        stats.appends = stats.appends.saturating_add(1);
        cvar.notify_all();
    }

    /// Return a stable point-in-time copy of the log.
    ///
    /// Later appends never mutate a snapshot already handed out.
    pub fn snapshot(&self) -> Vec<ReceiptRecord> {
        let inner = self.inner.read().expect("receipt log poisoned");
        inner.clone()
    }

    /// Return the number of completed append operations.
    pub fn append_count(&self) -> u64 {
        let (lock, _) = &*self.notifier;
        lock.lock().expect("receipt log stats poisoned").appends
    }

    /// Wait until the append count exceeds `last_seen`, or until the
    /// timeout elapses.
    pub fn wait_for_append(&self, last_seen: u64, timeout: Duration) -> u64 {
        let (lock, cvar) = &*self.notifier;
        let mut stats = lock.lock().expect("receipt log stats poisoned");
        while stats.appends <= last_seen {
            let result = cvar
                .wait_timeout(stats, timeout)
                .expect("receipt log stats poisoned");
            stats = result.0;
            if result.1.timed_out() {
                break;
            }
        }
        stats.appends
    }

    /// Returns `true` when no receipt has been reconciled yet.
    pub fn is_empty(&self) -> bool {
        let inner = self.inner.read().expect("receipt log poisoned");
        inner.is_empty()
    }

    /// Return the number of reconciled receipts.
    pub fn len(&self) -> usize {
        let inner = self.inner.read().expect("receipt log poisoned");
        inner.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_trims_recipient_suffix() {
        let record = ReceiptRecord::new("4-143849-0-20191112-1334-51-935-E00", "OK").unwrap();
        assert_eq!(record.message_id_trimmed, "4-143849-0-20191112-1334-51-935");
        assert_eq!(record.recipient_suffix(), "E00");
    }

    #[test]
    fn record_without_marker_is_rejected() {
        let err = ReceiptRecord::new("4-143849-0-20191112", "OK").unwrap_err();
        match err {
            CourierError::MissingSuffixMarker { id, marker } => {
                assert_eq!(id, "4-143849-0-20191112");
                assert_eq!(marker, "-E");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn snapshot_is_stable_under_later_appends() {
        let log = ReceiptLog::new();
        log.append(ReceiptRecord::new("S1-1-E00", "OK").unwrap());
        let snapshot = log.snapshot();
        log.append(ReceiptRecord::new("S1-2-E00", "OK").unwrap());
        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.len(), 2);
        assert_eq!(snapshot[0].message_id, "S1-1-E00");
    }

    #[test]
    fn append_ordering_is_insertion_ordering() {
        let log = ReceiptLog::new();
        for idx in 0..4 {
            log.append(ReceiptRecord::new(format!("S1-{idx}-E00"), "OK").unwrap());
        }
        let ids: Vec<String> = log
            .snapshot()
            .into_iter()
            .map(|record| record.message_id)
            .collect();
        assert_eq!(ids, vec!["S1-0-E00", "S1-1-E00", "S1-2-E00", "S1-3-E00"]);
    }

    #[test]
    fn waiters_observe_appends_from_other_threads() {
        let log = ReceiptLog::new();
        assert_eq!(log.append_count(), 0);
        assert_eq!(log.wait_for_append(0, Duration::from_millis(1)), 0);

        let log_for_waiter = log.clone();
        let handle =
            std::thread::spawn(move || log_for_waiter.wait_for_append(0, Duration::from_secs(5)));
        std::thread::sleep(Duration::from_millis(5));
        log.append(ReceiptRecord::new("S1-9-E00", "OK").unwrap());
        assert_eq!(handle.join().unwrap(), 1);
    }
}
