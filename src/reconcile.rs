use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::archive;
use crate::config::CourierConfig;
use crate::errors::CourierError;
use crate::extract;
use crate::observer::CourierObserver;
use crate::receipt::ReceiptLog;

/// Drains receipt documents deposited by the exchange network's local
/// delivery agent, archives them, and appends the extracted delivery
/// status to the shared [`ReceiptLog`].
pub struct ReceiptReconciler {
    receipts_dir: PathBuf,
    receipts_archive_dir: PathBuf,
    batch_size: usize,
    log: ReceiptLog,
    observer: Arc<dyn CourierObserver>,
    cycle_lock: Mutex<()>,
}

impl ReceiptReconciler {
    /// Build a reconciler over the configured directories.
    pub fn new(config: &CourierConfig, log: ReceiptLog, observer: Arc<dyn CourierObserver>) -> Self {
        Self {
            receipts_dir: config.receipts_dir.clone(),
            receipts_archive_dir: config.receipts_archive_dir.clone(),
            batch_size: config.batch_size.max(1),
            log,
            observer,
            cycle_lock: Mutex::new(()),
        }
    }

    /// Handle to the shared receipt log.
    pub fn log(&self) -> ReceiptLog {
        self.log.clone()
    }

    /// Run one reconciliation cycle.
    ///
    /// At most `batch_size` candidate documents are handled; every step
    /// per candidate is independently fail-soft, so a candidate that is
    /// not ready yet (still being written, locked, undeletable) is left
    /// for a later cycle. The current log snapshot is published to the
    /// observer unconditionally, even when there was no candidate.
    pub fn run_cycle(&self) -> Result<(), CourierError> {
        let _guard = self.cycle_lock.lock().expect("reconciler cycle lock poisoned");
        fs::create_dir_all(&self.receipts_archive_dir)?;

        let candidates = archive::scan_shallow(&self.receipts_dir);
        for source in candidates
            .iter()
            .filter(|path| !path.is_dir())
            .take(self.batch_size)
        {
            self.reconcile_candidate(source);
        }

        self.observer.on_receipts_updated(self.log.snapshot());
        Ok(())
    }

    fn reconcile_candidate(&self, source: &Path) {
        // A parse failure usually means the delivery agent has not
        // finished writing; the same file is reconsidered next cycle.
        let parsed = match extract::parse_receipt(source) {
            Ok(parsed) => parsed,
            Err(error) => {
                debug!(path = %source.display(), %error, "receipt not parseable yet, deferring");
                return;
            }
        };

        let Some(name) = source.file_name() else {
            return;
        };
        let archived = self.receipts_archive_dir.join(name);
        // Overwriting keeps the retry idempotent: a crash after this
        // copy but before the delete reproduces the identical copy.
        if let Err(error) = fs::copy(source, &archived) {
            debug!(path = %source.display(), %error, "receipt archive copy failed, deferring");
            return;
        }

        if let Err(error) = fs::remove_file(source) {
            debug!(path = %source.display(), %error, "receipt delete failed, deferring");
            return;
        }

        // Extraction only after the delete succeeded: up to this point
        // the source is untouched and the cycle can be re-run without
        // duplicate side effects.
        match extract::extract(&parsed) {
            Ok(record) => {
                info!(
                    message_id = %record.message_id,
                    status = %record.status_info,
                    "receipt reconciled"
                );
                self.log.append(record);
            }
            Err(error) => self.observer.on_error(error),
        }
    }
}
