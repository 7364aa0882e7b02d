use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::archive;
use crate::config::CourierConfig;
use crate::correlation::CorrelationStamper;
use crate::errors::CourierError;
use crate::observer::CourierObserver;
use crate::reconcile::ReceiptReconciler;
use crate::types::CorrelationId;

/// Per-file hand-off to the exchange network.
///
/// Implementations consume the outbox file (a production processor
/// builds the network envelope and moves the file into the exchange
/// agent's own outbox). A file left behind by a failed
/// implementation is picked up again on a later cycle under a fresh
/// correlation id.
pub trait OutboundProcessor: Send + Sync {
    /// Ship one file under the given correlation id.
    fn process(&self, correlation_id: &CorrelationId, file: &Path) -> Result<(), CourierError>;
}

/// Drains the outbox one batch per cycle: assigns correlation ids,
/// archives each candidate, hands it to the [`OutboundProcessor`], and
/// triggers receipt reconciliation.
pub struct OutboundDispatcher {
    config: CourierConfig,
    stamper: CorrelationStamper,
    processor: Arc<dyn OutboundProcessor>,
    reconciler: Arc<ReceiptReconciler>,
    observer: Arc<dyn CourierObserver>,
    cycle_lock: Mutex<()>,
}

impl OutboundDispatcher {
    /// Build a dispatcher over the configured outbox.
    pub fn new(
        config: CourierConfig,
        processor: Arc<dyn OutboundProcessor>,
        reconciler: Arc<ReceiptReconciler>,
        observer: Arc<dyn CourierObserver>,
    ) -> Self {
        Self {
            config,
            stamper: CorrelationStamper::new(),
            processor,
            reconciler,
            observer,
            cycle_lock: Mutex::new(()),
        }
    }

    /// Number of correlation ids issued so far.
    pub fn dispatched_count(&self) -> usize {
        self.stamper.issued_count()
    }

    /// Run one dispatch cycle.
    ///
    /// At most `batch_size` outbox entries are considered (directory
    /// entries are skipped outright, never descended or removed), and
    /// reconciliation runs after every candidate plus once more at the
    /// end of the cycle, so receipts keep draining during a large
    /// backlog and on an empty outbox alike.
    pub fn run_cycle(&self) -> Result<(), CourierError> {
        let _guard = self.cycle_lock.lock().expect("dispatcher cycle lock poisoned");
        fs::create_dir_all(&self.config.data_archive_dir)?;

        let entries = archive::scan_shallow(&self.config.outbox_dir);
        for candidate in entries.iter().take(self.config.batch_size.max(1)) {
            if candidate.is_dir() {
                debug!(path = %candidate.display(), "skipping directory entry in outbox");
            } else {
                self.dispatch_file(candidate);
            }
            self.reconciler.run_cycle()?;
        }

        self.reconciler.run_cycle()
    }

    fn dispatch_file(&self, source: &Path) {
        let correlation_id = self.stamper.correlation_id(&self.config.sender_id);
        let archived = self
            .config
            .data_archive_dir
            .join(archive::data_archive_name(&correlation_id, source));

        // The copy happens even when archiving is disabled: retrying
        // until the file is copyable is how the dispatcher waits for an
        // external writer that is still flushing it. Only once the copy
        // has succeeded is the file known to be complete.
        let copied = archive::copy_waiting_for_writer(
            source,
            &archived,
            self.config.copy_retry_interval,
        );
        if !copied {
            debug!(
                %correlation_id,
                path = %source.display(),
                "outbox file vanished before it could be archived"
            );
        }

        if !self.config.archive_data_files {
            if let Err(error) = archive::remove_if_exists(&archived) {
                warn!(%correlation_id, %error, "could not discard archived copy");
            }
        }

        match self.processor.process(&correlation_id, source) {
            Ok(()) => {
                info!(%correlation_id, path = %source.display(), "file processed");
            }
            Err(error) => {
                self.observer.on_error(CourierError::Processing {
                    correlation_id,
                    reason: error.to_string(),
                });
            }
        }
    }
}
