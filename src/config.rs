use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{archive, worker};
use crate::types::{RecipientId, SenderId};

/// Top-level courier configuration.
///
/// Loading this from disk (or wherever deployments keep it) is the
/// embedding application's job; the engine only consumes the value.
#[derive(Clone, Debug)]
pub struct CourierConfig {
    /// Participant id of the sending office, the prefix of every
    /// generated correlation id.
    pub sender_id: SenderId,
    /// Directory watched for outbound data files.
    pub outbox_dir: PathBuf,
    /// Directory populated with receipt documents by the exchange
    /// network's local delivery agent.
    pub receipts_dir: PathBuf,
    /// Archive location for dispatched data files.
    pub data_archive_dir: PathBuf,
    /// Archive location for reconciled receipt files.
    pub receipts_archive_dir: PathBuf,
    /// Recipients the office ships to; consumed by the presentation
    /// layer when grouping delivery status.
    pub recipient_ids: Vec<RecipientId>,
    /// Whether archived data-file copies are retained after dispatch.
    pub archive_data_files: bool,
    /// Outbox/receipt candidates handled per cycle.
    ///
    /// This is intentionally small: a stop request takes effect after at
    /// most `batch_size` items, regardless of backlog size.
    pub batch_size: usize,
    /// Pause between archive-copy attempts while an external writer is
    /// still flushing a source file.
    pub copy_retry_interval: Duration,
    /// Pause between dispatcher cycles when driven by `CycleWorker`.
    pub poll_interval: Duration,
}

impl Default for CourierConfig {
    fn default() -> Self {
        Self {
            sender_id: String::new(),
            outbox_dir: PathBuf::from("outbox"),
            receipts_dir: PathBuf::from("receipts"),
            data_archive_dir: PathBuf::from(archive::DEFAULT_DATA_DIR),
            receipts_archive_dir: PathBuf::from(archive::DEFAULT_RECEIPTS_DIR),
            recipient_ids: Vec::new(),
            archive_data_files: true,
            batch_size: worker::DEFAULT_BATCH_SIZE,
            copy_retry_interval: Duration::from_millis(worker::DEFAULT_COPY_RETRY_MILLIS),
            poll_interval: Duration::from_millis(worker::DEFAULT_POLL_INTERVAL_MILLIS),
        }
    }
}
