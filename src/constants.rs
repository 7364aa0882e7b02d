/// Constants used by correlation-id generation and trimming.
pub mod correlation {
    /// `chrono` format string for the sequence token embedded in a
    /// correlation id (for example `20191112-1334-51-935`).
    pub const SEQUENCE_TOKEN_FORMAT: &str = "%Y%m%d-%H%M-%S-%3f";
    /// Separator marker introducing the recipient suffix of a message id
    /// (for example the `-E00` tail of `…-51-935-E00`).
    pub const RECIPIENT_SUFFIX_MARKER: &str = "-E";
    /// Pause between stamp attempts while waiting for the clock to yield
    /// an unissued token.
    pub const STAMP_RETRY_MILLIS: u64 = 2;
}

/// Constants used by receipt parsing and field extraction.
pub mod receipt {
    /// Tag-name marker matched (by substring) for the message id element.
    pub const MARKER_MESSAGE_ID: &str = "messageId";
    /// Tag-name marker matched (by substring) for the status element.
    pub const MARKER_STATUS_INFO: &str = "statusInfo";
    /// Sentinel text recorded when a marker element is absent.
    pub const FIELD_NOT_AVAILABLE: &str = "Not available";
}

/// Constants used by archive naming and locations.
pub mod archive {
    /// Filename prefix for archived data files
    /// (`data_<correlation_id>_<original_name>`).
    pub const DATA_FILE_PREFIX: &str = "data_";
    /// Default archive directory for dispatched data files.
    pub const DEFAULT_DATA_DIR: &str = "archive/data";
    /// Default archive directory for reconciled receipt files.
    pub const DEFAULT_RECEIPTS_DIR: &str = "archive/receipts";
}

/// Constants used by worker pacing and cycle batching.
pub mod worker {
    /// Outbox/receipt candidates handled per cycle unless configured
    /// otherwise. Kept at one so a stop request takes effect after at
    /// most a single item, regardless of backlog size.
    pub const DEFAULT_BATCH_SIZE: usize = 1;
    /// Pause between archive-copy attempts while an external writer is
    /// still flushing the source file.
    pub const DEFAULT_COPY_RETRY_MILLIS: u64 = 25;
    /// Pause between dispatcher cycles when driven by `CycleWorker`.
    pub const DEFAULT_POLL_INTERVAL_MILLIS: u64 = 500;
}
