#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Archive naming and filesystem primitives (shallow scans, retrying copies).
pub mod archive;
/// Courier configuration types.
pub mod config;
/// Centralized constants used across dispatch, reconciliation, and extraction.
pub mod constants;
/// Collision-free correlation-id generation.
pub mod correlation;
/// Outbound dispatch cycle and the per-file processor seam.
pub mod dispatch;
/// Receipt document parsing and field extraction.
pub mod extract;
/// Aggregate delivery metrics helpers.
pub mod metrics;
/// Observer capability trait and off-thread callback delivery.
pub mod observer;
/// Receipt records and the shared receipt log.
pub mod receipt;
/// Receipt reconciliation cycle.
pub mod reconcile;
/// Shared type aliases.
pub mod types;
/// Periodic cycle driver.
pub mod worker;

mod errors;

pub use config::CourierConfig;
pub use correlation::CorrelationStamper;
pub use dispatch::{OutboundDispatcher, OutboundProcessor};
pub use errors::CourierError;
pub use extract::{extract, parse_receipt, ParsedReceipt};
pub use metrics::{delivery_tally, DeliveryTally, StatusShare};
pub use observer::{CourierObserver, ObserverPump, RecordingObserver};
pub use receipt::{ReceiptLog, ReceiptRecord};
pub use reconcile::ReceiptReconciler;
pub use types::{
    CorrelationId, ElementText, RecipientId, SenderId, SequenceToken, StatusText, TagName,
};
pub use worker::CycleWorker;
