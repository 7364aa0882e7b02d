use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::CorrelationId;

/// Error type for dispatch, reconciliation, and extraction failures.
#[derive(Debug, Error)]
pub enum CourierError {
    #[error("receipt '{path}' is not well-formed: {reason}")]
    MalformedReceipt { path: PathBuf, reason: String },
    #[error("message id '{id}' carries no recipient suffix marker '{marker}'")]
    MissingSuffixMarker { id: String, marker: &'static str },
    #[error("processing of dispatched file '{correlation_id}' failed: {reason}")]
    Processing {
        correlation_id: CorrelationId,
        reason: String,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}
