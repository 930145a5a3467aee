//! Error types.

use thiserror::Error;

/// Rejected predictor configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("the number of address contexts must be non-zero")]
    ZeroContexts,

    #[error("the number of history rows must be non-zero")]
    ZeroRows,

    #[error("history length must be non-zero")]
    ZeroHistory,

    #[error("address history capacity must be non-zero")]
    ZeroCapacity,

    #[error("gshare table bits must be in 1..={max} (got {got})")]
    TableBits { got: usize, max: usize },

    #[error("gshare history length must be in 1..={table_bits} (got {got})")]
    HistoryLength { got: usize, table_bits: usize },

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Violations of the predict/update protocol.
///
/// Every call to `predict` must be followed by exactly one call to `update`
/// before the next branch is predicted.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PredictorError {
    #[error("update called without a pending prediction")]
    UpdateWithoutPredict,

    #[error("predict called while the branch at {pc:#x} is still unresolved")]
    PredictPending { pc: usize },

    #[error("prediction does not belong to the pending branch at {pc:#x}")]
    MismatchedPrediction { pc: usize },
}

/// Failure to load a branch trace.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("failed to read trace: {0}")]
    Io(#[from] std::io::Error),

    #[error("trace length {len} is not a multiple of the {record_size}-byte record size")]
    Truncated { len: usize, record_size: usize },

    #[error("record {index} has invalid branch flags {flags:#07b}")]
    InvalidFlags { index: usize, flags: u32 },
}
