// File: crates/chart-data/src/error.rs
// Summary: Error types for the point store, extrema tracker, series, and candles.

use thiserror::Error;

/// Failures reported by [`crate::store::PointStore`].
///
/// Every variant is returned before the store is touched, so the caller can
/// retry with corrected input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("timestamp {timestamp} is not after the last stored timestamp {last}")]
    OutOfOrder { timestamp: f64, last: f64 },
    #[error("timestamp {0} is not finite")]
    NonFiniteTimestamp(f64),
    #[error("cannot change date on existing point (stored {stored}, given {given})")]
    DateChanged { stored: f64, given: f64 },
    #[error("ordinal {ordinal} out of range (len {len})")]
    OutOfRange { ordinal: usize, len: usize },
    #[error("interior removal disallowed (ordinal {ordinal}); only the oldest point can be removed")]
    InteriorRemoval { ordinal: usize },
    #[error("store is empty")]
    Empty,
    #[error("timestamp lookup requires a date-indexed store")]
    NotIndexed,
}

/// Failures reported by [`crate::extrema::ExtremaTracker`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtremaError {
    #[error("window capacity must be a power of two, got {0}")]
    InvalidCapacity(usize),
    #[error("window of {window} points exceeds max_points {max_points}")]
    WindowExceedsMaxPoints { window: usize, max_points: usize },
    #[error("min/max requested on an empty tracker")]
    Empty,
}

/// OHLC sanity failures from [`crate::types::Candle::try_new`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleError {
    #[error("low above min(open,close)")]
    LowAboveBody,
    #[error("high below max(open,close)")]
    HighBelowBody,
    #[error("low above high")]
    LowAboveHigh,
}

/// Either half of a failed series build.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Window(#[from] ExtremaError),
}
