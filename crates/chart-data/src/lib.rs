// File: crates/chart-data/src/lib.rs
// Summary: Library entry point; exports the point store, extrema tracker, and candle series.

pub mod config;
pub mod error;
pub mod extrema;
pub mod series;
pub mod store;
pub mod types;

pub use config::{SeriesConfig, StoreConfig, DEFAULT_WINDOW};
pub use error::{CandleError, ExtremaError, SeriesError, StoreError};
pub use extrema::{ExtremaTracker, TotalOrder, WindowSeq};
pub use series::CandleSeries;
pub use store::PointStore;
pub use types::{Candle, Timed, TIMESTAMP_EPSILON};
