// File: crates/chart-data/src/config.rs
// Summary: Construction options for point stores and chart series.

use crate::error::ExtremaError;

/// Default extrema window for a chart series (points).
pub const DEFAULT_WINDOW: usize = 256;

/// Point store options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maintain the timestamp index; enables date lookups and enforces
    /// strictly increasing timestamps on append.
    pub indexed: bool,
    /// Evict the oldest point once the store grows past this many points.
    /// A bounded store always keeps the newest point, so `Some(0)` holds one
    /// point like `Some(1)`; [`SeriesConfig::validate`] rejects it outright.
    pub max_points: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { indexed: true, max_points: None }
    }
}

/// Chart series options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeriesConfig {
    /// Number of trailing points covered by the visible range; power of two.
    pub window: usize,
    pub store: StoreConfig,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self { window: DEFAULT_WINDOW, store: StoreConfig::default() }
    }
}

impl SeriesConfig {
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.store.max_points = Some(max_points);
        self
    }

    /// Check the window precondition before any allocation happens. A bounded
    /// store must hold at least one full window, otherwise the visible range
    /// would cover candles the store already evicted.
    pub fn validate(&self) -> Result<(), ExtremaError> {
        if !self.window.is_power_of_two() {
            return Err(ExtremaError::InvalidCapacity(self.window));
        }
        match self.store.max_points {
            Some(max_points) if max_points < self.window => {
                Err(ExtremaError::WindowExceedsMaxPoints { window: self.window, max_points })
            }
            _ => Ok(()),
        }
    }
}
