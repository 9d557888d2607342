// File: crates/chart-data/src/series.rs
// Summary: Candle series combining the ordered point store with windowed low/high extrema.
// Notes:
// - Lows and highs are tracked in their own `Vec<f64>` so the visible vertical
//   range is available in O(1) after every push.
// - With `max_points` set, the low/high sequences are periodically cut back
//   to the last `window` values so they stay bounded like the store.
// - `max_points >= window` is enforced by the config, so the store always holds
//   every candle inside the window and the trackers can be rebuilt from it.
// - The store decides whether a candle is accepted; the trackers only see
//   candles the store kept.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::SeriesConfig;
use crate::error::{ExtremaError, SeriesError, StoreError};
use crate::extrema::ExtremaTracker;
use crate::store::PointStore;
use crate::types::{days_from_datetime, Candle};

// Bounded series rebuild their extrema sequences once they reach this
// multiple of max(max_points, window).
const COMPACT_FACTOR: usize = 2;

#[derive(Debug)]
pub struct CandleSeries {
    store: PointStore<Candle>,
    lows: ExtremaTracker<f64>,
    highs: ExtremaTracker<f64>,
    config: SeriesConfig,
}

impl CandleSeries {
    pub fn new(config: SeriesConfig) -> Result<Self, ExtremaError> {
        config.validate()?;
        Ok(Self {
            store: PointStore::with_config(config.store),
            lows: ExtremaTracker::with_window(Vec::new(), config.window),
            highs: ExtremaTracker::with_window(Vec::new(), config.window),
            config,
        })
    }

    /// Build a series from candles already in chronological order.
    /// Stops at the first candle the store rejects.
    pub fn from_candles(config: SeriesConfig, candles: impl IntoIterator<Item = Candle>) -> Result<Self, SeriesError> {
        let mut series = Self::new(config)?;
        for candle in candles {
            series.push(candle)?;
        }
        Ok(series)
    }

    /// Append a candle; returns its ordinal.
    pub fn push(&mut self, candle: Candle) -> Result<usize, StoreError> {
        let ordinal = self.store.append(candle)?;
        self.lows.add(candle.l);
        self.highs.add(candle.h);
        if let Some(max_points) = self.config.store.max_points {
            let limit = max_points.max(self.config.window).saturating_mul(COMPACT_FACTOR);
            if self.lows.len() >= limit {
                self.reprime();
                debug!(kept = self.lows.len(), "compacted extrema sequences");
            }
        }
        Ok(ordinal)
    }

    /// `(min low, max high)` over the last `window` candles pushed.
    pub fn visible_range(&self) -> Option<(f64, f64)> {
        match (self.lows.min(), self.highs.max()) {
            (Ok(lo), Ok(hi)) => Some((*lo, *hi)),
            _ => None,
        }
    }

    pub fn candle_at(&self, ordinal: usize) -> Result<&Candle, StoreError> {
        self.store.get(ordinal)
    }

    /// First candle at or after `ts` (cursor / tooltip resolution).
    pub fn candle_at_or_after(&self, ts: f64) -> Result<Option<(usize, &Candle)>, StoreError> {
        match self.store.lookup_by_timestamp(ts)? {
            Some(ordinal) => Ok(Some((ordinal, self.store.get(ordinal)?))),
            None => Ok(None),
        }
    }

    pub fn candle_at_or_after_datetime(&self, dt: DateTime<Utc>) -> Result<Option<(usize, &Candle)>, StoreError> {
        self.candle_at_or_after(days_from_datetime(dt))
    }

    /// Edit a candle in place (same timestamp). An edit inside the trailing
    /// window rebuilds the extrema so `visible_range` reflects it; older
    /// candles are outside the range and leave the trackers alone.
    pub fn update(&mut self, ordinal: usize, candle: Candle) -> Result<Candle, StoreError> {
        let old = self.store.replace_at(ordinal, candle)?;
        if ordinal + self.config.window >= self.store.len() {
            self.reprime();
            debug!(ordinal, "rebuilt extrema after edit");
        }
        Ok(old)
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.lows.clear();
        self.highs.clear();
    }

    pub fn len(&self) -> usize { self.store.len() }
    pub fn is_empty(&self) -> bool { self.store.is_empty() }
    pub fn store(&self) -> &PointStore<Candle> { &self.store }
    pub fn config(&self) -> &SeriesConfig { &self.config }

    /// Rebuild both trackers from the last `window` candles in the store.
    fn reprime(&mut self) {
        let window = self.config.window;
        let skip = self.store.len().saturating_sub(window);
        let lows = self.store.iter().skip(skip).map(|c| c.l).collect();
        let highs = self.store.iter().skip(skip).map(|c| c.h).collect();
        self.lows = ExtremaTracker::with_window(lows, window);
        self.highs = ExtremaTracker::with_window(highs, window);
    }
}
