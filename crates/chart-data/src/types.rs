// File: crates/chart-data/src/types.rs
// Summary: Point model (Timed trait, Candle) and epsilon-tolerant timestamp helpers.

use chrono::{DateTime, Utc};

use crate::error::CandleError;

/// Tolerance for deciding that two timestamps denote the same instant.
/// Timestamps are days since the Unix epoch; 1e-9 days is under 0.1 ms.
pub const TIMESTAMP_EPSILON: f64 = 1e-9;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// A record positioned on the time axis.
pub trait Timed {
    /// Days since the Unix epoch.
    fn timestamp(&self) -> f64;
}

impl Timed for f64 {
    fn timestamp(&self) -> f64 { *self }
}

/// True when `a` and `b` are within [`TIMESTAMP_EPSILON`] of each other.
#[inline]
pub fn timestamps_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= TIMESTAMP_EPSILON
}

/// True when `a` lies strictly before `b` by more than the tolerance.
#[inline]
pub fn timestamp_less(a: f64, b: f64) -> bool {
    b - a > TIMESTAMP_EPSILON
}

/// Convert a UTC instant to fractional days since the epoch.
pub fn days_from_datetime(dt: DateTime<Utc>) -> f64 {
    dt.timestamp_millis() as f64 / MILLIS_PER_DAY
}

/// Convert fractional days back to a UTC instant (millisecond precision).
/// Returns `None` for non-finite input or instants chrono cannot represent.
pub fn datetime_from_days(days: f64) -> Option<DateTime<Utc>> {
    let ms = (days * MILLIS_PER_DAY).round();
    if !ms.is_finite() || ms < i64::MIN as f64 || ms > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(ms as i64)
}

/// One bar of market data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candle {
    pub t: f64, // days since epoch
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
    pub buy_volume: u64,
    pub sell_volume: u64,
}

impl Candle {
    /// Try to construct a candle enforcing OHLC invariants:
    /// l <= min(o,c) and h >= max(o,c), and l <= h.
    pub fn try_new(t: f64, o: f64, h: f64, l: f64, c: f64) -> Result<Self, CandleError> {
        let lo = o.min(c);
        let hi = o.max(c);
        if l > lo { return Err(CandleError::LowAboveBody); }
        if h < hi { return Err(CandleError::HighBelowBody); }
        if l > h { return Err(CandleError::LowAboveHigh); }
        Ok(Self { t, o, h, l, c, buy_volume: 0, sell_volume: 0 })
    }

    pub fn with_volume(mut self, buy: u64, sell: u64) -> Self {
        self.buy_volume = buy;
        self.sell_volume = sell;
        self
    }

    pub fn volume(&self) -> u64 { self.buy_volume.saturating_add(self.sell_volume) }

    pub fn datetime(&self) -> Option<DateTime<Utc>> { datetime_from_days(self.t) }
}

impl Timed for Candle {
    fn timestamp(&self) -> f64 { self.t }
}
