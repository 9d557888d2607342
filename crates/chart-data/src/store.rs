// File: crates/chart-data/src/store.rs
// Summary: Chronologically ordered, append-mostly point store with a timestamp index.
// Notes:
// - Only the oldest point can be removed. Evictions bump `offset` instead of
//   rewriting the index, so index entries keep the absolute ordinal assigned
//   at append time and are translated back with `ordinal - offset`.
// - Interior deletion would need the index rebuilt as an ordered map.

use std::collections::VecDeque;
use std::ops::Range;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::types::{days_from_datetime, timestamp_less, timestamps_equal, Timed};

#[derive(Clone, Copy, Debug, PartialEq)]
struct IndexEntry {
    timestamp: f64,
    ordinal: usize, // absolute, never reused
}

/// Append-ordered point sequence with optional date index.
#[derive(Clone, Debug)]
pub struct PointStore<P> {
    points: VecDeque<P>,
    index: Option<VecDeque<IndexEntry>>,
    offset: usize,
    max_points: Option<usize>,
}

impl<P: Timed> Default for PointStore<P> {
    fn default() -> Self { Self::with_config(StoreConfig::default()) }
}

impl<P: Timed> PointStore<P> {
    /// Store that maintains the timestamp index.
    pub fn indexed() -> Self {
        Self::with_config(StoreConfig { indexed: true, max_points: None })
    }

    /// Plain sequence without ordering checks or date lookups.
    pub fn unindexed() -> Self {
        Self::with_config(StoreConfig { indexed: false, max_points: None })
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            points: VecDeque::new(),
            index: config.indexed.then(VecDeque::new),
            offset: 0,
            max_points: config.max_points,
        }
    }

    pub fn len(&self) -> usize { self.points.len() }
    pub fn is_empty(&self) -> bool { self.points.is_empty() }
    pub fn is_indexed(&self) -> bool { self.index.is_some() }

    /// Number of points evicted from the head since the last `clear`.
    pub fn offset(&self) -> usize { self.offset }

    /// Absolute insertion ordinal of the point currently at `ordinal`.
    pub fn absolute_ordinal(&self, ordinal: usize) -> usize { ordinal + self.offset }

    pub fn first(&self) -> Option<&P> { self.points.front() }
    pub fn last(&self) -> Option<&P> { self.points.back() }
    pub fn iter(&self) -> impl Iterator<Item = &P> + '_ { self.points.iter() }

    /// Append a point. On an indexed store the timestamp must be finite and
    /// strictly after the last one; otherwise the store is left unchanged.
    pub fn append(&mut self, point: P) -> Result<usize, StoreError> {
        let timestamp = point.timestamp();
        if let Some(index) = self.index.as_mut() {
            if !timestamp.is_finite() {
                debug!(timestamp, "rejecting append: non-finite timestamp");
                return Err(StoreError::NonFiniteTimestamp(timestamp));
            }
            if let Some(last) = index.back() {
                if !timestamp_less(last.timestamp, timestamp) {
                    debug!(timestamp, last = last.timestamp, "rejecting append: out of order");
                    return Err(StoreError::OutOfOrder { timestamp, last: last.timestamp });
                }
            }
            index.push_back(IndexEntry { timestamp, ordinal: self.offset + self.points.len() });
        }
        self.points.push_back(point);

        if let Some(max) = self.max_points {
            // the newest point always stays, so 0 behaves like 1
            while self.points.len() > max.max(1) {
                self.evict_head();
            }
        }
        Ok(self.points.len() - 1)
    }

    /// Point at the current (post-eviction) ordinal.
    pub fn get(&self, ordinal: usize) -> Result<&P, StoreError> {
        self.points
            .get(ordinal)
            .ok_or(StoreError::OutOfRange { ordinal, len: self.points.len() })
    }

    /// Ordinal of the first point whose timestamp is not less than `ts`
    /// (lower bound, epsilon tolerant). `Ok(None)` when `ts` is past every
    /// stored timestamp.
    pub fn lookup_by_timestamp(&self, ts: f64) -> Result<Option<usize>, StoreError> {
        let index = self.index.as_ref().ok_or(StoreError::NotIndexed)?;
        let pos = index.partition_point(|e| timestamp_less(e.timestamp, ts));
        Ok(index.get(pos).map(|e| e.ordinal - self.offset))
    }

    pub fn lookup_by_datetime(&self, dt: DateTime<Utc>) -> Result<Option<usize>, StoreError> {
        self.lookup_by_timestamp(days_from_datetime(dt))
    }

    /// Ordinals whose timestamps fall in `[t0, t1]`, both ends epsilon tolerant.
    pub fn range_by_timestamp(&self, t0: f64, t1: f64) -> Result<Range<usize>, StoreError> {
        let index = self.index.as_ref().ok_or(StoreError::NotIndexed)?;
        let start = index.partition_point(|e| timestamp_less(e.timestamp, t0));
        let end = index.partition_point(|e| !timestamp_less(t1, e.timestamp));
        Ok(start..end.max(start))
    }

    /// Remove the point at `ordinal`. Only the head (ordinal 0) may go.
    pub fn remove_at(&mut self, ordinal: usize) -> Result<P, StoreError> {
        if self.points.is_empty() {
            return Err(StoreError::Empty);
        }
        if ordinal >= self.points.len() {
            return Err(StoreError::OutOfRange { ordinal, len: self.points.len() });
        }
        if ordinal != 0 {
            debug!(ordinal, "rejecting interior removal");
            return Err(StoreError::InteriorRemoval { ordinal });
        }
        self.evict_head().ok_or(StoreError::Empty)
    }

    pub fn remove_oldest(&mut self) -> Result<P, StoreError> {
        self.remove_at(0)
    }

    /// Replace the point at `ordinal`; its timestamp must not change.
    pub fn replace_at(&mut self, ordinal: usize, point: P) -> Result<P, StoreError> {
        let len = self.points.len();
        let slot = self.points.get_mut(ordinal).ok_or(StoreError::OutOfRange { ordinal, len })?;
        let stored = slot.timestamp();
        let given = point.timestamp();
        if !timestamps_equal(stored, given) {
            debug!(ordinal, stored, given, "rejecting replace: date changed");
            return Err(StoreError::DateChanged { stored, given });
        }
        Ok(std::mem::replace(slot, point))
    }

    pub fn clear(&mut self) {
        self.points.clear();
        if let Some(index) = self.index.as_mut() {
            index.clear();
        }
        self.offset = 0;
    }

    fn evict_head(&mut self) -> Option<P> {
        let head = self.points.pop_front()?;
        if let Some(index) = self.index.as_mut() {
            index.pop_front();
        }
        self.offset += 1;
        trace!(offset = self.offset, "evicted oldest point");
        Some(head)
    }
}
