// File: crates/chart-data/src/extrema.rs
// Summary: Sliding-window running min/max over a growable sequence using monotonic deques.
// Notes:
// - The newest element is always an implicit candidate. Each `add` compares the
//   new value with the previous element and files that previous element into
//   whichever deque can still use it, so every index enters each deque at most
//   once and leaves at most once (amortized O(1) per add).
// - Deques hold indices into the backing sequence, never values.
// - Ties resolve to the earliest index in the window for both min and max.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::marker::PhantomData;

use tracing::trace;

use crate::error::ExtremaError;

/// Explicit total ordering used by the tracker.
///
/// Floats order by IEEE 754 `total_cmp`: `-0.0 < 0.0` and NaN sorts above
/// every number, so a NaN in the window becomes its maximum.
pub trait TotalOrder {
    fn order(&self, other: &Self) -> Ordering;
}

macro_rules! impl_total_order_via_ord {
    ($($t:ty),* $(,)?) => {
        $(impl TotalOrder for $t {
            #[inline]
            fn order(&self, other: &Self) -> Ordering { Ord::cmp(self, other) }
        })*
    };
}

impl_total_order_via_ord!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, char, bool);

impl TotalOrder for f32 {
    #[inline]
    fn order(&self, other: &Self) -> Ordering { self.total_cmp(other) }
}

impl TotalOrder for f64 {
    #[inline]
    fn order(&self, other: &Self) -> Ordering { self.total_cmp(other) }
}

/// Growable, indexable sequence the tracker appends into.
pub trait WindowSeq<T> {
    fn len(&self) -> usize;
    fn at(&self, index: usize) -> Option<&T>;
    fn push(&mut self, value: T);
    fn clear(&mut self);
    fn is_empty(&self) -> bool { self.len() == 0 }
}

impl<T> WindowSeq<T> for Vec<T> {
    fn len(&self) -> usize { Vec::len(self) }
    fn at(&self, index: usize) -> Option<&T> { self.get(index) }
    fn push(&mut self, value: T) { Vec::push(self, value) }
    fn clear(&mut self) { Vec::clear(self) }
}

impl<T> WindowSeq<T> for VecDeque<T> {
    fn len(&self) -> usize { VecDeque::len(self) }
    fn at(&self, index: usize) -> Option<&T> { self.get(index) }
    fn push(&mut self, value: T) { self.push_back(value) }
    fn clear(&mut self) { VecDeque::clear(self) }
}

/// Borrowed sequences: the tracker appends through the reference without owning it.
impl<T, S: WindowSeq<T> + ?Sized> WindowSeq<T> for &mut S {
    fn len(&self) -> usize { (**self).len() }
    fn at(&self, index: usize) -> Option<&T> { (**self).at(index) }
    fn push(&mut self, value: T) { (**self).push(value) }
    fn clear(&mut self) { (**self).clear() }
}

/// Ring of indices bounded by a power-of-two capacity. Slots start small and
/// double on demand, so the backing storage never exceeds the number of live
/// candidates rounded up to a power of two. Slots are addressed with `& mask`.
#[derive(Clone, Debug)]
struct IndexRing {
    slots: Box<[usize]>,
    head: usize,
    len: usize,
    mask: usize,
    capacity: usize,
}

const INITIAL_SLOTS: usize = 16;

impl IndexRing {
    fn new(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two());
        let n = capacity.min(INITIAL_SLOTS);
        Self { slots: vec![0; n].into_boxed_slice(), head: 0, len: 0, mask: n - 1, capacity }
    }

    #[cfg(test)]
    fn len(&self) -> usize { self.len }

    fn front(&self) -> Option<usize> {
        (self.len > 0).then(|| self.slots[self.head])
    }

    fn back(&self) -> Option<usize> {
        (self.len > 0).then(|| self.slots[(self.head + self.len - 1) & self.mask])
    }

    fn push_back(&mut self, index: usize) {
        if self.len == self.slots.len() {
            self.grow();
        }
        self.slots[(self.head + self.len) & self.mask] = index;
        self.len += 1;
    }

    fn pop_back(&mut self) -> Option<usize> {
        let back = self.back()?;
        self.len -= 1;
        Some(back)
    }

    fn pop_front(&mut self) -> Option<usize> {
        let front = self.front()?;
        self.head = (self.head + 1) & self.mask;
        self.len -= 1;
        Some(front)
    }

    fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Double the slot count (up to `capacity`), unwrapping live entries to the front.
    fn grow(&mut self) {
        debug_assert!(self.slots.len() < self.capacity, "candidate ring overflow");
        let n = (self.slots.len() * 2).min(self.capacity);
        let mut next = Vec::with_capacity(n);
        next.extend((0..self.len).map(|i| self.slots[(self.head + i) & self.mask]));
        next.resize(n, 0);
        self.slots = next.into_boxed_slice();
        self.head = 0;
        self.mask = n - 1;
    }
}

/// Running min/max over the last `window` elements appended to `S`.
///
/// `S` may be owned (`Vec<T>`) or a borrow (`&mut Vec<T>`); either way the
/// tracker is the only writer while it exists, which keeps its candidate
/// indices valid.
#[derive(Debug)]
pub struct ExtremaTracker<T, S = Vec<T>> {
    seq: S,
    window: usize,
    // values non-decreasing front to back
    min_candidates: IndexRing,
    // values non-increasing front to back
    max_candidates: IndexRing,
    min_index: usize,
    max_index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T: TotalOrder, S: WindowSeq<T>> ExtremaTracker<T, S> {
    /// Attach a tracker to `seq` with a power-of-two `window`.
    /// Existing elements are replayed so the last `window` of them are covered.
    pub fn new(seq: S, window: usize) -> Result<Self, ExtremaError> {
        if !window.is_power_of_two() {
            return Err(ExtremaError::InvalidCapacity(window));
        }
        Ok(Self::with_window(seq, window))
    }

    /// Infallible construction for callers that already checked `window`.
    pub(crate) fn with_window(seq: S, window: usize) -> Self {
        debug_assert!(window.is_power_of_two());
        let mut tracker = Self {
            seq,
            window,
            min_candidates: IndexRing::new(window),
            max_candidates: IndexRing::new(window),
            min_index: 0,
            max_index: 0,
            _marker: PhantomData,
        };
        let len = tracker.seq.len();
        let start = len.saturating_sub(window);
        for newest in start..len {
            tracker.advance(newest, newest == start);
        }
        tracker
    }

    /// Append `value` to the backing sequence and update the extrema.
    pub fn add(&mut self, value: T) {
        self.seq.push(value);
        let newest = self.seq.len() - 1;
        self.advance(newest, newest == 0);
    }

    pub fn min(&self) -> Result<&T, ExtremaError> {
        self.seq.at(self.min_index).ok_or(ExtremaError::Empty)
    }

    pub fn max(&self) -> Result<&T, ExtremaError> {
        self.seq.at(self.max_index).ok_or(ExtremaError::Empty)
    }

    /// `(min, max)` over the current window.
    pub fn range(&self) -> Result<(&T, &T), ExtremaError> {
        Ok((self.min()?, self.max()?))
    }

    /// Backing-sequence index of the current minimum.
    pub fn min_index(&self) -> Result<usize, ExtremaError> {
        if self.seq.is_empty() { Err(ExtremaError::Empty) } else { Ok(self.min_index) }
    }

    pub fn max_index(&self) -> Result<usize, ExtremaError> {
        if self.seq.is_empty() { Err(ExtremaError::Empty) } else { Ok(self.max_index) }
    }

    /// Empty the backing sequence and forget every candidate.
    pub fn clear(&mut self) {
        self.seq.clear();
        self.min_candidates.clear();
        self.max_candidates.clear();
        self.min_index = 0;
        self.max_index = 0;
    }

    pub fn len(&self) -> usize { self.seq.len() }
    pub fn is_empty(&self) -> bool { self.seq.is_empty() }
    pub fn window(&self) -> usize { self.window }
    pub fn sequence(&self) -> &S { &self.seq }
    pub fn into_inner(self) -> S { self.seq }

    /// Fold element `newest` into the candidate deques.
    fn advance(&mut self, newest: usize, first: bool) {
        if first {
            self.min_candidates.clear();
            self.max_candidates.clear();
            self.min_index = newest;
            self.max_index = newest;
            return;
        }
        let prev = newest - 1;
        let (Some(value), Some(previous)) = (self.seq.at(newest), self.seq.at(prev)) else {
            return;
        };

        match value.order(previous) {
            Ordering::Greater => {
                // prev can no longer be the max while `value` is in the window
                self.min_candidates.push_back(prev);
                prune_back(&mut self.max_candidates, &self.seq, value, Ordering::Less);
            }
            Ordering::Less => {
                self.max_candidates.push_back(prev);
                prune_back(&mut self.min_candidates, &self.seq, value, Ordering::Greater);
            }
            Ordering::Equal => {
                // keep the older index for both so ties go to the earliest
                self.min_candidates.push_back(prev);
                self.max_candidates.push_back(prev);
            }
        }

        if retire_expired(&mut self.min_candidates, newest, self.window) == Some(self.min_index) {
            trace!(index = self.min_index, "window minimum aged out");
        }
        if retire_expired(&mut self.max_candidates, newest, self.window) == Some(self.max_index) {
            trace!(index = self.max_index, "window maximum aged out");
        }

        self.min_index = self.min_candidates.front().unwrap_or(newest);
        self.max_index = self.max_candidates.front().unwrap_or(newest);
    }
}

/// Pop candidates from the back while they compare `worse` than `value`.
fn prune_back<T: TotalOrder, S: WindowSeq<T>>(ring: &mut IndexRing, seq: &S, value: &T, worse: Ordering) {
    while let Some(back) = ring.back() {
        match seq.at(back) {
            Some(candidate) if candidate.order(value) == worse => {
                ring.pop_back();
            }
            _ => break,
        }
    }
}

/// Drop the front candidate once it falls out of `[newest + 1 - window, newest]`.
fn retire_expired(ring: &mut IndexRing, newest: usize, window: usize) -> Option<usize> {
    let front = ring.front()?;
    if front + window <= newest {
        ring.pop_front()
    } else {
        None
    }
}
