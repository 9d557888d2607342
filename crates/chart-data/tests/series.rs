// File: crates/chart-data/tests/series.rs
// Purpose: Candle series: visible range over the trailing window, cursor lookup, bounded streaming.

use anyhow::{ensure, Result};
use chart_data::{Candle, CandleSeries, ExtremaError, SeriesConfig, SeriesError, StoreError};

fn bar(t: f64, low: f64, high: f64) -> Candle {
    Candle::try_new(t, low, high, low, high).expect("valid candle")
}

fn brute_range(candles: &[Candle], window: usize) -> (f64, f64) {
    let tail = &candles[candles.len().saturating_sub(window)..];
    let lo = tail.iter().map(|c| c.l).fold(f64::INFINITY, f64::min);
    let hi = tail.iter().map(|c| c.h).fold(f64::NEG_INFINITY, f64::max);
    (lo, hi)
}

#[test]
fn visible_range_follows_window() {
    let mut series = CandleSeries::new(SeriesConfig::default().with_window(4)).expect("valid config");
    assert_eq!(series.visible_range(), None);

    let candles = [
        bar(1.0, 10.0, 12.0),
        bar(2.0, 8.0, 11.0),
        bar(3.0, 9.0, 15.0),
        bar(4.0, 11.0, 13.0),
        bar(5.0, 12.0, 14.0),
        bar(6.0, 12.5, 13.5),
    ];
    for (i, c) in candles.iter().enumerate() {
        series.push(*c).expect("in order");
        assert_eq!(series.visible_range(), Some(brute_range(&candles[..=i], 4)));
    }
    // window covers t=3..6: low 9, high 15
    assert_eq!(series.visible_range(), Some((9.0, 15.0)));
}

#[test]
fn rejected_push_leaves_series_unchanged() {
    let mut series = CandleSeries::new(SeriesConfig::default().with_window(2)).expect("valid config");
    series.push(bar(1.0, 5.0, 6.0)).expect("first");
    series.push(bar(2.0, 4.0, 7.0)).expect("second");

    let err = series.push(bar(2.0, 0.0, 100.0)).expect_err("duplicate timestamp");
    assert!(matches!(err, StoreError::OutOfOrder { .. }));
    assert_eq!(series.len(), 2);
    assert_eq!(series.visible_range(), Some((4.0, 7.0)));
}

#[test]
fn cursor_lookup_resolves_at_or_after() {
    let series = CandleSeries::from_candles(
        SeriesConfig::default(),
        (0..10).map(|i| bar(100.0 + i as f64, 1.0, 2.0)),
    )
    .expect("ordered candles");

    let (ordinal, candle) = series.candle_at_or_after(103.4).expect("indexed").expect("found");
    assert_eq!(ordinal, 4);
    assert_eq!(candle.t, 104.0);
    assert_eq!(series.candle_at_or_after(200.0), Ok(None));
    assert_eq!(series.candle_at(9).map(|c| c.t), Ok(109.0));
}

#[test]
fn invalid_window_is_a_config_error() {
    let err = CandleSeries::new(SeriesConfig::default().with_window(100)).expect_err("not a power of two");
    assert_eq!(err, ExtremaError::InvalidCapacity(100));
    assert_eq!(SeriesConfig::default().validate(), Ok(()));
}

#[test]
fn window_must_fit_in_bounded_store() {
    // a 4-candle window over a 2-candle store would report evicted lows/highs
    let err = CandleSeries::new(SeriesConfig::default().with_window(4).with_max_points(2)).expect_err("window too wide");
    assert_eq!(err, ExtremaError::WindowExceedsMaxPoints { window: 4, max_points: 2 });

    let zero = SeriesConfig::default().with_window(1).with_max_points(0);
    assert_eq!(zero.validate(), Err(ExtremaError::WindowExceedsMaxPoints { window: 1, max_points: 0 }));
    assert!(SeriesConfig::default().with_window(4).with_max_points(4).validate().is_ok());
}

#[test]
fn tight_bound_matches_window() -> Result<()> {
    let mut series = CandleSeries::new(SeriesConfig::default().with_window(2).with_max_points(2))?;
    series.push(bar(1.0, 0.0, 100.0))?;
    series.push(bar(2.0, 5.0, 6.0))?;
    series.push(bar(3.0, 5.0, 7.0))?;
    ensure!(series.len() == 2, "store keeps two candles");
    ensure!(series.visible_range() == Some((5.0, 7.0)), "evicted candle left the range");
    Ok(())
}

#[test]
fn from_candles_stops_at_first_rejection() {
    let candles = vec![bar(1.0, 1.0, 2.0), bar(3.0, 1.0, 2.0), bar(2.0, 1.0, 2.0)];
    let err = CandleSeries::from_candles(SeriesConfig::default(), candles).expect_err("out of order");
    assert!(matches!(err, SeriesError::Store(StoreError::OutOfOrder { .. })));
}

#[test]
fn bounded_series_stays_consistent() {
    let config = SeriesConfig::default().with_window(4).with_max_points(8);
    let mut series = CandleSeries::new(config).expect("valid config");
    let mut pushed = Vec::new();
    for i in 0..100 {
        let x = i as f64;
        let mid = (x * 0.7).sin() * 10.0 + 50.0;
        let c = bar(x, mid - 1.0 - (i % 3) as f64, mid + 1.0 + (i % 5) as f64);
        series.push(c).expect("in order");
        pushed.push(c);
        assert_eq!(series.visible_range(), Some(brute_range(&pushed, 4)));
    }
    assert_eq!(series.len(), 8);
    assert_eq!(series.store().offset(), 92);
    assert_eq!(series.candle_at(0).map(|c| c.t), Ok(92.0));
    assert_eq!(series.candle_at_or_after(50.0).map(|r| r.map(|(i, _)| i)), Ok(Some(0)));
}

#[test]
fn update_and_clear() {
    let mut series = CandleSeries::new(SeriesConfig::default()).expect("valid config");
    series.push(bar(1.0, 1.0, 2.0)).expect("push");
    series.push(bar(2.0, 1.0, 2.0)).expect("push");

    let old = series.update(1, bar(2.0, 1.5, 3.0)).expect("same date");
    assert_eq!(old.h, 2.0);
    assert_eq!(series.candle_at(1).map(|c| c.h), Ok(3.0));
    assert_eq!(series.visible_range(), Some((1.0, 3.0)));
    assert!(matches!(series.update(1, bar(5.0, 1.0, 2.0)), Err(StoreError::DateChanged { .. })));

    series.clear();
    assert!(series.is_empty());
    assert_eq!(series.visible_range(), None);
    series.push(bar(0.5, 3.0, 4.0)).expect("fresh after clear");
    assert_eq!(series.visible_range(), Some((3.0, 4.0)));
}

#[test]
fn edits_inside_window_move_the_range() -> Result<()> {
    let mut series = CandleSeries::new(SeriesConfig::default().with_window(4))?;
    for i in 0..6 {
        series.push(bar(i as f64, 10.0, 20.0))?;
    }

    // ordinal 3 is inside the trailing window (2..=5)
    series.update(3, Candle::try_new(3.0, 10.0, 25.0, 4.0, 20.0)?)?;
    ensure!(series.visible_range() == Some((4.0, 25.0)), "raised high and lowered low are visible");

    // ordinal 0 is outside it
    series.update(0, Candle::try_new(0.0, 10.0, 90.0, 1.0, 20.0)?)?;
    ensure!(series.visible_range() == Some((4.0, 25.0)), "edits before the window are ignored");

    // shrinking the outlier back restores the original range
    series.update(3, bar(3.0, 10.0, 20.0))?;
    ensure!(series.visible_range() == Some((10.0, 20.0)), "range shrinks after the edit is undone");

    // further pushes continue from the rebuilt trackers
    series.push(bar(6.0, 9.0, 21.0))?;
    ensure!(series.visible_range() == Some((9.0, 21.0)), "push after edit");
    Ok(())
}

#[test]
fn edits_survive_compaction() -> Result<()> {
    let mut series = CandleSeries::new(SeriesConfig::default().with_window(2).with_max_points(2))?;
    let mut pushed = Vec::new();
    for i in 0..20 {
        let c = bar(i as f64, 50.0 - (i % 4) as f64, 60.0 + (i % 3) as f64);
        series.push(c)?;
        pushed.push(c);
        if i % 5 == 4 {
            let last = series.len() - 1;
            let edited = bar(i as f64, 1.0, 99.0);
            series.update(last, edited)?;
            *pushed.last_mut().expect("just pushed") = edited;
        }
        ensure!(series.visible_range() == Some(brute_range(&pushed, 2)), "range after push {i}");
    }
    Ok(())
}
