// File: crates/chart-data/tests/types.rs
// Purpose: Candle invariants and day-based timestamp conversions.

use chart_data::types::{datetime_from_days, days_from_datetime, timestamp_less, timestamps_equal};
use chart_data::{Candle, CandleError, TIMESTAMP_EPSILON};
use chrono::{TimeZone, Utc};

#[test]
fn candle_rejects_inconsistent_ohlc() {
    assert_eq!(Candle::try_new(0.0, 2.0, 3.0, 2.5, 2.8).err(), Some(CandleError::LowAboveBody));
    assert_eq!(Candle::try_new(0.0, 2.0, 2.5, 1.0, 2.8).err(), Some(CandleError::HighBelowBody));
    let c = Candle::try_new(0.0, 2.0, 3.0, 1.0, 2.5).expect("valid").with_volume(40, 2);
    assert_eq!(c.volume(), 42);
}

#[test]
fn epsilon_comparisons() {
    assert!(timestamps_equal(1.0, 1.0 + TIMESTAMP_EPSILON / 2.0));
    assert!(!timestamps_equal(1.0, 1.0 + TIMESTAMP_EPSILON * 10.0));
    assert!(timestamp_less(1.0, 1.0 + TIMESTAMP_EPSILON * 10.0));
    assert!(!timestamp_less(1.0, 1.0 + TIMESTAMP_EPSILON / 2.0));
    assert!(!timestamp_less(2.0, 1.0));
    assert!(!timestamp_less(f64::NAN, 1.0));
}

#[test]
fn days_round_trip_through_chrono() {
    let dt = Utc.with_ymd_and_hms(2023, 9, 13, 6, 0, 0).single().expect("valid date");
    let days = days_from_datetime(dt);
    assert!((days - 19613.25).abs() < 1e-12);
    assert_eq!(datetime_from_days(days), Some(dt));
    assert_eq!(datetime_from_days(f64::NAN), None);

    let c = Candle::try_new(days, 1.0, 1.0, 1.0, 1.0).expect("flat candle");
    assert_eq!(c.datetime(), Some(dt));
}
