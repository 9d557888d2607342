// File: crates/demo/src/main.rs
// Summary: Demo streams an OHLC CSV into a CandleSeries, logging the rolling visible range and cursor lookups.

use anyhow::{Context, Result};
use chart_data::types::days_from_datetime;
use chart_data::{Candle, CandleSeries, SeriesConfig, DEFAULT_WINDOW};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Log the visible range every this many rows.
const REPORT_EVERY: usize = 500;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Usage: chart-data-demo [path.csv] [window]
    let mut args = std::env::args().skip(1);
    let raw = args
        .next()
        .unwrap_or_else(|| "binanceus_CRVUSDT_6h_2023-09-13_to_2025-01-21.csv".to_string());
    let window = resolve_window(args.next())?;

    let (path, used_alt) = resolve_path(&raw)?;
    info!(path = %path.display(), used_alt, window, "using input file");

    let candles = load_ohlc_csv(&path)
        .with_context(|| format!("failed to load CSV '{}'", path.display()))?;
    if candles.is_empty() {
        anyhow::bail!("no candles loaded; check headers/delimiter.");
    }
    info!(rows = candles.len(), "parsed candles");

    let mut series = CandleSeries::new(SeriesConfig::default().with_window(window))
        .context("invalid series configuration")?;

    let mut rejected = 0usize;
    for (row, candle) in candles.into_iter().enumerate() {
        if let Err(err) = series.push(candle) {
            rejected += 1;
            warn!(row, error = %err, "skipping row");
        }
        if (row + 1) % REPORT_EVERY == 0 {
            if let Some((lo, hi)) = series.visible_range() {
                info!(row = row + 1, lo, hi, "visible range over last {window} candles");
            }
        }
    }
    info!(kept = series.len(), rejected, "series built");

    if let Some((lo, hi)) = series.visible_range() {
        println!("Visible range (last {window}): [{lo:.4}, {hi:.4}]");
    }

    // Resolve a few cursor positions that fall between bars.
    let (first, last) = match (series.store().first(), series.store().last()) {
        (Some(f), Some(l)) => (f.t, l.t),
        _ => return Ok(()),
    };
    let span = last - first;
    for k in 0..=4 {
        let ts = first + span * (k as f64) / 4.0 + 1e-3;
        match series.candle_at_or_after(ts)? {
            Some((ordinal, c)) => {
                let when = c.datetime().map(|d| d.to_rfc3339()).unwrap_or_else(|| format!("{:.4}", c.t));
                println!("cursor {ts:.4} -> #{ordinal} {when} o={:.4} h={:.4} l={:.4} c={:.4} vol={}", c.o, c.h, c.l, c.c, c.volume());
            }
            None => println!("cursor {ts:.4} -> past last candle"),
        }
    }

    Ok(())
}

/// Window from CLI, then `CHART_WINDOW`, then the library default.
fn resolve_window(arg: Option<String>) -> Result<usize> {
    let raw = arg.or_else(|| std::env::var("CHART_WINDOW").ok());
    match raw {
        Some(s) => s
            .trim()
            .parse::<usize>()
            .with_context(|| format!("window '{s}' is not a positive integer")),
        None => Ok(DEFAULT_WINDOW),
    }
}

/// Resolve path, trying .csv/.cvs swap if needed.
/// Returns (actual_path, used_alt)
fn resolve_path(raw: &str) -> Result<(PathBuf, bool)> {
    let p = Path::new(raw);
    if p.exists() {
        return Ok((p.to_path_buf(), false));
    }
    if let Some(alt) = swap_ext(p) {
        if alt.exists() {
            return Ok((alt, true));
        }
    }
    anyhow::bail!("file not found: {}", p.display());
}

/// Load Binance-like OHLC CSV into Candle vec; timestamps become days since epoch.
fn load_ohlc_csv(path: &Path) -> Result<Vec<Candle>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect::<Vec<_>>();
    info!(?headers, "csv headers");

    let idx = |names: &[&str]| -> Option<usize> { headers.iter().position(|h| names.contains(&h.as_str())) };

    let i_time = idx(&["time", "timestamp", "open_time", "date", "datetime"]);
    let i_open = idx(&["open", "o"]);
    let i_high = idx(&["high", "h"]);
    let i_low = idx(&["low", "l"]);
    let i_close = idx(&["close", "c", "adj_close", "close_price"]);
    let i_volume = idx(&["volume", "vol", "v"]);
    let i_buy = idx(&["taker_buy_base_asset_volume", "buy_volume", "taker_buy_volume"]);

    if i_time.is_none() {
        anyhow::bail!("no time column; expected one of time/timestamp/open_time/date/datetime");
    }
    if i_open.is_none() || i_high.is_none() || i_low.is_none() || i_close.is_none() {
        warn!("could not find one of open/high/low/close columns");
    }

    let mut out = Vec::new();
    for (row, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let parse = |i: Option<usize>| -> Option<f64> { i.and_then(|ix| rec.get(ix)).and_then(|s| s.trim().parse::<f64>().ok()) };

        let Some(t) = i_time.and_then(|ix| rec.get(ix)).and_then(parse_time_to_days) else {
            warn!(row, "unparseable time");
            continue;
        };
        let (Some(o), Some(h), Some(l), Some(c)) = (parse(i_open), parse(i_high), parse(i_low), parse(i_close)) else {
            continue;
        };
        let candle = match Candle::try_new(t, o, h, l, c) {
            Ok(candle) => candle,
            Err(err) => {
                warn!(row, error = %err, "invalid candle");
                continue;
            }
        };
        let volume = parse(i_volume).unwrap_or(0.0).max(0.0);
        let buy = parse(i_buy).unwrap_or(volume).clamp(0.0, volume);
        out.push(candle.with_volume(buy.round() as u64, (volume - buy).round() as u64));
    }
    Ok(out)
}

/// Epoch seconds/milliseconds or an ISO-like date string to days since epoch.
fn parse_time_to_days(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<i64>() {
        let dt = if n > 10_i64.pow(11) {
            DateTime::from_timestamp_millis(n)
        } else {
            DateTime::from_timestamp(n, 0)
        }?;
        return Some(days_from_datetime(dt));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(days_from_datetime(dt.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(days_from_datetime(naive.and_utc()));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| days_from_datetime(naive.and_utc()))
}

fn swap_ext(p: &Path) -> Option<PathBuf> {
    let mut alt = p.to_path_buf();
    let ext = p.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "cvs" => {
            alt.set_extension("csv");
            Some(alt)
        }
        "csv" => {
            alt.set_extension("cvs");
            Some(alt)
        }
        _ => None,
    }
}
