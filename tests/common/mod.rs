#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tacore::adapters::csv_sheet_adapter::CsvSheetSource;
use tacore::adapters::snapshot_recalculator::SnapshotRecalculator;
use tacore::domain::bar::Bar;
use tacore::domain::config::VerificationConfig;
use tacore::domain::decimal::Decimal;
use tacore::domain::error::TaError;
use tacore::domain::fixture::ReferenceFixture;
use tacore::domain::indicator::{Formula, Prior};
use tacore::domain::series::TimeSeries;

pub const MINUS_DI_COLUMN: usize = 6;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// The -DI reference sheet wired to its recorded recalculations.
pub fn minus_di_fixture() -> ReferenceFixture {
    let source = CsvSheetSource::from_path(fixture_path("minus_di.csv"));
    let snapshots =
        SnapshotRecalculator::from_path(fixture_path("minus_di_snapshots.csv")).unwrap();
    ReferenceFixture::load(&source, VerificationConfig::default().layout)
        .unwrap()
        .with_recalculator(Box::new(snapshots))
}

/// Daily bars with the given closes; high/low are close ± 1.
pub fn make_series(closes: &[f64]) -> TimeSeries {
    let start = date(2024, 1, 1);
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let c = Decimal::from_f64(c);
            Bar::new(
                Duration::days(1),
                start + Duration::days(i as i64),
                c,
                c + Decimal::ONE,
                c - Decimal::ONE,
                c,
                Decimal::from(1000),
            )
        })
        .collect();
    TimeSeries::from_bars("test", bars).unwrap()
}

/// A deterministic zig-zag series of `len` bars.
pub fn generate_series(len: usize) -> TimeSeries {
    let closes: Vec<f64> = (0..len)
        .map(|i| 100.0 + ((i * 7) % 13) as f64 - ((i * 3) % 5) as f64 * 0.5)
        .collect();
    make_series(&closes)
}

/// close[i] + 0.5 * own[i - 1], counting every invocation.
pub struct CountingFormula<'a> {
    pub series: &'a TimeSeries,
    pub calls: Arc<AtomicUsize>,
}

impl<'a> CountingFormula<'a> {
    pub fn new(series: &'a TimeSeries) -> Self {
        Self {
            series,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Formula for CountingFormula<'_> {
    fn series(&self) -> &TimeSeries {
        self.series
    }

    fn calculate(&self, index: usize, prior: &Prior<'_>) -> Result<Decimal, TaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let close = self.series.get_bar(index)?.close();
        if index == self.series.begin_index() {
            return Ok(close);
        }
        Ok(close + prior.get(index - 1)? * Decimal::new(5, 1))
    }
}
