//! True range and Average True Range.
//!
//! TR at the first index is high - low; afterwards it is
//! max(|high - low|, |high - prev_close|, |prev_close - low|).
//! ATR is Wilder's smoothing (MMA) of TR.

use crate::domain::decimal::Decimal;
use crate::domain::error::TaError;
use crate::domain::indicator::cached::{CachedIndicator, Formula, Prior};
use crate::domain::indicator::smoothed::{mma, SmoothedIndicator};
use crate::domain::series::TimeSeries;
use std::sync::Arc;

pub struct TrueRange<'a> {
    series: &'a TimeSeries,
}

impl<'a> TrueRange<'a> {
    pub fn new(series: &'a TimeSeries) -> Self {
        Self { series }
    }
}

impl Formula for TrueRange<'_> {
    fn series(&self) -> &TimeSeries {
        self.series
    }

    fn calculate(&self, index: usize, _prior: &Prior<'_>) -> Result<Decimal, TaError> {
        let bar = self.series.get_bar(index)?;
        if index == self.series.begin_index() {
            return Ok((bar.high() - bar.low()).abs());
        }
        let prev_close = self.series.get_bar(index - 1)?.close();
        Ok(bar.true_range(prev_close))
    }
}

pub type TrueRangeIndicator<'a> = CachedIndicator<TrueRange<'a>>;

pub fn true_range(series: &TimeSeries) -> TrueRangeIndicator<'_> {
    CachedIndicator::new(TrueRange::new(series))
}

pub fn atr(series: &TimeSeries, period: usize) -> Result<SmoothedIndicator<'_>, TaError> {
    mma(Arc::new(true_range(series)), period)
}
