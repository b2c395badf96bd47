//! Simple Moving Average over a prerequisite indicator.
//!
//! SMA[i] = mean(input[max(begin, i - n + 1) ..= i]). Near the start of the
//! series the window is truncated and the mean taken over what is available.

use crate::domain::decimal::Decimal;
use crate::domain::error::TaError;
use crate::domain::indicator::{Indicator, IndicatorKind, IndicatorRef};
use crate::domain::series::TimeSeries;

pub struct SmaIndicator<'a> {
    input: IndicatorRef<'a>,
    period: usize,
}

impl<'a> SmaIndicator<'a> {
    pub fn new(input: IndicatorRef<'a>, period: usize) -> Result<Self, TaError> {
        if period == 0 {
            return Err(TaError::invalid_parameter(
                IndicatorKind::Sma,
                "period must be positive",
            ));
        }
        Ok(Self { input, period })
    }
}

impl Indicator for SmaIndicator<'_> {
    fn series(&self) -> &TimeSeries {
        self.input.series()
    }

    fn value(&self, index: usize) -> Result<Decimal, TaError> {
        let series = self.input.series();
        series.check_index(index)?;
        let start = (index + 1)
            .saturating_sub(self.period)
            .max(series.begin_index());
        let sum = (start..=index)
            .map(|i| self.input.value(i))
            .sum::<Result<Decimal, TaError>>()?;
        Ok(sum / Decimal::from(index - start + 1))
    }
}
