//! Exponentially smoothed averages (EMA and Wilder's MMA).
//!
//! Seeded with the input at the first index, then
//! avg[i] = avg[i-1] + (input[i] - avg[i-1]) * k
//! with k = 2/(n+1) for EMA and k = 1/n for MMA.

use crate::domain::decimal::Decimal;
use crate::domain::error::TaError;
use crate::domain::indicator::cached::{CachedIndicator, Formula, Prior};
use crate::domain::indicator::{IndicatorKind, IndicatorRef};
use crate::domain::series::TimeSeries;

pub struct SmoothedAverage<'a> {
    input: IndicatorRef<'a>,
    multiplier: Decimal,
}

impl<'a> SmoothedAverage<'a> {
    pub fn new(input: IndicatorRef<'a>, multiplier: Decimal) -> Self {
        Self { input, multiplier }
    }

    pub fn multiplier(&self) -> Decimal {
        self.multiplier
    }
}

impl Formula for SmoothedAverage<'_> {
    fn series(&self) -> &TimeSeries {
        self.input.series()
    }

    fn calculate(&self, index: usize, prior: &Prior<'_>) -> Result<Decimal, TaError> {
        let current = self.input.value(index)?;
        if index == self.input.series().begin_index() {
            return Ok(current);
        }
        let prev = prior.get(index - 1)?;
        Ok((current - prev) * self.multiplier + prev)
    }
}

pub type SmoothedIndicator<'a> = CachedIndicator<SmoothedAverage<'a>>;

fn check_period(kind: IndicatorKind, period: usize) -> Result<(), TaError> {
    if period == 0 {
        return Err(TaError::invalid_parameter(kind, "period must be positive"));
    }
    Ok(())
}

pub fn ema(input: IndicatorRef<'_>, period: usize) -> Result<SmoothedIndicator<'_>, TaError> {
    check_period(IndicatorKind::Ema, period)?;
    let k = Decimal::from(2) / Decimal::from(period + 1);
    Ok(CachedIndicator::new(SmoothedAverage::new(input, k)))
}

pub fn mma(input: IndicatorRef<'_>, period: usize) -> Result<SmoothedIndicator<'_>, TaError> {
    check_period(IndicatorKind::Mma, period)?;
    let k = Decimal::ONE / Decimal::from(period);
    Ok(CachedIndicator::new(SmoothedAverage::new(input, k)))
}
