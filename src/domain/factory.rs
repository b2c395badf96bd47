//! Building indicators from a name and a parameter list.
//!
//! The verification harness only sees [`IndicatorFactory`], so it never
//! depends on a concrete formula.

use crate::domain::decimal::Decimal;
use crate::domain::error::TaError;
use crate::domain::indicator::directional::{adx, dx, minus_di, minus_dm, plus_di, plus_dm};
use crate::domain::indicator::price::PriceIndicator;
use crate::domain::indicator::sma::SmaIndicator;
use crate::domain::indicator::smoothed::{ema, mma};
use crate::domain::indicator::true_range::{atr, true_range};
use crate::domain::indicator::{IndicatorKind, IndicatorRef};
use crate::domain::series::TimeSeries;
use std::sync::Arc;

pub trait IndicatorFactory: Send + Sync {
    fn name(&self) -> &str;

    /// Constructs an indicator over `series`. Pure construction: nothing is
    /// evaluated until the indicator is asked for a value.
    fn build<'a>(
        &self,
        series: &'a TimeSeries,
        prerequisite: Option<IndicatorRef<'a>>,
        params: &[Decimal],
    ) -> Result<IndicatorRef<'a>, TaError>;
}

impl IndicatorFactory for IndicatorKind {
    fn name(&self) -> &str {
        IndicatorKind::name(*self)
    }

    fn build<'a>(
        &self,
        series: &'a TimeSeries,
        prerequisite: Option<IndicatorRef<'a>>,
        params: &[Decimal],
    ) -> Result<IndicatorRef<'a>, TaError> {
        let kind = *self;
        if let Some(indicator) = &prerequisite {
            check_prerequisite(kind, series, indicator.series())?;
        }
        let input = || -> IndicatorRef<'a> {
            match prerequisite {
                Some(indicator) => indicator,
                None => Arc::new(PriceIndicator::close(series)),
            }
        };

        let indicator: IndicatorRef<'a> = match kind {
            IndicatorKind::ClosePrice => {
                expect_count(kind, params, 0)?;
                Arc::new(PriceIndicator::close(series))
            }
            IndicatorKind::Sma => {
                let period = single_period(kind, params)?;
                Arc::new(SmaIndicator::new(input(), period)?)
            }
            IndicatorKind::Ema => {
                let period = single_period(kind, params)?;
                Arc::new(ema(input(), period)?)
            }
            IndicatorKind::Mma => {
                let period = single_period(kind, params)?;
                Arc::new(mma(input(), period)?)
            }
            IndicatorKind::TrueRange => {
                expect_count(kind, params, 0)?;
                Arc::new(true_range(series))
            }
            IndicatorKind::Atr => Arc::new(atr(series, single_period(kind, params)?)?),
            IndicatorKind::PlusDm => {
                expect_count(kind, params, 0)?;
                Arc::new(plus_dm(series))
            }
            IndicatorKind::MinusDm => {
                expect_count(kind, params, 0)?;
                Arc::new(minus_dm(series))
            }
            IndicatorKind::PlusDi => Arc::new(plus_di(series, single_period(kind, params)?)?),
            IndicatorKind::MinusDi => Arc::new(minus_di(series, single_period(kind, params)?)?),
            IndicatorKind::Dx => Arc::new(dx(series, single_period(kind, params)?)?),
            IndicatorKind::Adx => match params {
                [p] => {
                    let period = period(kind, *p)?;
                    Arc::new(adx(series, period, period)?)
                }
                [di, adx_period] => Arc::new(adx(
                    series,
                    period(kind, *di)?,
                    period(kind, *adx_period)?,
                )?),
                _ => {
                    return Err(TaError::invalid_parameter(
                        kind,
                        format!("expected 1 or 2 parameters, got {}", params.len()),
                    ));
                }
            },
        };
        tracing::debug!(indicator = %kind, ?params, series = series.name(), "built indicator");
        Ok(indicator)
    }
}

/// Only the moving averages take an input; it must run over `series` itself.
fn check_prerequisite(
    kind: IndicatorKind,
    series: &TimeSeries,
    input: &TimeSeries,
) -> Result<(), TaError> {
    if !matches!(kind, IndicatorKind::Sma | IndicatorKind::Ema | IndicatorKind::Mma) {
        return Err(TaError::invalid_parameter(kind, "takes no prerequisite indicator"));
    }
    let same_bars = input.shares_storage_with(series)
        && input.begin_index() == series.begin_index()
        && input.end_index() == series.end_index();
    if !same_bars {
        return Err(TaError::invalid_parameter(
            kind,
            format!(
                "prerequisite runs over {:?}, not the bars of {:?}",
                input.name(),
                series.name()
            ),
        ));
    }
    Ok(())
}

fn expect_count(kind: IndicatorKind, params: &[Decimal], count: usize) -> Result<(), TaError> {
    if params.len() != count {
        return Err(TaError::invalid_parameter(
            kind,
            format!("expected {count} parameters, got {}", params.len()),
        ));
    }
    Ok(())
}

fn single_period(kind: IndicatorKind, params: &[Decimal]) -> Result<usize, TaError> {
    expect_count(kind, params, 1)?;
    period(kind, params[0])
}

/// A lookback window: integral, positive and not NaN.
fn period(kind: IndicatorKind, value: Decimal) -> Result<usize, TaError> {
    if !value.is_positive() {
        return Err(TaError::invalid_parameter(
            kind,
            format!("period must be positive, got {value}"),
        ));
    }
    if value.round_dp(0) != value {
        return Err(TaError::invalid_parameter(
            kind,
            format!("period must be a whole number, got {value}"),
        ));
    }
    value
        .to_usize()
        .ok_or_else(|| TaError::invalid_parameter(kind, format!("period {value} is too large")))
}
