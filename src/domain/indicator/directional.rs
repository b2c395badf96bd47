//! Directional movement family (+DM, -DM, +DI, -DI, DX, ADX).
//!
//! up = high - prev_high, down = prev_low - low.
//! +DM = up when up > down and up > 0, else 0; -DM mirrors it. Both are 0 at
//! the first index.
//! ±DI = 100 * MMA(±DM, n) / ATR(n).
//! DX = 100 * |+DI - -DI| / (+DI + -DI), 0 when both are 0.
//! ADX = MMA(DX(n), m).

use crate::domain::decimal::Decimal;
use crate::domain::error::TaError;
use crate::domain::indicator::cached::{CachedIndicator, Formula, Prior};
use crate::domain::indicator::smoothed::{mma, SmoothedIndicator};
use crate::domain::indicator::true_range::atr;
use crate::domain::indicator::IndicatorRef;
use crate::domain::series::TimeSeries;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Plus,
    Minus,
}

pub struct DirectionalMovement<'a> {
    series: &'a TimeSeries,
    direction: Direction,
}

impl<'a> DirectionalMovement<'a> {
    pub fn new(series: &'a TimeSeries, direction: Direction) -> Self {
        Self { series, direction }
    }
}

impl Formula for DirectionalMovement<'_> {
    fn series(&self) -> &TimeSeries {
        self.series
    }

    fn calculate(&self, index: usize, _prior: &Prior<'_>) -> Result<Decimal, TaError> {
        let bar = self.series.get_bar(index)?;
        if index == self.series.begin_index() {
            return Ok(Decimal::ZERO);
        }
        let prev = self.series.get_bar(index - 1)?;
        let up = bar.high() - prev.high();
        let down = prev.low() - bar.low();
        if up.is_nan() || down.is_nan() {
            return Ok(Decimal::NAN);
        }
        let (wanted, other) = match self.direction {
            Direction::Plus => (up, down),
            Direction::Minus => (down, up),
        };
        if wanted > other && wanted.is_positive() {
            Ok(wanted)
        } else {
            Ok(Decimal::ZERO)
        }
    }
}

/// 100 * smoothed directional movement / ATR.
pub struct DirectionalIndex<'a> {
    average_dm: IndicatorRef<'a>,
    atr: IndicatorRef<'a>,
}

impl Formula for DirectionalIndex<'_> {
    fn series(&self) -> &TimeSeries {
        self.atr.series()
    }

    fn calculate(&self, index: usize, _prior: &Prior<'_>) -> Result<Decimal, TaError> {
        let dm = self.average_dm.value(index)?;
        let atr = self.atr.value(index)?;
        Ok(dm / atr * Decimal::HUNDRED)
    }
}

pub struct DirectionalSpread<'a> {
    plus_di: IndicatorRef<'a>,
    minus_di: IndicatorRef<'a>,
}

impl Formula for DirectionalSpread<'_> {
    fn series(&self) -> &TimeSeries {
        self.plus_di.series()
    }

    fn calculate(&self, index: usize, _prior: &Prior<'_>) -> Result<Decimal, TaError> {
        let plus = self.plus_di.value(index)?;
        let minus = self.minus_di.value(index)?;
        let total = plus + minus;
        if total.is_zero() {
            return Ok(Decimal::ZERO);
        }
        Ok((plus - minus).abs() / total * Decimal::HUNDRED)
    }
}

pub type DirectionalMovementIndicator<'a> = CachedIndicator<DirectionalMovement<'a>>;
pub type DirectionalIndexIndicator<'a> = CachedIndicator<DirectionalIndex<'a>>;
pub type DxIndicator<'a> = CachedIndicator<DirectionalSpread<'a>>;

pub fn plus_dm(series: &TimeSeries) -> DirectionalMovementIndicator<'_> {
    CachedIndicator::new(DirectionalMovement::new(series, Direction::Plus))
}

pub fn minus_dm(series: &TimeSeries) -> DirectionalMovementIndicator<'_> {
    CachedIndicator::new(DirectionalMovement::new(series, Direction::Minus))
}

fn directional_index<'a>(
    series: &'a TimeSeries,
    direction: Direction,
    atr: IndicatorRef<'a>,
    period: usize,
) -> Result<DirectionalIndexIndicator<'a>, TaError> {
    let dm = CachedIndicator::new(DirectionalMovement::new(series, direction));
    let average_dm = mma(Arc::new(dm), period)?;
    Ok(CachedIndicator::new(DirectionalIndex {
        average_dm: Arc::new(average_dm),
        atr,
    }))
}

pub fn plus_di(series: &TimeSeries, period: usize) -> Result<DirectionalIndexIndicator<'_>, TaError> {
    let atr = Arc::new(atr(series, period)?);
    directional_index(series, Direction::Plus, atr, period)
}

pub fn minus_di(
    series: &TimeSeries,
    period: usize,
) -> Result<DirectionalIndexIndicator<'_>, TaError> {
    let atr = Arc::new(atr(series, period)?);
    directional_index(series, Direction::Minus, atr, period)
}

/// +DI and -DI share one ATR.
pub fn dx(series: &TimeSeries, period: usize) -> Result<DxIndicator<'_>, TaError> {
    let atr: IndicatorRef<'_> = Arc::new(atr(series, period)?);
    let plus = directional_index(series, Direction::Plus, Arc::clone(&atr), period)?;
    let minus = directional_index(series, Direction::Minus, atr, period)?;
    Ok(CachedIndicator::new(DirectionalSpread {
        plus_di: Arc::new(plus),
        minus_di: Arc::new(minus),
    }))
}

pub fn adx(
    series: &TimeSeries,
    di_period: usize,
    adx_period: usize,
) -> Result<SmoothedIndicator<'_>, TaError> {
    mma(Arc::new(dx(series, di_period)?), adx_period)
}
