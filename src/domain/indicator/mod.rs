//! Indicator abstraction and the built-in formulas.
//!
//! - `Indicator`: a pure function from a series index to a [`Decimal`]
//! - `IndicatorRef`: a shared handle used to compose indicators
//! - `IndicatorKind`: the name of each indicator the factory can build
//!
//! Direct indicators (price fields, constants, SMA) compute on every call.
//! Recursive ones are [`CachedIndicator`]s over a [`Formula`].

pub mod cached;
pub mod directional;
pub mod price;
pub mod sma;
pub mod smoothed;
pub mod true_range;

pub use cached::{CachedIndicator, Formula, Prior};

use crate::domain::decimal::Decimal;
use crate::domain::error::TaError;
use crate::domain::series::TimeSeries;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub trait Indicator: Send + Sync {
    /// The series this indicator is evaluated over.
    fn series(&self) -> &TimeSeries;

    /// The value at `index`. Fails with `IndexOutOfRange` outside the
    /// series' `[begin_index, end_index]`.
    fn value(&self, index: usize) -> Result<Decimal, TaError>;

    /// Values over the whole series range, in index order.
    fn values(&self) -> Result<Vec<Decimal>, TaError> {
        self.series().indices().map(|i| self.value(i)).collect()
    }
}

pub type IndicatorRef<'a> = Arc<dyn Indicator + 'a>;

impl<I: Indicator + ?Sized> Indicator for Arc<I> {
    fn series(&self) -> &TimeSeries {
        (**self).series()
    }

    fn value(&self, index: usize) -> Result<Decimal, TaError> {
        (**self).value(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    ClosePrice,
    Sma,
    Ema,
    Mma,
    TrueRange,
    Atr,
    PlusDm,
    MinusDm,
    PlusDi,
    MinusDi,
    Dx,
    Adx,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 12] = [
        IndicatorKind::ClosePrice,
        IndicatorKind::Sma,
        IndicatorKind::Ema,
        IndicatorKind::Mma,
        IndicatorKind::TrueRange,
        IndicatorKind::Atr,
        IndicatorKind::PlusDm,
        IndicatorKind::MinusDm,
        IndicatorKind::PlusDi,
        IndicatorKind::MinusDi,
        IndicatorKind::Dx,
        IndicatorKind::Adx,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IndicatorKind::ClosePrice => "CLOSE",
            IndicatorKind::Sma => "SMA",
            IndicatorKind::Ema => "EMA",
            IndicatorKind::Mma => "MMA",
            IndicatorKind::TrueRange => "TR",
            IndicatorKind::Atr => "ATR",
            IndicatorKind::PlusDm => "PLUS_DM",
            IndicatorKind::MinusDm => "MINUS_DM",
            IndicatorKind::PlusDi => "PLUS_DI",
            IndicatorKind::MinusDi => "MINUS_DI",
            IndicatorKind::Dx => "DX",
            IndicatorKind::Adx => "ADX",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IndicatorKind {
    type Err = TaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', ' '], "_").to_ascii_uppercase();
        IndicatorKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| TaError::invalid_parameter(s, "unknown indicator"))
    }
}
