//! Direct indicators reading bar fields.

use crate::domain::decimal::Decimal;
use crate::domain::error::TaError;
use crate::domain::indicator::Indicator;
use crate::domain::series::TimeSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
    /// (high + low + close) / 3
    Typical,
}

pub struct PriceIndicator<'a> {
    series: &'a TimeSeries,
    field: PriceField,
}

impl<'a> PriceIndicator<'a> {
    pub fn new(series: &'a TimeSeries, field: PriceField) -> Self {
        Self { series, field }
    }

    pub fn close(series: &'a TimeSeries) -> Self {
        Self::new(series, PriceField::Close)
    }

    pub fn high(series: &'a TimeSeries) -> Self {
        Self::new(series, PriceField::High)
    }

    pub fn low(series: &'a TimeSeries) -> Self {
        Self::new(series, PriceField::Low)
    }

    pub fn field(&self) -> PriceField {
        self.field
    }
}

impl Indicator for PriceIndicator<'_> {
    fn series(&self) -> &TimeSeries {
        self.series
    }

    fn value(&self, index: usize) -> Result<Decimal, TaError> {
        let bar = self.series.get_bar(index)?;
        Ok(match self.field {
            PriceField::Open => bar.open(),
            PriceField::High => bar.high(),
            PriceField::Low => bar.low(),
            PriceField::Close => bar.close(),
            PriceField::Volume => bar.volume(),
            PriceField::Typical => bar.typical_price(),
        })
    }
}

/// The same value at every index of the series.
pub struct ConstantIndicator<'a> {
    series: &'a TimeSeries,
    value: Decimal,
}

impl<'a> ConstantIndicator<'a> {
    pub fn new(series: &'a TimeSeries, value: Decimal) -> Self {
        Self { series, value }
    }
}

impl Indicator for ConstantIndicator<'_> {
    fn series(&self) -> &TimeSeries {
        self.series
    }

    fn value(&self, index: usize) -> Result<Decimal, TaError> {
        self.series.check_index(index)?;
        Ok(self.value)
    }
}
