//! OHLCV bar representation.

use crate::domain::decimal::Decimal;
use chrono::{Duration, NaiveDateTime};

/// One immutable OHLCV sample covering `[end_time - period, end_time]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    period: Duration,
    end_time: NaiveDateTime,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
}

impl Bar {
    pub fn new(
        period: Duration,
        end_time: NaiveDateTime,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            period,
            end_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn end_time(&self) -> NaiveDateTime {
        self.end_time
    }

    pub fn begin_time(&self) -> NaiveDateTime {
        self.end_time - self.period
    }

    /// True when `time` falls in `[begin_time, end_time)`.
    pub fn in_period(&self, time: NaiveDateTime) -> bool {
        time >= self.begin_time() && time < self.end_time
    }

    pub fn open(&self) -> Decimal {
        self.open
    }

    pub fn high(&self) -> Decimal {
        self.high
    }

    pub fn low(&self) -> Decimal {
        self.low
    }

    pub fn close(&self) -> Decimal {
        self.close
    }

    pub fn volume(&self) -> Decimal {
        self.volume
    }

    pub fn is_bullish(&self) -> bool {
        self.open < self.close
    }

    pub fn is_bearish(&self) -> bool {
        self.open > self.close
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> Decimal {
        (self.high + self.low + self.close) / Decimal::from(3)
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: Decimal) -> Decimal {
        let hl = (self.high - self.low).abs();
        let hc = (self.high - prev_close).abs();
        let lc = (prev_close - self.low).abs();
        hl.max(hc).max(lc)
    }
}
