//! Ordered, append-only bar storage addressed by index.
//!
//! A [`TimeSeries`] exposes the inclusive index range `[begin_index, end_index]`.
//! Indices are absolute positions in the shared storage, so a bounded view made
//! with [`TimeSeries::sub_series`] keeps the indices of the series it came from.

use crate::domain::bar::Bar;
use crate::domain::error::TaError;
use std::ops::RangeInclusive;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct TimeSeries {
    name: String,
    bars: Arc<Vec<Bar>>,
    begin: usize,
    /// Exclusive end of this series within `bars`.
    end: usize,
}

impl TimeSeries {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bars: Arc::new(Vec::new()),
            begin: 0,
            end: 0,
        }
    }

    /// Builds a series by appending `bars` in order.
    pub fn from_bars(name: impl Into<String>, bars: Vec<Bar>) -> Result<Self, TaError> {
        let mut series = Self::new(name);
        for bar in bars {
            series.add_bar(bar)?;
        }
        Ok(series)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    pub fn bar_count(&self) -> usize {
        self.end - self.begin
    }

    pub fn begin_index(&self) -> usize {
        self.begin
    }

    /// Last valid index, `None` for an empty series.
    pub fn end_index(&self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.end - 1)
        }
    }

    pub fn indices(&self) -> RangeInclusive<usize> {
        match self.end_index() {
            Some(end) => self.begin..=end,
            // an empty inclusive range
            None => 1..=0,
        }
    }

    pub fn check_index(&self, index: usize) -> Result<(), TaError> {
        if index < self.begin || index >= self.end {
            return Err(TaError::IndexOutOfRange {
                index,
                begin: self.begin,
                end: self.end_index(),
            });
        }
        Ok(())
    }

    pub fn get_bar(&self, index: usize) -> Result<&Bar, TaError> {
        self.check_index(index)?;
        Ok(&self.bars[index])
    }

    pub fn first_bar(&self) -> Option<&Bar> {
        self.bars[self.begin..self.end].first()
    }

    pub fn last_bar(&self) -> Option<&Bar> {
        self.bars[self.begin..self.end].last()
    }

    /// Appends a bar whose end time is strictly after the current last bar.
    ///
    /// Appending to a view detaches it from the storage it shares; other
    /// series over that storage never see the new bar.
    pub fn add_bar(&mut self, bar: Bar) -> Result<(), TaError> {
        if let Some(last) = self.last_bar() {
            if bar.end_time() <= last.end_time() {
                return Err(TaError::OutOfOrder {
                    index: self.end,
                    previous: last.end_time(),
                    end_time: bar.end_time(),
                });
            }
        }
        let bars = Arc::make_mut(&mut self.bars);
        bars.truncate(self.end);
        bars.push(bar);
        self.end += 1;
        Ok(())
    }

    /// A view restricted to `[begin, end]` sharing this series' bars.
    pub fn sub_series(&self, begin: usize, end: usize) -> Result<TimeSeries, TaError> {
        self.check_index(begin)?;
        self.check_index(end)?;
        if begin > end {
            return Err(TaError::IndexOutOfRange {
                index: begin,
                begin: self.begin,
                end: Some(end),
            });
        }
        Ok(TimeSeries {
            name: self.name.clone(),
            bars: Arc::clone(&self.bars),
            begin,
            end: end + 1,
        })
    }

    pub fn shares_storage_with(&self, other: &TimeSeries) -> bool {
        Arc::ptr_eq(&self.bars, &other.bars)
    }
}
