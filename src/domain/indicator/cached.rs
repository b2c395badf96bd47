//! Memoizing evaluation for indicator formulas.
//!
//! A [`CachedIndicator`] wraps a [`Formula`] and computes each index at most
//! once. A request for index `i` fills every missing index from the highest
//! cached one up to `i` in ascending order, so a formula that reads its own
//! previous value (through [`Prior`]) never recurses and never recomputes.
//!
//! The memo lock is taken once per index being filled and released before the
//! next one. Concurrent callers asking for the same index wait for the first
//! caller to store it and then read the stored value.

use crate::domain::decimal::Decimal;
use crate::domain::error::TaError;
use crate::domain::indicator::Indicator;
use crate::domain::series::TimeSeries;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The per-index rule of a cached indicator.
pub trait Formula: Send + Sync {
    fn series(&self) -> &TimeSeries;

    /// Computes the value at `index`. Values of this same indicator at indices
    /// below `index` are available through `prior`.
    fn calculate(&self, index: usize, prior: &Prior<'_>) -> Result<Decimal, TaError>;
}

/// Read-only view of the values memoized so far.
pub struct Prior<'m> {
    begin: usize,
    values: &'m [Decimal],
}

impl Prior<'_> {
    /// The memoized value at `index`; `LookAhead` if it has not been computed.
    pub fn get(&self, index: usize) -> Result<Decimal, TaError> {
        let computing = self.begin + self.values.len();
        if index < self.begin {
            return Err(TaError::IndexOutOfRange {
                index,
                begin: self.begin,
                end: computing.checked_sub(1),
            });
        }
        self.values
            .get(index - self.begin)
            .copied()
            .ok_or(TaError::LookAhead {
                requested: index,
                computing,
            })
    }
}

pub struct CachedIndicator<F> {
    formula: F,
    /// `memo[k]` is the value at `series.begin_index() + k`.
    memo: Mutex<Vec<Decimal>>,
}

impl<F: Formula> CachedIndicator<F> {
    pub fn new(formula: F) -> Self {
        Self {
            formula,
            memo: Mutex::new(Vec::new()),
        }
    }

    pub fn formula(&self) -> &F {
        &self.formula
    }

    /// Highest index computed so far.
    pub fn highest_cached(&self) -> Option<usize> {
        let len = self.lock().len();
        len.checked_sub(1)
            .map(|last| self.formula.series().begin_index() + last)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Decimal>> {
        // entries are only pushed after a successful calculation
        self.memo.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<F: Formula> Indicator for CachedIndicator<F> {
    fn series(&self) -> &TimeSeries {
        self.formula.series()
    }

    fn value(&self, index: usize) -> Result<Decimal, TaError> {
        let series = self.formula.series();
        series.check_index(index)?;
        let begin = series.begin_index();
        let offset = index - begin;

        loop {
            let mut memo = self.lock();
            if let Some(value) = memo.get(offset) {
                return Ok(*value);
            }
            let next = begin + memo.len();
            let value = self.formula.calculate(
                next,
                &Prior {
                    begin,
                    values: memo.as_slice(),
                },
            )?;
            tracing::trace!(index = next, %value, "memoized");
            memo.push(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::Bar;
    use chrono::{Duration, NaiveDate};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn series(len: usize) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let bars = (0..len)
            .map(|i| {
                let c = Decimal::from(i + 1);
                Bar::new(
                    Duration::days(1),
                    start + Duration::days(i as i64),
                    c,
                    c,
                    c,
                    c,
                    Decimal::ONE,
                )
            })
            .collect();
        TimeSeries::from_bars("cached", bars).unwrap()
    }

    /// Running sum of closes, defined recursively on its own prior value.
    struct RunningSum<'a> {
        series: &'a TimeSeries,
        calls: Arc<AtomicUsize>,
    }

    impl Formula for RunningSum<'_> {
        fn series(&self) -> &TimeSeries {
            self.series
        }

        fn calculate(&self, index: usize, prior: &Prior<'_>) -> Result<Decimal, TaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let close = self.series.get_bar(index)?.close();
            if index == self.series.begin_index() {
                return Ok(close);
            }
            Ok(prior.get(index - 1)? + close)
        }
    }

    /// Reads its own current index, which is never available.
    struct SelfReading<'a> {
        series: &'a TimeSeries,
    }

    impl Formula for SelfReading<'_> {
        fn series(&self) -> &TimeSeries {
            self.series
        }

        fn calculate(&self, index: usize, prior: &Prior<'_>) -> Result<Decimal, TaError> {
            prior.get(index)
        }
    }

    fn running_sum(series: &TimeSeries) -> (CachedIndicator<RunningSum<'_>>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let indicator = CachedIndicator::new(RunningSum {
            series,
            calls: Arc::clone(&calls),
        });
        (indicator, calls)
    }

    #[test]
    fn fills_ascending_and_computes_once() {
        let s = series(10);
        let (indicator, calls) = running_sum(&s);

        assert_eq!(indicator.highest_cached(), None);
        assert_eq!(indicator.value(9).unwrap(), Decimal::from(55));
        assert_eq!(calls.load(Ordering::SeqCst), 10);
        assert_eq!(indicator.highest_cached(), Some(9));

        assert_eq!(indicator.value(4).unwrap(), Decimal::from(15));
        assert_eq!(indicator.value(9).unwrap(), Decimal::from(55));
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn incremental_requests_extend_the_cache() {
        let s = series(6);
        let (indicator, calls) = running_sum(&s);

        indicator.value(2).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        indicator.value(5).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn out_of_range_index_is_rejected_without_computing() {
        let s = series(3);
        let (indicator, calls) = running_sum(&s);
        assert!(matches!(
            indicator.value(3),
            Err(TaError::IndexOutOfRange { index: 3, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn sub_series_starts_cache_at_begin_index() {
        let s = series(10);
        let view = s.sub_series(4, 7).unwrap();
        let (indicator, calls) = running_sum(&view);

        // 5 + 6 + 7
        assert_eq!(indicator.value(6).unwrap(), Decimal::from(18));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(indicator.highest_cached(), Some(6));
        assert!(indicator.value(3).is_err());
    }

    #[test]
    fn reading_own_current_index_is_look_ahead() {
        let s = series(3);
        let indicator = CachedIndicator::new(SelfReading { series: &s });
        assert!(matches!(
            indicator.value(0),
            Err(TaError::LookAhead {
                requested: 0,
                computing: 0
            })
        ));
        assert_eq!(indicator.highest_cached(), None);
    }

    #[test]
    fn deep_recursion_does_not_overflow_stack() {
        let s = series(100_000);
        let (indicator, calls) = running_sum(&s);
        let expected = Decimal::from(100_000usize * 100_001 / 2);
        assert_eq!(indicator.value(99_999).unwrap(), expected);
        assert_eq!(calls.load(Ordering::SeqCst), 100_000);
    }

    #[test]
    fn concurrent_callers_compute_each_index_once() {
        let s = series(500);
        let (indicator, calls) = running_sum(&s);

        std::thread::scope(|scope| {
            for t in 0..8 {
                let indicator = &indicator;
                scope.spawn(move || {
                    for i in (t..500).step_by(7) {
                        indicator.value(i).unwrap();
                    }
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 500);
        assert_eq!(indicator.value(499).unwrap(), Decimal::from(500 * 501 / 2));
    }
}
