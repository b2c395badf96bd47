//! Verification of computed indicators against reference output.

use crate::domain::config::VerificationConfig;
use crate::domain::decimal::Decimal;
use crate::domain::error::TaError;
use crate::domain::factory::IndicatorFactory;
use crate::domain::fixture::ReferenceFixture;
use crate::domain::indicator::Indicator;
use crate::ports::reference_port::ReferenceSource;
use std::fmt;

/// Compares `actual` with `expected` at every index of the expected
/// indicator's series and returns how many indices were checked. The first
/// value outside `epsilon` fails with `ToleranceMismatch`.
pub fn assert_indicator_equals(
    expected: &dyn Indicator,
    actual: &dyn Indicator,
    epsilon: Decimal,
) -> Result<usize, TaError> {
    let mut checked = 0;
    for index in expected.series().indices() {
        let want = expected.value(index)?;
        let got = actual.value(index)?;
        if !want.is_equal(got, epsilon) {
            tracing::warn!(index, %want, %got, %epsilon, "indicator mismatch");
            return Err(TaError::ToleranceMismatch {
                index,
                expected: want,
                actual: got,
                epsilon,
            });
        }
        checked += 1;
    }
    Ok(checked)
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerificationReport {
    pub indicator: String,
    pub params: Vec<Decimal>,
    pub column: usize,
    pub checked: usize,
    pub final_index: Option<usize>,
    pub final_value: Decimal,
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(Decimal::to_string).collect();
        write!(
            f,
            "{}({}) column {}: {} indices match",
            self.indicator,
            params.join(", "),
            self.column,
            self.checked
        )?;
        if let Some(index) = self.final_index {
            write!(f, ", value at {index} = {}", self.final_value)?;
        }
        Ok(())
    }
}

/// One verification session: an open fixture, the factory under test and
/// the tolerance settings.
pub struct VerificationHarness<F> {
    fixture: ReferenceFixture,
    factory: F,
    config: VerificationConfig,
}

impl<F: IndicatorFactory> VerificationHarness<F> {
    pub fn new(fixture: ReferenceFixture, factory: F, config: VerificationConfig) -> Self {
        Self {
            fixture,
            factory,
            config,
        }
    }

    /// Loads the fixture from `source` using the configured layout.
    pub fn open(
        source: &dyn ReferenceSource,
        factory: F,
        config: VerificationConfig,
    ) -> Result<Self, TaError> {
        let fixture = ReferenceFixture::load(source, config.layout.clone())?;
        Ok(Self::new(fixture, factory, config))
    }

    pub fn fixture(&self) -> &ReferenceFixture {
        &self.fixture
    }

    pub fn fixture_mut(&mut self) -> &mut ReferenceFixture {
        &mut self.fixture
    }

    pub fn config(&self) -> &VerificationConfig {
        &self.config
    }

    /// Drives `params` into the fixture, builds the indicator over the
    /// reference series and compares it with `column`.
    pub fn verify(
        &mut self,
        params: &[Decimal],
        column: usize,
    ) -> Result<VerificationReport, TaError> {
        self.fixture.apply_parameters(params)?;
        let series = self.fixture.series();
        let indicator = self.factory.build(series, None, params)?;
        let checked = self
            .fixture
            .compare(indicator.as_ref(), column, self.config.epsilon)?;
        let final_index = series.end_index();
        let final_value = match final_index {
            Some(index) => indicator.value(index)?,
            None => Decimal::NAN,
        };
        let report = VerificationReport {
            indicator: self.factory.name().to_string(),
            params: params.to_vec(),
            column,
            checked,
            final_index,
            final_value,
        };
        tracing::debug!(%report, "verified");
        Ok(report)
    }

    /// Like [`verify`](Self::verify), addressing the column by its header label.
    pub fn verify_label(
        &mut self,
        params: &[Decimal],
        label: &str,
    ) -> Result<VerificationReport, TaError> {
        let column = self
            .fixture
            .column_index(label)
            .ok_or_else(|| TaError::fixture(format!("no column labelled {label:?}")))?;
        self.verify(params, column)
    }

    /// Ends the session and hands the fixture back.
    pub fn release(self) -> ReferenceFixture {
        self.fixture
    }
}
