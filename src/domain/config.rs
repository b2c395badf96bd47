//! Verification settings read through [`ConfigPort`].

use crate::domain::config_validation::{
    bar_period, decimal_value, text_value, validate_verification_config, FIXTURE, VERIFICATION,
};
use crate::domain::decimal::Decimal;
use crate::domain::error::TaError;
use crate::domain::sheet::FixtureLayout;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, PartialEq)]
pub struct VerificationConfig {
    /// Largest accepted |expected - actual|.
    pub epsilon: Decimal,
    pub layout: FixtureLayout,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            epsilon: Decimal::new(1, 4),
            layout: FixtureLayout::default(),
        }
    }
}

impl VerificationConfig {
    /// Validates then reads `[verification]` and `[fixture]`; absent keys
    /// keep their defaults.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TaError> {
        validate_verification_config(config)?;
        let defaults = Self::default();
        let text = |key: &str, default: String| -> Result<String, TaError> {
            Ok(text_value(config, FIXTURE, key)?.unwrap_or(default))
        };
        let layout = FixtureLayout {
            data_header: text("data_header", defaults.layout.data_header)?,
            param_header: text("param_header", defaults.layout.param_header)?,
            comment_marker: text("comment_marker", defaults.layout.comment_marker)?,
            date_format: text("date_format", defaults.layout.date_format)?,
            param_column: usize::try_from(config.get_int(
                FIXTURE,
                "param_column",
                defaults.layout.param_column as i64,
            ))
            .map_err(|e| TaError::ConfigInvalid {
                section: FIXTURE.to_string(),
                key: "param_column".to_string(),
                reason: e.to_string(),
            })?,
            bar_period: bar_period(config.get_int(
                FIXTURE,
                "bar_period_days",
                defaults.layout.bar_period.num_days(),
            ))?,
        };
        Ok(Self {
            epsilon: decimal_value(config, VERIFICATION, "epsilon")?.unwrap_or(defaults.epsilon),
            layout,
        })
    }
}
