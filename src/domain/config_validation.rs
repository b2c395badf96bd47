//! Configuration validation.
//!
//! Validates the `[verification]` and `[fixture]` sections before a harness
//! is built from them. Absent keys fall back to defaults; present keys must
//! be well formed.

use crate::domain::decimal::Decimal;
use crate::domain::error::TaError;
use crate::ports::config_port::ConfigPort;
use chrono::format::{Item, StrftimeItems};
use chrono::TimeDelta;

pub(crate) const VERIFICATION: &str = "verification";
pub(crate) const FIXTURE: &str = "fixture";

pub fn validate_verification_config(config: &dyn ConfigPort) -> Result<(), TaError> {
    validate_epsilon(config)?;
    for key in ["data_header", "param_header", "comment_marker"] {
        text_value(config, FIXTURE, key)?;
    }
    validate_date_format(config)?;
    validate_bar_period(config)?;
    validate_param_column(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TaError {
    TaError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// A present, non-blank string value.
pub(crate) fn text_value(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<String>, TaError> {
    match config.get_string(section, key) {
        Some(value) if value.trim().is_empty() => {
            Err(invalid(section, key, format!("{key} must not be empty")))
        }
        other => Ok(other.map(|v| v.trim().to_string())),
    }
}

pub(crate) fn decimal_value(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<Decimal>, TaError> {
    text_value(config, section, key)?
        .map(|text| {
            text.parse::<Decimal>()
                .map_err(|e| invalid(section, key, e.to_string()))
        })
        .transpose()
}

fn int_value(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<i64>, TaError> {
    text_value(config, section, key)?
        .map(|text| {
            text.parse::<i64>()
                .map_err(|e| invalid(section, key, format!("{text:?} is not an integer: {e}")))
        })
        .transpose()
}

fn validate_epsilon(config: &dyn ConfigPort) -> Result<(), TaError> {
    if let Some(epsilon) = decimal_value(config, VERIFICATION, "epsilon")? {
        if !epsilon.is_positive() {
            return Err(invalid(
                VERIFICATION,
                "epsilon",
                "epsilon must be positive",
            ));
        }
    }
    Ok(())
}

fn validate_date_format(config: &dyn ConfigPort) -> Result<(), TaError> {
    if let Some(format) = text_value(config, FIXTURE, "date_format")? {
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(invalid(
                FIXTURE,
                "date_format",
                format!("{format:?} is not a valid date format"),
            ));
        }
    }
    Ok(())
}

/// Longest accepted bar; keeps `end_time - period` inside the calendar.
pub(crate) const MAX_BAR_PERIOD_DAYS: i64 = 36_525;

/// `days` as a bar period, positive and at most [`MAX_BAR_PERIOD_DAYS`].
pub(crate) fn bar_period(days: i64) -> Result<TimeDelta, TaError> {
    if days <= 0 {
        return Err(invalid(
            FIXTURE,
            "bar_period_days",
            "bar_period_days must be positive",
        ));
    }
    if days > MAX_BAR_PERIOD_DAYS {
        return Err(invalid(
            FIXTURE,
            "bar_period_days",
            format!("bar_period_days must be at most {MAX_BAR_PERIOD_DAYS}"),
        ));
    }
    TimeDelta::try_days(days).ok_or_else(|| {
        invalid(
            FIXTURE,
            "bar_period_days",
            format!("{days} days is out of range"),
        )
    })
}

fn validate_bar_period(config: &dyn ConfigPort) -> Result<(), TaError> {
    if let Some(days) = int_value(config, FIXTURE, "bar_period_days")? {
        bar_period(days)?;
    }
    Ok(())
}

fn validate_param_column(config: &dyn ConfigPort) -> Result<(), TaError> {
    if let Some(column) = int_value(config, FIXTURE, "param_column")? {
        if column < 0 {
            return Err(invalid(
                FIXTURE,
                "param_column",
                "param_column must be non-negative",
            ));
        }
    }
    Ok(())
}
