//! Core domain types and logic.

pub mod decimal;
pub mod bar;
pub mod series;
pub mod indicator;
pub mod factory;
pub mod sheet;
pub mod fixture;
pub mod verification;
pub mod config;
pub mod config_validation;
pub mod error;
