//! Concrete adapter implementations for ports.

pub mod csv_sheet_adapter;
pub mod file_config_adapter;
pub mod snapshot_recalculator;
