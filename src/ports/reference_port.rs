//! Reference data source ports.

use crate::domain::error::TaError;
use crate::domain::sheet::{FixtureLayout, Sheet};

/// Supplies the reference sheet. `open` is the single blocking read made at
/// harness setup.
pub trait ReferenceSource {
    fn name(&self) -> &str;

    fn open(&self) -> Result<Sheet, TaError>;
}

/// The reference system's own formula engine: re-derives output cells after
/// the parameter section has been written.
pub trait Recalculator: Send + Sync {
    fn recalculate(&self, sheet: &mut Sheet, layout: &FixtureLayout) -> Result<(), TaError>;
}

/// For sheets whose outputs do not depend on the parameter section.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRecalculation;

impl Recalculator for NoRecalculation {
    fn recalculate(&self, _sheet: &mut Sheet, _layout: &FixtureLayout) -> Result<(), TaError> {
        Ok(())
    }
}
