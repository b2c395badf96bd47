//! Recalculation from recorded reference outputs.
//!
//! Snapshots are stored in a long CSV with the header
//! `column,params,row,value`: `params` is the `;`-separated parameter vector
//! the values were recorded under and `row` counts data rows from 0.

use crate::domain::decimal::Decimal;
use crate::domain::error::TaError;
use crate::domain::sheet::{Cell, FixtureLayout, Sheet};
use crate::ports::reference_port::Recalculator;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct SnapshotRecalculator {
    /// (column, params) -> values by data row.
    snapshots: BTreeMap<(usize, Vec<String>), BTreeMap<usize, Decimal>>,
}

/// Canonical text of a parameter so `13` and `13.0` key the same snapshot.
fn param_key(value: Decimal) -> String {
    match value.inner() {
        Some(d) => d.normalize().to_string(),
        None => value.to_string(),
    }
}

fn field<'r>(record: &'r csv::StringRecord, index: usize, name: &str) -> Result<&'r str, TaError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| TaError::fixture(format!("snapshot record missing {name}")))
}

impl SnapshotRecalculator {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TaError> {
        let content = fs::read_to_string(path)?;
        Self::from_text(&content)
    }

    pub fn from_text(content: &str) -> Result<Self, TaError> {
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut recalculator = Self::default();
        for result in rdr.records() {
            let record =
                result.map_err(|e| TaError::fixture(format!("snapshot parse error: {e}")))?;
            let column: usize = field(&record, 0, "column")?
                .parse()
                .map_err(|e| TaError::fixture(format!("invalid snapshot column: {e}")))?;
            let params = field(&record, 1, "params")?
                .split(';')
                .filter(|p| !p.trim().is_empty())
                .map(|p| p.parse::<Decimal>().map(param_key))
                .collect::<Result<Vec<_>, _>>()?;
            let row: usize = field(&record, 2, "row")?
                .parse()
                .map_err(|e| TaError::fixture(format!("invalid snapshot row: {e}")))?;
            let value: Decimal = field(&record, 3, "value")?.parse()?;
            recalculator.record(column, params, row, value);
        }
        Ok(recalculator)
    }

    fn record(&mut self, column: usize, params: Vec<String>, row: usize, value: Decimal) {
        self.snapshots
            .entry((column, params))
            .or_default()
            .insert(row, value);
    }

    pub fn insert(&mut self, column: usize, params: &[Decimal], values: &[Decimal]) {
        let params = params.iter().copied().map(param_key).collect();
        let entry = self.snapshots.entry((column, params)).or_default();
        entry.clear();
        entry.extend(values.iter().copied().enumerate());
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl Recalculator for SnapshotRecalculator {
    fn recalculate(&self, sheet: &mut Sheet, layout: &FixtureLayout) -> Result<(), TaError> {
        let params: Vec<String> = sheet
            .parameters(layout)?
            .into_iter()
            .map(param_key)
            .collect();
        let rows = sheet.data_rows(layout)?;
        let mut written = 0;
        for ((column, _), values) in self.snapshots.iter().filter(|((_, p), _)| *p == params) {
            if values.len() != rows.len() || values.keys().any(|&r| r >= rows.len()) {
                return Err(TaError::fixture(format!(
                    "snapshot for column {column} has {} values for {} data rows",
                    values.len(),
                    rows.len()
                )));
            }
            for (&row, &value) in values {
                sheet.set_cell(rows[row], *column, Cell::Number(value));
            }
            written += 1;
        }
        if written == 0 {
            return Err(TaError::fixture(format!(
                "no recorded outputs for parameters [{}]",
                params.join("; ")
            )));
        }
        tracing::debug!(columns = written, params = %params.join(";"), "recalculated from snapshots");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn sheet() -> Sheet {
        let rows: &[&[&str]] = &[
            &["Param"],
            &["n", "2"],
            &["Date", "Close", "Out"],
            &["2024-01-05", "1", "0"],
            &["//"],
            &["2024-01-12", "2", "0"],
        ];
        Sheet::new(
            rows.iter()
                .map(|r| r.iter().map(|c| Cell::parse(c)).collect())
                .collect(),
        )
    }

    const SNAPSHOTS: &str = "column,params,row,value\n\
        2,2,0,1.5\n\
        2,2,1,2.5\n\
        2,3,0,9\n\
        2,3,1,10\n";

    #[test]
    fn writes_matching_snapshot() {
        let recalculator = SnapshotRecalculator::from_text(SNAPSHOTS).unwrap();
        assert_eq!(recalculator.len(), 2);
        let mut s = sheet();
        recalculator
            .recalculate(&mut s, &FixtureLayout::default())
            .unwrap();
        assert_eq!(s.cell(3, 2), &Cell::Number(d("1.5")));
        assert_eq!(s.cell(5, 2), &Cell::Number(d("2.5")));
        assert!(s.cell(4, 2).is_empty());
    }

    #[test]
    fn equivalent_parameter_text_matches() {
        let recalculator = SnapshotRecalculator::from_text(SNAPSHOTS).unwrap();
        let mut s = sheet();
        s.set_cell(1, 1, Cell::Number(d("3.00")));
        recalculator
            .recalculate(&mut s, &FixtureLayout::default())
            .unwrap();
        assert_eq!(s.cell(5, 2), &Cell::Number(d("10")));
    }

    #[test]
    fn unknown_parameters_rejected() {
        let recalculator = SnapshotRecalculator::from_text(SNAPSHOTS).unwrap();
        let mut s = sheet();
        s.set_cell(1, 1, Cell::Number(d("4")));
        assert!(matches!(
            recalculator.recalculate(&mut s, &FixtureLayout::default()),
            Err(TaError::FixtureFormat { .. })
        ));
    }

    #[test]
    fn short_snapshot_rejected() {
        let mut recalculator = SnapshotRecalculator::default();
        recalculator.insert(2, &[d("2")], &[d("1")]);
        let mut s = sheet();
        assert!(matches!(
            recalculator.recalculate(&mut s, &FixtureLayout::default()),
            Err(TaError::FixtureFormat { .. })
        ));
    }

    #[test]
    fn malformed_records_rejected() {
        assert!(SnapshotRecalculator::from_text("column,params,row,value\nx,1,0,1\n").is_err());
        assert!(SnapshotRecalculator::from_text("column,params,row,value\n1,1,0,abc\n").is_err());
        assert!(SnapshotRecalculator::from_text("column,params,row,value\n1,1,0\n").is_err());
    }

    #[test]
    fn multi_parameter_snapshots() {
        let recalculator =
            SnapshotRecalculator::from_text("column,params,row,value\n2,2;5,0,1\n2,2;5,1,2\n")
                .unwrap();
        let mut s = sheet();
        assert!(recalculator
            .recalculate(&mut s, &FixtureLayout::default())
            .is_err());

        let rows: &[&[&str]] = &[
            &["Param"],
            &["n", "2"],
            &["m", "5"],
            &["Date", "Close", "Out"],
            &["2024-01-05", "1", "0"],
            &["2024-01-12", "2", "0"],
        ];
        let mut s = Sheet::new(
            rows.iter()
                .map(|r| r.iter().map(|c| Cell::parse(c)).collect())
                .collect(),
        );
        recalculator
            .recalculate(&mut s, &FixtureLayout::default())
            .unwrap();
        assert_eq!(s.cell(5, 2), &Cell::Number(d("2")));
    }
}
