//! Spreadsheet-like grid exchanged with the reference data source.
//!
//! A reference sheet has a parameter section (a header row whose first cell
//! contains the parameter marker, followed by one row per parameter with the
//! value in `param_column`) and a data section (a header row whose first cell
//! contains the data marker, followed by one row per bar until the end of the
//! sheet). Data rows whose first cell is the comment marker are skipped.

use crate::domain::decimal::Decimal;
use crate::domain::error::TaError;
use chrono::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(Decimal),
}

impl Cell {
    /// Blank → `Empty`, numeric text → `Number`, anything else → `Text`.
    pub fn parse(raw: &str) -> Cell {
        let text = raw.trim();
        if text.is_empty() {
            return Cell::Empty;
        }
        match text.parse::<Decimal>() {
            Ok(value) => Cell::Number(value),
            Err(_) => Cell::Text(text.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// The text a spreadsheet would display for this cell.
    pub fn display(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(text) => Some(text.clone()),
            Cell::Number(value) => Some(value.to_string()),
        }
    }

    pub fn to_decimal(&self) -> Option<Result<Decimal, TaError>> {
        match self {
            Cell::Empty => None,
            Cell::Number(value) => Some(Ok(*value)),
            Cell::Text(text) => Some(text.parse::<Decimal>().map_err(TaError::from)),
        }
    }
}

/// Where the sections of a reference sheet are and how to read them.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureLayout {
    pub data_header: String,
    pub param_header: String,
    pub comment_marker: String,
    pub param_column: usize,
    pub date_format: String,
    pub bar_period: Duration,
}

impl Default for FixtureLayout {
    fn default() -> Self {
        Self {
            data_header: "Date".to_string(),
            param_header: "Param".to_string(),
            comment_marker: "//".to_string(),
            param_column: 1,
            date_format: "%Y-%m-%d".to_string(),
            bar_period: Duration::days(7),
        }
    }
}

static EMPTY: Cell = Cell::Empty;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The cell at (`row`, `column`); `Empty` outside the grid.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY)
    }

    /// Writes a cell, growing the grid as needed.
    pub fn set_cell(&mut self, row: usize, column: usize, cell: Cell) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= column {
            cells.resize(column + 1, Cell::Empty);
        }
        cells[column] = cell;
    }

    /// First row whose first cell contains `marker`.
    pub fn find_header(&self, marker: &str) -> Option<usize> {
        (0..self.rows.len()).find(|&row| {
            self.cell(row, 0)
                .display()
                .is_some_and(|text| text.contains(marker))
        })
    }

    pub fn data_header_row(&self, layout: &FixtureLayout) -> Result<usize, TaError> {
        self.find_header(&layout.data_header)
            .ok_or_else(|| TaError::fixture(format!("{:?} header row not found", layout.data_header)))
    }

    pub fn param_header_row(&self, layout: &FixtureLayout) -> Result<usize, TaError> {
        self.find_header(&layout.param_header).ok_or_else(|| {
            TaError::fixture(format!("{:?} header row not found", layout.param_header))
        })
    }

    /// Bar rows: below the data header, first cell present and not a comment.
    pub fn data_rows(&self, layout: &FixtureLayout) -> Result<Vec<usize>, TaError> {
        let header = self.data_header_row(layout)?;
        Ok((header + 1..self.rows.len())
            .filter(|&row| match self.cell(row, 0).display() {
                Some(text) => text.trim() != layout.comment_marker,
                None => false,
            })
            .collect())
    }

    /// Rows available for parameters: below the parameter header, up to the
    /// data header when it follows, otherwise to the end of the sheet.
    pub fn parameter_rows(&self, layout: &FixtureLayout) -> Result<Vec<usize>, TaError> {
        let header = self.param_header_row(layout)?;
        let end = match self.find_header(&layout.data_header) {
            Some(data) if data > header => data,
            _ => self.rows.len(),
        };
        Ok((header + 1..end).collect())
    }

    /// Numeric values currently in the parameter rows; blank cells are skipped.
    pub fn parameters(&self, layout: &FixtureLayout) -> Result<Vec<Decimal>, TaError> {
        let mut params = Vec::new();
        for row in self.parameter_rows(layout)? {
            match self.cell(row, layout.param_column).to_decimal() {
                None => {}
                Some(Ok(value)) => params.push(value),
                Some(Err(e)) => {
                    return Err(TaError::fixture(format!(
                        "parameter row {row} is not numeric: {e}"
                    )));
                }
            }
        }
        Ok(params)
    }
}
