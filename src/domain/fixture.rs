//! Reference fixture: a loaded reference sheet plus the series built from it.
//!
//! The fixture is the scoped handle to one open reference source. It is
//! created by [`ReferenceFixture::load`], owned by whoever runs the
//! verification, and dropped (or handed back) when the session ends.

use crate::domain::bar::Bar;
use crate::domain::decimal::Decimal;
use crate::domain::error::TaError;
use crate::domain::indicator::Indicator;
use crate::domain::series::TimeSeries;
use crate::domain::sheet::{Cell, FixtureLayout, Sheet};
use crate::domain::verification::assert_indicator_equals;
use crate::ports::reference_port::{NoRecalculation, Recalculator, ReferenceSource};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub struct ReferenceFixture {
    sheet: Sheet,
    layout: FixtureLayout,
    series: TimeSeries,
    labels: Vec<String>,
    recalculator: Box<dyn Recalculator>,
}

impl ReferenceFixture {
    /// Reads the source once and builds the reference series from its data
    /// section. Both header rows must be present.
    pub fn load(source: &dyn ReferenceSource, layout: FixtureLayout) -> Result<Self, TaError> {
        let sheet = source.open()?;
        Self::from_sheet(source.name(), sheet, layout)
    }

    pub fn from_sheet(
        name: &str,
        sheet: Sheet,
        layout: FixtureLayout,
    ) -> Result<Self, TaError> {
        sheet.param_header_row(&layout)?;
        let header = sheet.data_header_row(&layout)?;
        let labels = sheet
            .row(header)
            .iter()
            .map(|cell| cell.display().unwrap_or_default())
            .collect();

        let mut series = TimeSeries::new(name);
        for row in sheet.data_rows(&layout)? {
            series.add_bar(read_bar(&sheet, &layout, row)?)?;
        }

        tracing::debug!(
            fixture = name,
            rows = sheet.row_count(),
            bars = series.bar_count(),
            "loaded reference fixture"
        );
        Ok(Self {
            sheet,
            layout,
            series,
            labels,
            recalculator: Box::new(NoRecalculation),
        })
    }

    /// Replaces the engine used to refresh output cells after parameters
    /// are written.
    pub fn with_recalculator(mut self, recalculator: Box<dyn Recalculator>) -> Self {
        self.recalculator = recalculator;
        self
    }

    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn layout(&self) -> &FixtureLayout {
        &self.layout
    }

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    /// Data header cells, in column order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l.trim() == label.trim())
    }

    /// Writes `params` into consecutive rows below the parameter header, then
    /// lets the recalculator refresh the output cells.
    pub fn apply_parameters(&mut self, params: &[Decimal]) -> Result<(), TaError> {
        let rows = self.sheet.parameter_rows(&self.layout)?;
        if rows.len() < params.len() {
            return Err(TaError::fixture(format!(
                "{} parameters supplied but only {} parameter rows available",
                params.len(),
                rows.len()
            )));
        }
        for (&row, &value) in rows.iter().zip(params) {
            self.sheet
                .set_cell(row, self.layout.param_column, Cell::Number(value));
        }
        self.recalculator.recalculate(&mut self.sheet, &self.layout)?;
        tracing::debug!(fixture = self.series.name(), ?params, "applied parameters");
        Ok(())
    }

    /// The parameter values currently in the sheet.
    pub fn parameters(&self) -> Result<Vec<Decimal>, TaError> {
        self.sheet.parameters(&self.layout)
    }

    /// Expected values of `column`, one per bar. Comment rows are skipped; an
    /// empty or non-numeric cell is a format error.
    pub fn read_column(&self, column: usize) -> Result<Vec<Decimal>, TaError> {
        let label = self
            .labels
            .get(column)
            .map(String::as_str)
            .unwrap_or("output");
        let values = self
            .sheet
            .data_rows(&self.layout)?
            .into_iter()
            .map(|row| number_at(&self.sheet, row, column, label))
            .collect::<Result<Vec<_>, _>>()?;
        if values.len() != self.series.bar_count() {
            return Err(TaError::fixture(format!(
                "column {column} has {} values for {} bars",
                values.len(),
                self.series.bar_count()
            )));
        }
        Ok(values)
    }

    pub fn reference_indicator(&self, column: usize) -> Result<ReferenceIndicator<'_>, TaError> {
        Ok(ReferenceIndicator {
            series: &self.series,
            values: self.read_column(column)?,
        })
    }

    /// Compares `indicator` against `column` over the reference series and
    /// returns the number of indices checked.
    pub fn compare(
        &self,
        indicator: &dyn Indicator,
        column: usize,
        epsilon: Decimal,
    ) -> Result<usize, TaError> {
        let expected = self.reference_indicator(column)?;
        assert_indicator_equals(&expected, indicator, epsilon)
    }
}

/// Replays one expected column of a fixture as an indicator.
pub struct ReferenceIndicator<'f> {
    series: &'f TimeSeries,
    values: Vec<Decimal>,
}

impl Indicator for ReferenceIndicator<'_> {
    fn series(&self) -> &TimeSeries {
        self.series
    }

    fn value(&self, index: usize) -> Result<Decimal, TaError> {
        self.series.check_index(index)?;
        self.values
            .get(index - self.series.begin_index())
            .copied()
            .ok_or_else(|| {
                TaError::fixture(format!(
                    "no expected value at index {index}: column holds {} values",
                    self.values.len()
                ))
            })
    }
}

fn read_bar(sheet: &Sheet, layout: &FixtureLayout, row: usize) -> Result<Bar, TaError> {
    let end_time = read_date(sheet.cell(row, 0), layout)
        .ok_or_else(|| TaError::fixture(format!("row {}: unreadable date", row + 1)))?;
    Ok(Bar::new(
        layout.bar_period,
        end_time,
        number_at(sheet, row, 1, "open")?,
        number_at(sheet, row, 2, "high")?,
        number_at(sheet, row, 3, "low")?,
        number_at(sheet, row, 4, "close")?,
        number_at(sheet, row, 5, "volume")?,
    ))
}

fn number_at(sheet: &Sheet, row: usize, column: usize, what: &str) -> Result<Decimal, TaError> {
    match sheet.cell(row, column).to_decimal() {
        None => Err(TaError::fixture(format!(
            "row {}: {what} cell (column {column}) is empty",
            row + 1
        ))),
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => Err(TaError::fixture(format!("row {}: {what}: {e}", row + 1))),
    }
}

/// Midnight of the cell's date: text in the layout's format, a full
/// timestamp, or a spreadsheet serial day number.
fn read_date(cell: &Cell, layout: &FixtureLayout) -> Option<NaiveDateTime> {
    let text = cell.display()?;
    if let Ok(date) = NaiveDate::parse_from_str(&text, &layout.date_format) {
        return Some(date.and_time(NaiveTime::MIN));
    }
    if let Ok(time) = NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT) {
        return Some(time.date().and_time(NaiveTime::MIN));
    }
    match cell {
        Cell::Number(serial) => serial_date(*serial),
        _ => None,
    }
}

fn serial_date(serial: Decimal) -> Option<NaiveDateTime> {
    let days = serial.to_usize()?;
    NaiveDate::from_ymd_opt(1899, 12, 30)?
        .checked_add_days(Days::new(u64::try_from(days).ok()?))
        .map(|date| date.and_time(NaiveTime::MIN))
}
