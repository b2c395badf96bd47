//! CSV reference sheet adapter.
//!
//! Every record becomes one sheet row; records may have different lengths.

use crate::domain::error::TaError;
use crate::domain::sheet::{Cell, Sheet};
use crate::ports::reference_port::ReferenceSource;
use std::fs;
use std::path::{Path, PathBuf};

enum Origin {
    File(PathBuf),
    Text(String),
}

pub struct CsvSheetSource {
    name: String,
    origin: Origin,
}

impl CsvSheetSource {
    /// The sheet is named after the file stem.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            origin: Origin::File(path),
        }
    }

    pub fn from_text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: Origin::Text(content.into()),
        }
    }
}

pub(crate) fn parse_sheet(content: &str) -> Result<Sheet, TaError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| TaError::fixture(format!("CSV parse error: {e}")))?;
        rows.push(record.iter().map(Cell::parse).collect());
    }
    Ok(Sheet::new(rows))
}

impl ReferenceSource for CsvSheetSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&self) -> Result<Sheet, TaError> {
        match &self.origin {
            Origin::File(path) => {
                let content = fs::read_to_string(path)?;
                parse_sheet(&content)
            }
            Origin::Text(content) => parse_sheet(content),
        }
    }
}
