use csv::ReaderBuilder;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ImportError, Result};
use crate::import::{RawSheet, SheetSource};
use crate::models::Cell;

/// Worksheets stored as one `.csv` file per sheet.
///
/// The sheet label comes from the file stem with `-` and `_` read as `/`,
/// so `1-29-2026.csv` is the sheet `1/29/2026`. A single `.csv` file is
/// read as a one-sheet workbook.
pub struct CsvDirectorySource;

impl CsvDirectorySource {
    pub fn new() -> Self {
        Self
    }

    /// Sheet label for a CSV file path
    pub fn label_for(path: &Path) -> String {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().replace(['-', '_'], "/"))
            .unwrap_or_default()
    }

    /// Read one CSV file into a cell grid. Rows may have any length.
    pub fn read_rows<R: std::io::Read>(&self, reader: R) -> Result<Vec<Vec<Cell>>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|field| {
                        if field.is_empty() {
                            Cell::Empty
                        } else {
                            Cell::Text(field.to_string())
                        }
                    })
                    .collect(),
            );
        }
        Ok(rows)
    }

    fn load_file(&self, path: &Path) -> Result<RawSheet> {
        let file = fs::File::open(path)?;
        Ok(RawSheet {
            label: Self::label_for(path),
            rows: self.read_rows(file)?,
        })
    }

    fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_csv(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl Default for CsvDirectorySource {
    fn default() -> Self {
        Self::new()
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

impl SheetSource for CsvDirectorySource {
    fn can_import(&self, path: &Path) -> bool {
        if path.is_dir() {
            return Self::csv_files(path).map(|f| !f.is_empty()).unwrap_or(false);
        }
        path.is_file() && is_csv(path)
    }

    fn load_sheets(&self, path: &Path) -> Result<Vec<RawSheet>> {
        if path.is_file() {
            return Ok(vec![self.load_file(path)?]);
        }

        let files = Self::csv_files(path)?;
        if files.is_empty() {
            return Err(ImportError::InvalidStructure {
                path: path.to_path_buf(),
                reason: "directory contains no .csv files".to_string(),
            }
            .into());
        }

        let mut sheets = Vec::with_capacity(files.len());
        for file in &files {
            match self.load_file(file) {
                Ok(sheet) => sheets.push(sheet),
                Err(e) => {
                    tracing::warn!(file = %file.display(), error = %e, "skipping unreadable sheet");
                }
            }
        }

        tracing::debug!(path = %path.display(), sheets = sheets.len(), "loaded CSV sheets");
        Ok(sheets)
    }

    fn format_name(&self) -> &'static str {
        "CSV directory"
    }
}
