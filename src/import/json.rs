use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{ImportError, Result};
use crate::import::{RawSheet, SheetSource};
use crate::models::Cell;

/// Workbook exported as JSON: `{"sheets": [{"name": ..., "values": [[...]]}]}`
pub struct JsonWorkbookSource;

#[derive(Debug, Deserialize)]
struct Workbook {
    sheets: Vec<WorkbookSheet>,
}

#[derive(Debug, Deserialize)]
struct WorkbookSheet {
    name: String,
    #[serde(default)]
    values: Vec<Vec<Cell>>,
}

impl JsonWorkbookSource {
    pub fn new() -> Self {
        Self
    }

    /// Parse workbook JSON text
    pub fn parse_str(&self, content: &str, path: &Path) -> Result<Vec<RawSheet>> {
        let workbook: Workbook =
            serde_json::from_str(content).map_err(|e| ImportError::InvalidStructure {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Ok(workbook
            .sheets
            .into_iter()
            .map(|sheet| RawSheet {
                label: sheet.name,
                rows: sheet.values,
            })
            .collect())
    }
}

impl Default for JsonWorkbookSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetSource for JsonWorkbookSource {
    fn can_import(&self, path: &Path) -> bool {
        path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("json"))
                .unwrap_or(false)
    }

    fn load_sheets(&self, path: &Path) -> Result<Vec<RawSheet>> {
        let content = fs::read_to_string(path)?;
        let sheets = self.parse_str(&content, path)?;
        tracing::debug!(path = %path.display(), sheets = sheets.len(), "loaded JSON workbook");
        Ok(sheets)
    }

    fn format_name(&self) -> &'static str {
        "JSON workbook"
    }
}
