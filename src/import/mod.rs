use crate::error::{ImportError, Result};
use crate::models::{Cell, Workout};
use crate::muscles::CustomMappings;
use crate::sheet::parse_worksheet;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

pub mod csv;
pub mod json;
pub mod streams;

pub use self::csv::CsvDirectorySource;
pub use self::json::JsonWorkbookSource;
pub use self::streams::load_hr_stream;

/// One worksheet as read from disk, before parsing
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    /// Sheet name, normally the workout date
    pub label: String,

    /// Cell grid; row 0 is the header row
    pub rows: Vec<Vec<Cell>>,
}

/// Trait for reading worksheets from different storage layouts
pub trait SheetSource {
    /// Check if this source can read the given path
    fn can_import(&self, path: &Path) -> bool;

    /// Read every worksheet at the path
    fn load_sheets(&self, path: &Path) -> Result<Vec<RawSheet>>;

    /// Get the format name for this source
    fn format_name(&self) -> &'static str;
}

/// Coordinates sheet sources and worksheet parsing
pub struct ImportManager {
    sources: Vec<Box<dyn SheetSource>>,
    custom_mappings: CustomMappings,
    show_progress: bool,
}

impl ImportManager {
    /// Create a new import manager with all available sources
    pub fn new(custom_mappings: CustomMappings) -> Self {
        let sources: Vec<Box<dyn SheetSource>> = vec![
            Box::new(JsonWorkbookSource::new()),
            Box::new(CsvDirectorySource::new()),
        ];

        Self {
            sources,
            custom_mappings,
            show_progress: false,
        }
    }

    /// Draw a progress bar on stderr while parsing multi-sheet inputs
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Read raw sheets, auto-detecting the source
    pub fn load_sheets(&self, path: &Path) -> Result<Vec<RawSheet>> {
        if !path.exists() {
            return Err(ImportError::FileNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let source = self
            .sources
            .iter()
            .find(|s| s.can_import(path))
            .ok_or_else(|| ImportError::UnsupportedFormat {
                path: path.to_path_buf(),
            })?;

        tracing::info!(path = %path.display(), format = source.format_name(), "reading worksheets");
        source.load_sheets(path)
    }

    /// Read and parse every worksheet at the path into workouts
    pub fn import(&self, path: &Path) -> Result<Vec<Workout>> {
        let sheets = self.load_sheets(path)?;

        let pb = if self.show_progress && sheets.len() > 1 {
            let pb = ProgressBar::new(sheets.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({msg})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut workouts = Vec::with_capacity(sheets.len());
        for sheet in &sheets {
            pb.set_message(sheet.label.clone());
            workouts.push(parse_worksheet(&sheet.label, &sheet.rows, &self.custom_mappings));
            pb.inc(1);
        }
        pb.finish_and_clear();

        tracing::info!(
            path = %path.display(),
            workouts = workouts.len(),
            "imported workouts"
        );
        Ok(workouts)
    }

    /// Parse the single worksheet with the given label
    pub fn import_sheet(&self, path: &Path, label: &str) -> Result<Workout> {
        let wanted = label.trim();
        self.load_sheets(path)?
            .into_iter()
            .find(|s| s.label.trim() == wanted)
            .map(|s| parse_worksheet(&s.label, &s.rows, &self.custom_mappings))
            .ok_or_else(|| {
                ImportError::SheetNotFound {
                    label: label.to_string(),
                }
                .into()
            })
    }

    /// Check if any source can read the path
    pub fn can_import(&self, path: &Path) -> bool {
        self.sources.iter().any(|s| s.can_import(path))
    }
}

impl Default for ImportManager {
    fn default() -> Self {
        Self::new(CustomMappings::new())
    }
}
