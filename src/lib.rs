// Library interface for liftrs modules
// This allows integration tests and benches to access the core functionality

pub mod config;
pub mod correlation;
pub mod error;
pub mod heart_rate;
pub mod history;
pub mod import;
pub mod logging;
pub mod models;
pub mod muscles;
pub mod sheet;
pub mod stats;

// Re-export commonly used types for convenience
pub use models::*;
pub use config::AppConfig;
pub use correlation::{CorrelationConfig, SetHrCorrelator};
pub use error::{LiftError, Result};
pub use heart_rate::{PeakDetectionConfig, PeakDetector};
pub use history::{Change, Direction, ExerciseHistory, HistoryCalculator, HistoryComparison};
pub use import::{ImportManager, RawSheet, SheetSource};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use muscles::{CustomMappings, MuscleAttributor, MuscleCatalog, MuscleGroup};
pub use sheet::{parse_row, parse_worksheet};
pub use stats::{StatsAggregator, WorkoutStats};
