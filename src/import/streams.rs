use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{ImportError, Result};
use crate::models::HrStream;

/// A series either as a bare array or wrapped as `{"data": [...]}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Series {
    Flat(Vec<f64>),
    Nested { data: Vec<f64> },
}

impl Series {
    fn into_values(self) -> Vec<f64> {
        match self {
            Series::Flat(values) => values,
            Series::Nested { data } => data,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StreamFile {
    time: Option<Series>,
    heartrate: Option<Series>,
}

/// Load a heart-rate stream from a JSON file.
///
/// Accepts `{"time": [...], "heartrate": [...]}` or the activity-streams
/// shape `{"time": {"data": [...]}, "heartrate": {"data": [...]}}`.
pub fn load_hr_stream(path: &Path) -> Result<HrStream> {
    if !path.exists() {
        return Err(ImportError::FileNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }

    let content = fs::read_to_string(path)?;
    let stream = parse_hr_stream(&content, path)?;
    tracing::debug!(path = %path.display(), samples = stream.len(), "loaded heart-rate stream");
    Ok(stream)
}

/// Parse heart-rate stream JSON text
pub fn parse_hr_stream(content: &str, path: &Path) -> Result<HrStream> {
    let file: StreamFile =
        serde_json::from_str(content).map_err(|e| ImportError::InvalidStructure {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let time = file.time.ok_or_else(|| ImportError::MissingStream {
        stream: "time".to_string(),
    })?;
    let heartrate = file.heartrate.ok_or_else(|| ImportError::MissingStream {
        stream: "heartrate".to_string(),
    })?;

    let (time, heartrate) = (time.into_values(), heartrate.into_values());
    if time.len() != heartrate.len() {
        tracing::warn!(
            time = time.len(),
            heartrate = heartrate.len(),
            "stream lengths differ, truncating to the shorter"
        );
    }

    Ok(HrStream::new(time, heartrate))
}
