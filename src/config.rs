use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::correlation::CorrelationConfig;
use crate::error::ConfigError;
use crate::heart_rate::PeakDetectionConfig;
use crate::logging::LogConfig;
use crate::models::normalize_name;
use crate::muscles::{CustomMappings, MuscleCatalog, MuscleGroup};

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Muscle attribution overrides
    #[serde(default)]
    pub muscles: MuscleSettings,

    /// Heart-rate peak detection tuning
    #[serde(default)]
    pub peaks: PeakDetectionConfig,

    /// Set / peak correlation tuning
    #[serde(default)]
    pub correlation: CorrelationConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// User-defined muscle mappings and groups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MuscleSettings {
    /// Normalized exercise name -> muscle group ids
    pub custom_mappings: CustomMappings,

    /// Extra or replacement muscle groups
    pub custom_groups: Vec<MuscleGroup>,
}

impl MuscleSettings {
    /// Catalog with the custom groups merged in
    pub fn catalog(&self) -> MuscleCatalog {
        MuscleCatalog::with_custom(&self.custom_groups)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            muscles: MuscleSettings::default(),
            peaks: PeakDetectionConfig::default(),
            correlation: CorrelationConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            reason: e.to_string(),
        })?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        tracing::debug!(path = %path.as_ref().display(), "saved configuration");
        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".liftrs")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(
                    path = %config_path.display(),
                    error = %e,
                    "no usable config file, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Map an exercise name to muscle group ids, replacing any previous
    /// mapping. The name is stored normalized.
    pub fn set_custom_mapping(&mut self, exercise: &str, groups: Vec<String>) -> Result<()> {
        let key = normalize_name(exercise);
        if key.is_empty() {
            return Err(ConfigError::InvalidMapping {
                entry: exercise.to_string(),
            }
            .into());
        }

        let catalog = self.muscles.catalog();
        for id in groups.iter().filter(|id| catalog.get(id).is_none()) {
            tracing::warn!(exercise = %key, group = %id, "mapping refers to an unknown muscle group");
        }

        self.muscles.custom_mappings.insert(key, groups);
        Ok(())
    }

    /// Remove a custom mapping. Returns whether one existed.
    pub fn remove_custom_mapping(&mut self, exercise: &str) -> bool {
        self.muscles
            .custom_mappings
            .shift_remove(&normalize_name(exercise))
            .is_some()
    }

    /// Add a muscle group, replacing any existing custom group with the same id
    pub fn add_custom_group(&mut self, group: MuscleGroup) {
        match self
            .muscles
            .custom_groups
            .iter_mut()
            .find(|g| g.id == group.id)
        {
            Some(existing) => *existing = group,
            None => self.muscles.custom_groups.push(group),
        }
    }
}

/// Parse a `name=id1,id2` mapping entry
pub fn parse_mapping_entry(entry: &str) -> std::result::Result<(String, Vec<String>), ConfigError> {
    let invalid = || ConfigError::InvalidMapping {
        entry: entry.to_string(),
    };

    let (name, ids) = entry.split_once('=').ok_or_else(invalid)?;
    let name = name.trim();
    let ids: Vec<String> = ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();

    if name.is_empty() || ids.is_empty() {
        return Err(invalid());
    }

    Ok((name.to_string(), ids))
}
