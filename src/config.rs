// ⚙️ Configuration - view sizes and optional overrides
// Loaded from a JSON file; every field falls back to its default

use crate::error::{Result, TrackerError};
use crate::table::DEFAULT_PROGRAM_COLUMN;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rows kept in a country leaderboard
    pub leaderboard_size: usize,

    /// N used for the "top-N countries share" column of the concentration table
    pub top_share_n: usize,

    /// Destinations listed per industry in the insights view
    pub insight_destinations: usize,

    /// Other sectors pre-selected by the dashboard default filter
    pub default_other_sectors: usize,

    /// Taxonomy JSON replacing the built-in keyword tables
    pub rules_path: Option<PathBuf>,

    /// Column holding the program-membership flag
    pub program_column: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            leaderboard_size: 15,
            top_share_n: 3,
            insight_destinations: 5,
            default_other_sectors: 10,
            rules_path: None,
            program_column: DEFAULT_PROGRAM_COLUMN.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.leaderboard_size == 0 {
            return Err(TrackerError::Config(
                "leaderboard_size must be at least 1".to_string(),
            ));
        }
        if self.top_share_n == 0 {
            return Err(TrackerError::Config(
                "top_share_n must be at least 1".to_string(),
            ));
        }
        if self.program_column.trim().is_empty() {
            return Err(TrackerError::Config(
                "program_column must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}
