// Analyzer configuration: day grouping, rest threshold, distribution threshold
// and severity penalties. Every field has a default so an empty TOML file is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, Result};
use crate::schedule::types::{DayGrouping, Severity};

pub const DEFAULT_MIN_REST_MINUTES: u32 = 180;
pub const DEFAULT_DISTRIBUTION_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub day_grouping: DayGrouping,
    /// Minimum gap between a team's matches on one day
    pub min_rest_minutes: u32,
    /// How far above the per-day mean a day may go before it is flagged
    pub distribution_threshold: f64,
    pub penalties: SeverityPenalties,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            day_grouping: DayGrouping::CalendarDate,
            min_rest_minutes: DEFAULT_MIN_REST_MINUTES,
            distribution_threshold: DEFAULT_DISTRIBUTION_THRESHOLD,
            penalties: SeverityPenalties::default(),
        }
    }
}

/// Score points deducted per issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityPenalties {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl Default for SeverityPenalties {
    fn default() -> Self {
        Self {
            critical: 20,
            high: 15,
            medium: 10,
            low: 5,
        }
    }
}

impl SeverityPenalties {
    pub fn for_severity(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

impl AnalyzerConfig {
    /// Loads and validates a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents, path)
    }

    /// Loads the file when given, otherwise returns the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Self::parse(contents, Path::new("<inline>"))
    }

    fn parse(contents: &str, path: &Path) -> Result<Self> {
        let config: AnalyzerConfig =
            toml::from_str(contents).map_err(|source| AnalyzerError::ConfigParse {
                path: PathBuf::from(path),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_rest_minutes == 0 || self.min_rest_minutes >= 24 * 60 {
            return Err(AnalyzerError::InvalidConfig {
                field: "min_rest_minutes".into(),
                message: "must be between 1 and 1439".into(),
            });
        }

        if !self.distribution_threshold.is_finite() || self.distribution_threshold < 0.0 {
            return Err(AnalyzerError::InvalidConfig {
                field: "distribution_threshold".into(),
                message: "must be a non-negative number".into(),
            });
        }

        let p = &self.penalties;
        for (field, value) in [
            ("penalties.critical", p.critical),
            ("penalties.high", p.high),
            ("penalties.medium", p.medium),
            ("penalties.low", p.low),
        ] {
            if value > 100 {
                return Err(AnalyzerError::InvalidConfig {
                    field: field.into(),
                    message: "must be at most 100".into(),
                });
            }
        }

        Ok(())
    }
}
