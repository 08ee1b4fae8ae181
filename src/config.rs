//! Activity log configuration
//!
//! Every field has a default, so a partial JSON document (or none at all)
//! yields a usable configuration.

use crate::error::{ActivityError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Retention, query and detection settings for an `ActivityLog`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggerConfig {
    /// Size above which an append triggers an archival pass
    pub max_records: usize,

    /// Records kept by an archival pass (the most recent ones)
    pub retained_records: usize,

    /// Default limit for per-user queries
    pub user_query_limit: usize,

    /// Default limit for filtered queries
    pub query_limit: usize,

    /// Redact secret-looking keys in `detail` on append
    pub redact_detail: bool,

    pub detector: DetectorConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            max_records: 10_000,
            retained_records: 5_000,
            user_query_limit: 50,
            query_limit: 100,
            redact_detail: true,
            detector: DetectorConfig::default(),
        }
    }
}

/// Thresholds and windows of the suspicious-activity heuristics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectorConfig {
    /// Most recent records of the user considered per evaluation
    pub sample_size: usize,

    pub failed_login_threshold: usize,
    pub failed_login_window_minutes: i64,

    pub distinct_source_threshold: usize,
    pub source_window_minutes: i64,

    pub critical_action_threshold: usize,
    pub critical_window_minutes: i64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sample_size: 100,
            failed_login_threshold: 5,
            failed_login_window_minutes: 30,
            distinct_source_threshold: 3,
            source_window_minutes: 60,
            critical_action_threshold: 2,
            critical_window_minutes: 60,
        }
    }
}

impl LoggerConfig {
    /// Load configuration from a JSON file
    ///
    /// A missing file yields the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No activity log config file, using defaults");
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path).map_err(|e| ActivityError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        let config = Self::from_json(&json).map_err(|e| {
            ActivityError::Config(format!(
                "Failed to load config file {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::debug!(
            path = %path.display(),
            max_records = config.max_records,
            retained_records = config.retained_records,
            "Activity log config loaded"
        );
        Ok(config)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.max_records == 0 {
            return Err(ActivityError::Config("maxRecords must be >= 1".to_string()));
        }
        if self.retained_records == 0 {
            return Err(ActivityError::Config(
                "retainedRecords must be >= 1".to_string(),
            ));
        }
        if self.retained_records > self.max_records {
            return Err(ActivityError::Config(format!(
                "retainedRecords ({}) must not exceed maxRecords ({})",
                self.retained_records, self.max_records
            )));
        }
        if self.user_query_limit == 0 || self.query_limit == 0 {
            return Err(ActivityError::Config(
                "Query limits must be >= 1".to_string(),
            ));
        }
        self.detector.validate()
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_size == 0 {
            return Err(ActivityError::Config(
                "detector.sampleSize must be >= 1".to_string(),
            ));
        }
        if self.failed_login_threshold == 0
            || self.distinct_source_threshold == 0
            || self.critical_action_threshold == 0
        {
            return Err(ActivityError::Config(
                "Detector thresholds must be >= 1".to_string(),
            ));
        }
        if self.failed_login_window_minutes <= 0
            || self.source_window_minutes <= 0
            || self.critical_window_minutes <= 0
        {
            return Err(ActivityError::Config(
                "Detector windows must be positive".to_string(),
            ));
        }
        for (name, minutes) in [
            ("failedLoginWindowMinutes", self.failed_login_window_minutes),
            ("sourceWindowMinutes", self.source_window_minutes),
            ("criticalWindowMinutes", self.critical_window_minutes),
        ] {
            if chrono::Duration::try_minutes(minutes).is_none() {
                return Err(ActivityError::Config(format!(
                    "detector.{} is out of range: {}",
                    name, minutes
                )));
            }
        }
        Ok(())
    }
}
