//! Runtime configuration.
//!
//! ```yaml
//! analysis_timeout: 10s
//! max_concurrency: 4
//! frozen_now: "2024-06-01T12:00:00"
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::RuntimeError;

/// How the runtime schedules analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Wall-clock budget for one analysis
    #[serde(with = "duration_human")]
    pub analysis_timeout: Duration,

    /// Records analyzed at once in a batch
    pub max_concurrency: usize,

    /// Evaluation instant to use instead of the current time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frozen_now: Option<NaiveDateTime>,
}

mod duration_human {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            analysis_timeout: Duration::from_secs(10),
            max_concurrency: 4,
            frozen_now: None,
        }
    }
}

impl RuntimeConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.analysis_timeout = timeout;
        self
    }

    pub fn with_frozen_now(mut self, now: NaiveDateTime) -> Self {
        self.frozen_now = Some(now);
        self
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, RuntimeError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| RuntimeError::Config(e.to_string()))?;
        config.validate()
    }

    pub fn from_json(json: &str) -> Result<Self, RuntimeError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RuntimeError::Config(e.to_string()))?;
        config.validate()
    }

    /// Load from a file, choosing the parser by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| RuntimeError::Config(format!("{}: {}", path.display(), e)))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    fn validate(self) -> Result<Self, RuntimeError> {
        if self.max_concurrency == 0 {
            return Err(RuntimeError::Config(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.analysis_timeout.is_zero() {
            return Err(RuntimeError::Config(
                "analysis_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(self)
    }
}
