use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_QUERY_MARKER: &str = "Query";
pub const DEFAULT_CONNECT_MARKER: &str = "Connect";
pub const DEFAULT_THRESHOLD: i64 = 80;
pub const MAX_THRESHOLD: u8 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("fuzzy mode requires a threshold in 0..=100, got {}", describe(.value))]
    InvalidThreshold { value: Option<i64> },
    #[error("query marker must not be empty")]
    EmptyMarker,
}

fn describe(value: &Option<i64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "none".to_string(),
    }
}

/// Minimum similarity score (exclusive) a fragment needs to join an existing fuzzy group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Threshold(u8);

impl Threshold {
    pub fn new(value: i64) -> Result<Self, ConfigError> {
        if (0..=MAX_THRESHOLD as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ConfigError::InvalidThreshold { value: Some(value) })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Aggregation strategy as requested by the caller. The fuzzy threshold is kept raw
/// here and validated by [`AnalysisConfig::validate`] before any input is consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AggregationMode {
    #[default]
    Exact,
    Fuzzy { threshold: Option<i64> },
}

/// Validated form of [`AggregationMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Strategy {
    Exact,
    Fuzzy { threshold: Threshold },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawConfig")]
pub struct AnalysisConfig {
    /// Literal token that introduces a query fragment (case sensitive, first occurrence).
    pub marker: String,
    /// Marker of connection lines. Reserved: not read by the analysis path.
    pub connect_marker: String,
    #[serde(flatten)]
    pub mode: AggregationMode,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_QUERY_MARKER.to_string(),
            connect_marker: DEFAULT_CONNECT_MARKER.to_string(),
            mode: AggregationMode::Exact,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum ModeName {
    Exact,
    Fuzzy,
}

/// Wire form of [`AnalysisConfig`]: every field optional, `mode` defaults to exact.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    marker: Option<String>,
    #[serde(default)]
    connect_marker: Option<String>,
    #[serde(default)]
    mode: Option<ModeName>,
    #[serde(default)]
    threshold: Option<i64>,
}

impl From<RawConfig> for AnalysisConfig {
    fn from(raw: RawConfig) -> Self {
        let mode = match raw.mode {
            None | Some(ModeName::Exact) => AggregationMode::Exact,
            Some(ModeName::Fuzzy) => AggregationMode::Fuzzy { threshold: raw.threshold },
        };
        Self {
            marker: raw.marker.unwrap_or_else(|| DEFAULT_QUERY_MARKER.to_string()),
            connect_marker: raw.connect_marker.unwrap_or_else(|| DEFAULT_CONNECT_MARKER.to_string()),
            mode,
        }
    }
}

impl AnalysisConfig {
    pub fn exact() -> Self {
        Self::default()
    }

    pub fn fuzzy(threshold: i64) -> Self {
        Self { mode: AggregationMode::Fuzzy { threshold: Some(threshold) }, ..Self::default() }
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn with_mode(mut self, mode: AggregationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> Result<Strategy, ConfigError> {
        if self.marker.is_empty() {
            return Err(ConfigError::EmptyMarker);
        }
        match self.mode {
            AggregationMode::Exact => Ok(Strategy::Exact),
            AggregationMode::Fuzzy { threshold: Some(t) } => {
                Ok(Strategy::Fuzzy { threshold: Threshold::new(t)? })
            }
            AggregationMode::Fuzzy { threshold: None } => {
                Err(ConfigError::InvalidThreshold { value: None })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_bounds_are_inclusive() {
        assert_eq!(Threshold::new(0).unwrap().get(), 0);
        assert_eq!(Threshold::new(100).unwrap().get(), 100);
        assert_eq!(
            Threshold::new(101),
            Err(ConfigError::InvalidThreshold { value: Some(101) })
        );
        assert_eq!(
            Threshold::new(-1),
            Err(ConfigError::InvalidThreshold { value: Some(-1) })
        );
    }

    #[test]
    fn fuzzy_without_threshold_is_rejected() {
        let cfg = AnalysisConfig::default().with_mode(AggregationMode::Fuzzy { threshold: None });
        let err = cfg.validate().unwrap_err();
        assert_eq!(err, ConfigError::InvalidThreshold { value: None });
        assert_eq!(err.to_string(), "fuzzy mode requires a threshold in 0..=100, got none");
    }

    #[test]
    fn exact_mode_needs_no_threshold() {
        assert_eq!(AnalysisConfig::exact().validate(), Ok(Strategy::Exact));
    }

    #[test]
    fn empty_marker_is_rejected() {
        let cfg = AnalysisConfig::exact().with_marker("");
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyMarker));
    }

    #[test]
    fn config_deserializes_from_json_with_defaults() {
        let cfg: AnalysisConfig =
            serde_json::from_str(r#"{"mode":"fuzzy","threshold":75}"#).unwrap();
        assert_eq!(cfg.marker, DEFAULT_QUERY_MARKER);
        assert_eq!(cfg.connect_marker, DEFAULT_CONNECT_MARKER);
        assert_eq!(cfg.mode, AggregationMode::Fuzzy { threshold: Some(75) });
        assert_eq!(
            cfg.validate().unwrap(),
            Strategy::Fuzzy { threshold: Threshold::new(75).unwrap() }
        );
    }

    #[test]
    fn config_without_mode_deserializes_as_exact() {
        let empty: AnalysisConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, AnalysisConfig::default());

        let marker_only: AnalysisConfig = serde_json::from_str(r#"{"marker":"Execute"}"#).unwrap();
        assert_eq!(marker_only, AnalysisConfig::exact().with_marker("Execute"));
        assert_eq!(marker_only.validate(), Ok(Strategy::Exact));
    }

    #[test]
    fn fuzzy_config_without_threshold_fails_validation_not_parsing() {
        let cfg: AnalysisConfig = serde_json::from_str(r#"{"mode":"fuzzy"}"#).unwrap();
        assert_eq!(cfg.mode, AggregationMode::Fuzzy { threshold: None });
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidThreshold { value: None }));
    }

    #[test]
    fn config_serialization_round_trips() {
        let cfg = AnalysisConfig::fuzzy(60).with_marker("Execute");
        let json = serde_json::to_string(&cfg).unwrap();
        let back: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
