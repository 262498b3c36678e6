//! Run configuration.
//!
//! Loaded once from YAML at start-up, validated, and then passed by reference into
//! every component. Every section has defaults, so an empty file is a valid
//! configuration. Secrets are never read from here; the Slack section only names the
//! environment variable holding the webhook.
//!
//! ```yaml
//! thresholds:
//!   volume_multiple_median: 3.0
//!   volume_multiple_mean: 2.5
//!   lookback_days: 20
//! correlation:
//!   window_hours: 36
//!   exclude_time_start_et: "09:30"
//!   exclude_time_end_et: "16:00"
//! exclusions:
//!   sectors: ["Health Care", "Healthcare"]
//!   keywords: ["biotech", "clinical", "trial"]
//!   tickers_denylist_path: config/denylist.txt
//! universe:
//!   mode: watchlist
//!   watchlist: [AAPL, MSFT]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::market_hours::EasternSession;
use crate::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Upper bound for `pipeline.concurrency`.
pub const MAX_CONCURRENCY: usize = 256;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub thresholds: ThresholdConfig,
    pub correlation: CorrelationConfig,
    pub exclusions: ExclusionConfig,
    pub universe: UniverseConfig,
    pub pipeline: PipelineConfig,
    pub slack: SlackConfig,
    pub report: ReportConfig,
}

/// Spike test parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdConfig {
    pub volume_multiple_median: f64,
    pub volume_multiple_mean: f64,
    pub lookback_days: usize,
    /// Liquidity floor on the current session's volume. 0 disables it.
    pub min_abs_volume: u64,
    /// Minimum absolute close-to-close move in percent. 0 disables it.
    pub min_abs_pct_move: f64,
    /// A trailing median or mean below this many shares is no baseline at all;
    /// the session is reported with zero ratios and is never a spike.
    pub min_baseline_volume: u64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            volume_multiple_median: 3.0,
            volume_multiple_mean: 2.5,
            lookback_days: 20,
            min_abs_volume: 0,
            min_abs_pct_move: 0.0,
            min_baseline_volume: 1_000,
        }
    }
}

/// Press-release matching window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorrelationConfig {
    pub window_hours: u32,
    /// When non-empty, a headline or summary must contain one of these (case-insensitive)
    /// for the item to count as a release.
    pub required_keywords: Vec<String>,
    /// With `exclude_time_end_et`, an `HH:MM` Eastern range. Weekday releases
    /// published inside it are ignored.
    pub exclude_time_start_et: Option<String>,
    pub exclude_time_end_et: Option<String>,
    /// YAML map of company name to ticker, used when a wire item carries no symbol.
    pub company_names_path: Option<PathBuf>,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            window_hours: 36,
            required_keywords: Vec::new(),
            exclude_time_start_et: None,
            exclude_time_end_et: None,
            company_names_path: None,
        }
    }
}

impl CorrelationConfig {
    /// The configured exclusion range; both bounds or neither must be set.
    pub fn excluded_session(&self) -> Result<Option<EasternSession>, ConfigError> {
        match (&self.exclude_time_start_et, &self.exclude_time_end_et) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => EasternSession::parse(start, end).map(Some),
            (Some(_), None) => Err(ConfigError::invalid(
                "correlation.exclude_time_end_et",
                "required when exclude_time_start_et is set",
            )),
            (None, Some(_)) => Err(ConfigError::invalid(
                "correlation.exclude_time_start_et",
                "required when exclude_time_end_et is set",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExclusionConfig {
    pub sectors: Vec<String>,
    pub keywords: Vec<String>,
    pub tickers_denylist_path: Option<PathBuf>,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            sectors: vec![String::from("Health Care"), String::from("Healthcare")],
            keywords: vec![
                String::from("biotech"),
                String::from("clinical"),
                String::from("trial"),
            ],
            tickers_denylist_path: Some(PathBuf::from("config/denylist.txt")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniverseMode {
    #[default]
    Watchlist,
    File,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UniverseConfig {
    pub mode: UniverseMode,
    pub watchlist: Vec<String>,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Tickers evaluated at once, at most [`MAX_CONCURRENCY`]. 1 is strictly sequential.
    pub concurrency: usize,
    /// Outbound provider requests per second, shared by all tasks.
    pub requests_per_second: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            requests_per_second: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlackConfig {
    pub webhook_env_var: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            webhook_env_var: String::from("SLACK_WEBHOOK_URL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub out_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
        }
    }
}

impl ScanConfig {
    /// Reads, parses and validates a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content, &path.display().to_string())
    }

    /// Parses and validates YAML text. `origin` names the input in error messages.
    pub fn from_yaml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
                path: origin.to_owned(),
                source,
            })?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let thresholds = &self.thresholds;
        validate_multiple("thresholds.volume_multiple_median", thresholds.volume_multiple_median)?;
        validate_multiple("thresholds.volume_multiple_mean", thresholds.volume_multiple_mean)?;
        if thresholds.lookback_days == 0 {
            return Err(ConfigError::invalid(
                "thresholds.lookback_days",
                "must be at least 1",
            ));
        }
        if !thresholds.min_abs_pct_move.is_finite() || thresholds.min_abs_pct_move < 0.0 {
            return Err(ConfigError::invalid(
                "thresholds.min_abs_pct_move",
                format!("must be a finite non-negative number, got {}", thresholds.min_abs_pct_move),
            ));
        }

        if self.correlation.window_hours == 0 {
            return Err(ConfigError::invalid(
                "correlation.window_hours",
                "must be at least 1",
            ));
        }
        validate_terms("correlation.required_keywords", &self.correlation.required_keywords)?;
        self.correlation.excluded_session()?;

        validate_terms("exclusions.sectors", &self.exclusions.sectors)?;
        validate_terms("exclusions.keywords", &self.exclusions.keywords)?;

        if self.universe.mode == UniverseMode::File && self.universe.path.is_none() {
            return Err(ConfigError::invalid(
                "universe.path",
                "required when universe.mode is 'file'",
            ));
        }

        if self.pipeline.concurrency == 0 || self.pipeline.concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::invalid(
                "pipeline.concurrency",
                format!(
                    "must be between 1 and {MAX_CONCURRENCY}, got {}",
                    self.pipeline.concurrency
                ),
            ));
        }
        if self.pipeline.requests_per_second == 0 {
            return Err(ConfigError::invalid(
                "pipeline.requests_per_second",
                "must be at least 1",
            ));
        }

        if self.slack.webhook_env_var.trim().is_empty() {
            return Err(ConfigError::invalid(
                "slack.webhook_env_var",
                "must name an environment variable",
            ));
        }

        Ok(())
    }
}

fn validate_multiple(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::invalid(
            field,
            format!("must be a finite number greater than zero, got {value}"),
        ));
    }
    Ok(())
}

fn validate_terms(field: &'static str, terms: &[String]) -> Result<(), ConfigError> {
    if let Some(position) = terms.iter().position(|term| term.trim().is_empty()) {
        return Err(ConfigError::invalid(
            field,
            format!("entry {position} is blank"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ScanConfig::from_yaml_str("", "inline").expect("defaults are valid");
        assert_eq!(config, ScanConfig::default());
        assert_eq!(config.thresholds.lookback_days, 20);
        assert_eq!(config.correlation.window_hours, 36);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = ScanConfig::from_yaml_str(
            "thresholds:\n  volume_multiple_median: 4.0\n",
            "inline",
        )
        .expect("valid");
        assert_eq!(config.thresholds.volume_multiple_median, 4.0);
        assert_eq!(config.thresholds.volume_multiple_mean, 2.5);
    }

    #[test]
    fn rejects_non_positive_multiple() {
        let err = ScanConfig::from_yaml_str(
            "thresholds:\n  volume_multiple_mean: 0\n",
            "inline",
        )
        .expect_err("must fail");
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "thresholds.volume_multiple_mean",
                ..
            }
        ));
    }

    #[test]
    fn rejects_unknown_threshold_key() {
        let err = ScanConfig::from_yaml_str(
            "thresholds:\n  volume_multiple_medain: 3.0\n",
            "inline",
        )
        .expect_err("typo must fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn file_universe_requires_path() {
        let err = ScanConfig::from_yaml_str("universe:\n  mode: file\n", "inline")
            .expect_err("must fail");
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "universe.path",
                ..
            }
        ));
    }

    #[test]
    fn rejects_blank_keyword() {
        let err = ScanConfig::from_yaml_str(
            "exclusions:\n  keywords: [biotech, '  ']\n",
            "inline",
        )
        .expect_err("must fail");
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "exclusions.keywords",
                ..
            }
        ));
    }

    #[test]
    fn concurrency_is_bounded() {
        let at_limit = format!("pipeline:\n  concurrency: {MAX_CONCURRENCY}\n");
        assert!(ScanConfig::from_yaml_str(&at_limit, "inline").is_ok());

        let err = ScanConfig::from_yaml_str("pipeline:\n  concurrency: 1000000\n", "inline")
            .expect_err("must fail");
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "pipeline.concurrency",
                ..
            }
        ));
    }

    #[test]
    fn exclusion_range_needs_both_bounds() {
        let config = ScanConfig::from_yaml_str(
            "correlation:\n  exclude_time_start_et: '09:30'\n  exclude_time_end_et: '16:00'\n",
            "inline",
        )
        .expect("valid");
        assert_eq!(
            config.correlation.excluded_session().expect("valid"),
            Some(EasternSession::REGULAR)
        );

        let err = ScanConfig::from_yaml_str("correlation:\n  exclude_time_start_et: '09:30'\n", "inline")
            .expect_err("must fail");
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "correlation.exclude_time_end_et",
                ..
            }
        ));
    }
}
