//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Head-to-head classification thresholds, in whole percentage points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupConfig {
    /// Minimum head-to-head games before a matchup is classified
    #[serde(default = "default_min_games")]
    pub min_games: u32,

    /// Focus side win rate at or above which a matchup is favourable
    #[serde(default = "default_strong_pct")]
    pub strong_pct: u32,

    /// Focus side win rate at or below which a matchup is unfavourable
    #[serde(default = "default_weak_pct")]
    pub weak_pct: u32,

    #[serde(default = "default_strong_advantage")]
    pub strong_advantage: u32,

    #[serde(default = "default_moderate_advantage")]
    pub moderate_advantage: u32,
}

fn default_min_games() -> u32 {
    2
}

fn default_strong_pct() -> u32 {
    60
}

fn default_weak_pct() -> u32 {
    40
}

fn default_strong_advantage() -> u32 {
    25
}

fn default_moderate_advantage() -> u32 {
    15
}

impl Default for MatchupConfig {
    fn default() -> Self {
        Self {
            min_games: default_min_games(),
            strong_pct: default_strong_pct(),
            weak_pct: default_weak_pct(),
            strong_advantage: default_strong_advantage(),
            moderate_advantage: default_moderate_advantage(),
        }
    }
}

/// Timing suppression and tendency bands.
///
/// Positions up to `*_early_max` are early, up to `*_mid_max` mid, and
/// anything later is late. Picks and bans use separate bands because a side
/// makes more picks than bans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Minimum combined pick+ban occurrences for an entity to be reported
    #[serde(default = "default_min_occurrences")]
    pub min_occurrences: u32,

    #[serde(default = "default_pick_early_max")]
    pub pick_early_max: u32,

    #[serde(default = "default_pick_mid_max")]
    pub pick_mid_max: u32,

    #[serde(default = "default_ban_early_max")]
    pub ban_early_max: u32,

    #[serde(default = "default_ban_mid_max")]
    pub ban_mid_max: u32,
}

fn default_min_occurrences() -> u32 {
    5
}

fn default_pick_early_max() -> u32 {
    4
}

fn default_pick_mid_max() -> u32 {
    8
}

fn default_ban_early_max() -> u32 {
    2
}

fn default_ban_mid_max() -> u32 {
    4
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            min_occurrences: default_min_occurrences(),
            pick_early_max: default_pick_early_max(),
            pick_mid_max: default_pick_mid_max(),
            ban_early_max: default_ban_early_max(),
            ban_mid_max: default_ban_mid_max(),
        }
    }
}

/// How many rows each relational list shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayLimits {
    #[serde(default = "default_pairings_limit")]
    pub pairings: usize,

    #[serde(default = "default_responses_limit")]
    pub responses: usize,

    #[serde(default = "default_matchups_limit")]
    pub matchups: usize,
}

fn default_pairings_limit() -> usize {
    5
}

fn default_responses_limit() -> usize {
    10
}

fn default_matchups_limit() -> usize {
    8
}

impl Default for DisplayLimits {
    fn default() -> Self {
        Self {
            pairings: default_pairings_limit(),
            responses: default_responses_limit(),
            matchups: default_matchups_limit(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub matchup: MatchupConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub limits: DisplayLimits,
}

/// Catalog loading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Group names matched against entity names when no group is given
    #[serde(default = "default_groups")]
    pub groups: Vec<String>,
}

fn default_groups() -> Vec<String> {
    [
        "Yi Sang",
        "Faust",
        "Don Quixote",
        "Ryōshū",
        "Meursault",
        "Hong Lu",
        "Heathcliff",
        "Ishmael",
        "Rodion",
        "Sinclair",
        "Outis",
        "Gregor",
    ]
    .iter()
    .map(|g| g.to_string())
    .collect()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            groups: default_groups(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            server: ServerConfig::default(),
            analysis: AnalysisConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        let matchup = &self.analysis.matchup;
        if matchup.min_games == 0 {
            return Err(ConfigError::ValidationError(
                "Matchup min_games must be at least 1".to_string(),
            ));
        }
        if matchup.weak_pct >= matchup.strong_pct || matchup.strong_pct > 100 {
            return Err(ConfigError::ValidationError(format!(
                "Matchup thresholds must satisfy weak_pct < strong_pct <= 100 (got {} / {})",
                matchup.weak_pct, matchup.strong_pct
            )));
        }
        if matchup.moderate_advantage > matchup.strong_advantage {
            return Err(ConfigError::ValidationError(
                "moderate_advantage must not exceed strong_advantage".to_string(),
            ));
        }

        let timing = &self.analysis.timing;
        if timing.pick_early_max >= timing.pick_mid_max {
            return Err(ConfigError::ValidationError(
                "Pick bands must satisfy pick_early_max < pick_mid_max".to_string(),
            ));
        }
        if timing.ban_early_max >= timing.ban_mid_max {
            return Err(ConfigError::ValidationError(
                "Ban bands must satisfy ban_early_max < ban_mid_max".to_string(),
            ));
        }

        Ok(())
    }
}
