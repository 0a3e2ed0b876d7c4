use log::warn;
use serde::{Deserialize, Serialize};

use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::heuristic::ScoringWeights;
use crate::{HEIGHT, WIDTH};

/// The config file read by the binary when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "connect4.toml";

/// Search depths and limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Plies searched by the minimax engine when choosing a move
    pub minimax_depth: usize,
    /// Largest ply budget of the forced-win solver
    pub mate_depth: usize,
    /// Plies searched per candidate when ranking moves
    pub ranking_depth: usize,
    /// Wall-clock limit for the forced-win solver, checked between depths
    pub time_limit_ms: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            minimax_depth: 5,
            mate_depth: 8,
            ranking_depth: 3,
            time_limit_ms: None,
        }
    }
}

impl SearchConfig {
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}

/// Top-level analysis configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub search: SearchConfig,
    pub weights: ScoringWeights,
}

impl AnalysisConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.minimax_depth == 0 {
            return Err(ConfigError::Validation(
                "search.minimax_depth must be > 0".into(),
            ));
        }
        if self.search.ranking_depth == 0 {
            return Err(ConfigError::Validation(
                "search.ranking_depth must be > 0".into(),
            ));
        }
        if self.search.mate_depth == 0 || self.search.mate_depth > WIDTH * HEIGHT {
            return Err(ConfigError::Validation(format!(
                "search.mate_depth must be in [1, {}]",
                WIDTH * HEIGHT
            )));
        }
        if self.weights.likely_win_margin < 0 {
            return Err(ConfigError::Validation(
                "weights.likely_win_margin must be >= 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AnalysisConfig::from_toml(
            "[search]\nmate_depth = 10\n\n[weights]\nopponent_three = -4\n",
        )
        .unwrap();
        assert_eq!(config.search.mate_depth, 10);
        assert_eq!(config.search.minimax_depth, 5);
        assert_eq!(config.weights.opponent_three, -4);
        assert_eq!(config.weights.three, 5);
        assert_eq!(config.weights.likely_win_margin, 20);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(AnalysisConfig::from_toml("").unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn rejects_out_of_range_mate_depth() {
        let err = AnalysisConfig::from_toml("[search]\nmate_depth = 50\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = AnalysisConfig::from_toml("[search\nmate_depth = 4").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config =
            AnalysisConfig::load_or_default(Path::new("does/not/exist/connect4.toml")).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }
}
