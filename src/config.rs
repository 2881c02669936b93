//! Configuration management with validation and defaults
//!
//! Every tunable of a game session lives here: the roster, the coin economy,
//! the countdown lengths and the rule that generates the question deck. The
//! configuration is fixed once the engine is built.

use crate::errors::{ConfigurationError, QuizResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

/// Answer time used when a difficulty has no configured window
pub const FALLBACK_ANSWER_SECONDS: u32 = 20;

/// Complete session configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct QuizConfig {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub deck: DeckConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
}

/// Roster and coin economy
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub players: Vec<String>,
    pub starting_balance: i64,
    /// Number of questions asked before the game ends
    pub question_quota: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: ["Vincent", "Eric", "Tony", "Bright"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
            starting_balance: 5,
            question_quota: 20,
        }
    }
}

/// Suggested answer time for one difficulty level
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerWindow {
    pub difficulty: u8,
    pub seconds: u32,
}

/// Countdown lengths for the betting and answer windows
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub betting_seconds: u32,
    /// Ticks at or below this many remaining seconds raise a warning alert
    pub warning_seconds: u32,
    pub default_answer_seconds: u32,
    pub answer_windows: Vec<AnswerWindow>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            betting_seconds: 20,
            warning_seconds: 5,
            default_answer_seconds: FALLBACK_ANSWER_SECONDS,
            answer_windows: vec![
                AnswerWindow { difficulty: 1, seconds: 15 },
                AnswerWindow { difficulty: 2, seconds: 30 },
                AnswerWindow { difficulty: 3, seconds: 45 },
                AnswerWindow { difficulty: 4, seconds: 60 },
            ],
        }
    }
}

impl TimingConfig {
    /// Suggested answer time for a difficulty, falling back to the default
    pub fn answer_seconds(&self, difficulty: u8) -> u32 {
        self.answer_windows
            .iter()
            .find(|w| w.difficulty == difficulty)
            .map(|w| w.seconds)
            .unwrap_or(self.default_answer_seconds)
    }
}

/// A question listed explicitly in the configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntry {
    pub label: String,
    pub difficulty: u8,
}

/// Rule for building the question deck
///
/// With no explicit `questions`, the deck is the cross product of
/// `identifiers` numbered labels and `difficulties`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeckConfig {
    pub label_prefix: String,
    pub identifiers: u32,
    pub difficulties: Vec<u8>,
    /// Shuffle seed; a fresh one is drawn per session when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<QuestionEntry>,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            label_prefix: "Question".to_string(),
            identifiers: 5,
            difficulties: vec![1, 2, 3, 4],
            seed: None,
            questions: Vec::new(),
        }
    }
}

impl DeckConfig {
    /// Number of distinct questions the rule produces
    pub fn deck_size(&self) -> usize {
        if self.questions.is_empty() {
            self.identifiers as usize * self.difficulties.len()
        } else {
            self.questions.len()
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AlertConfig {
    /// Ring the terminal bell on countdown warnings and window changes
    pub bell: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self { bell: true }
    }
}

impl QuizConfig {
    /// The classroom setup: four players, five coins each, twenty questions
    pub fn classroom() -> Self {
        Self::default()
    }

    /// Short windows and a small quota for demos and tests
    pub fn quick_round() -> Self {
        Self {
            game: GameConfig {
                players: vec!["Ada".to_string(), "Ben".to_string()],
                starting_balance: 5,
                question_quota: 3,
            },
            timing: TimingConfig {
                betting_seconds: 3,
                warning_seconds: 1,
                default_answer_seconds: 5,
                answer_windows: Vec::new(),
            },
            deck: DeckConfig {
                identifiers: 1,
                difficulties: vec![1, 2, 3],
                seed: Some(7),
                ..Default::default()
            },
            alerts: AlertConfig { bell: false },
        }
    }

    /// Validate configuration for logical consistency
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.game.players.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "game.players must name at least one player".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.game.players {
            if name.trim().is_empty() || name.contains(char::is_whitespace) {
                return Err(ConfigValidationError::InvalidValue(format!(
                    "player name '{}' must be a single non-empty word",
                    name
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigValidationError::InvalidValue(format!(
                    "player name '{}' appears twice",
                    name
                )));
            }
        }

        if self.game.starting_balance < 0 {
            return Err(ConfigValidationError::InvalidValue(
                "starting_balance must be >= 0".to_string(),
            ));
        }

        if self.game.question_quota == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "question_quota must be > 0".to_string(),
            ));
        }

        if self.timing.betting_seconds == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "betting_seconds must be > 0".to_string(),
            ));
        }

        if self.timing.default_answer_seconds == 0
            || self.timing.answer_windows.iter().any(|w| w.seconds == 0)
        {
            return Err(ConfigValidationError::InvalidValue(
                "answer windows must be > 0 seconds".to_string(),
            ));
        }

        if self.deck.questions.is_empty() {
            if self.deck.identifiers == 0 || self.deck.difficulties.is_empty() {
                return Err(ConfigValidationError::LogicalInconsistency(
                    "deck rule produces no questions".to_string(),
                ));
            }
            if self.deck.difficulties.contains(&0) {
                return Err(ConfigValidationError::InvalidValue(
                    "difficulties must be >= 1".to_string(),
                ));
            }
        } else if self.deck.questions.iter().any(|q| q.difficulty == 0) {
            return Err(ConfigValidationError::InvalidValue(
                "question difficulty must be >= 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
    #[error("Configuration logical inconsistency: {0}")]
    LogicalInconsistency(String),
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

impl From<ConfigValidationError> for ConfigurationError {
    fn from(e: ConfigValidationError) -> Self {
        ConfigurationError::ValidationFailed(e.to_string())
    }
}

/// Configuration loader with environment variable support
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> QuizResult<QuizConfig> {
        let mut config = match &self.config_path {
            Some(path) => Self::load_from_file(path)?,
            None => QuizConfig::default(),
        };

        Self::apply_env_overrides(&mut config, |key| env::var(key).ok())?;

        config.validate().map_err(ConfigurationError::from)?;

        Ok(config)
    }

    /// Load configuration from TOML file
    fn load_from_file(path: &Path) -> QuizResult<QuizConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| {
            ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into()
        })
    }

    /// Apply `COINQUIZ_*` overrides; `lookup` abstracts the environment
    fn apply_env_overrides<F>(config: &mut QuizConfig, lookup: F) -> QuizResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(players) = lookup("COINQUIZ_PLAYERS") {
            config.game.players = players
                .split(',')
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect();
        }
        if let Some(value) = lookup("COINQUIZ_STARTING_BALANCE") {
            config.game.starting_balance = parse_env("COINQUIZ_STARTING_BALANCE", value)?;
        }
        if let Some(value) = lookup("COINQUIZ_QUESTIONS") {
            config.game.question_quota = parse_env("COINQUIZ_QUESTIONS", value)?;
        }
        if let Some(value) = lookup("COINQUIZ_BETTING_SECONDS") {
            config.timing.betting_seconds = parse_env("COINQUIZ_BETTING_SECONDS", value)?;
        }
        if let Some(value) = lookup("COINQUIZ_SEED") {
            config.deck.seed = Some(parse_env("COINQUIZ_SEED", value)?);
        }
        if let Some(value) = lookup("COINQUIZ_BELL") {
            config.alerts.bell = parse_env("COINQUIZ_BELL", value)?;
        }

        Ok(())
    }

    /// Render a configuration as TOML
    pub fn to_toml(config: &QuizConfig) -> QuizResult<String> {
        Ok(toml::to_string_pretty(config)?)
    }
}

fn parse_env<T: std::str::FromStr>(field: &str, value: String) -> QuizResult<T> {
    value.trim().parse().map_err(|_| {
        ConfigurationError::InvalidValue {
            field: field.to_string(),
            value,
            reason: format!("expected {}", std::any::type_name::<T>()),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::QuizError;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = QuizConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.game.players.len(), 4);
        assert_eq!(config.game.starting_balance, 5);
        assert_eq!(config.game.question_quota, 20);
        assert_eq!(config.deck.deck_size(), 20);
    }

    #[test]
    fn test_quick_round_config_is_valid() {
        let config = QuizConfig::quick_round();
        assert!(config.validate().is_ok());
        assert_eq!(config.deck.deck_size(), 3);
    }

    #[test]
    fn test_answer_seconds_lookup() {
        let timing = TimingConfig::default();
        assert_eq!(timing.answer_seconds(1), 15);
        assert_eq!(timing.answer_seconds(4), 60);
        assert_eq!(timing.answer_seconds(9), FALLBACK_ANSWER_SECONDS);
    }

    #[test]
    fn test_invalid_config_validation() {
        let mut config = QuizConfig::default();
        config.game.question_quota = 0;
        assert!(config.validate().is_err());

        let mut config = QuizConfig::default();
        config.game.players.push("Eric".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidValue(_))
        ));

        let mut config = QuizConfig::default();
        config.deck.identifiers = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::LogicalInconsistency(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("COINQUIZ_PLAYERS", "Ann, Bob"),
            ("COINQUIZ_QUESTIONS", "8"),
            ("COINQUIZ_SEED", "99"),
        ]
        .into_iter()
        .collect();

        let mut config = QuizConfig::default();
        ConfigLoader::apply_env_overrides(&mut config, |key| {
            vars.get(key).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(config.game.players, vec!["Ann", "Bob"]);
        assert_eq!(config.game.question_quota, 8);
        assert_eq!(config.deck.seed, Some(99));
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = QuizConfig::default();
        let result = ConfigLoader::apply_env_overrides(&mut config, |key| {
            (key == "COINQUIZ_BETTING_SECONDS").then(|| "soon".to_string())
        });

        match result {
            Err(QuizError::Configuration(ConfigurationError::InvalidValue { field, .. })) => {
                assert_eq!(field, "COINQUIZ_BETTING_SECONDS")
            }
            other => panic!("Expected invalid value, got {:?}", other),
        }
    }

    #[test]
    fn test_load_partial_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[game]
players = ["Mia", "Noah", "Liam"]
starting_balance = 10

[[deck.questions]]
label = "Newton's second law"
difficulty = 2

[[deck.questions]]
label = "Ohm's law"
difficulty = 1
"#
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.game.players, vec!["Mia", "Noah", "Liam"]);
        assert_eq!(config.game.starting_balance, 10);
        // Unset keys keep their defaults
        assert_eq!(config.game.question_quota, 20);
        assert_eq!(config.timing.betting_seconds, 20);
        assert_eq!(config.deck.deck_size(), 2);
        assert_eq!(config.deck.questions[1].label, "Ohm's law");
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[game]
question_quota = \"many\"").unwrap();

        assert!(matches!(
            ConfigLoader::new().with_path(file.path()).load(),
            Err(QuizError::Configuration(ConfigurationError::LoadFailed(_)))
        ));
    }

    #[test]
    fn test_save_and_load_config() {
        let file = NamedTempFile::new().unwrap();
        let original = QuizConfig::quick_round();

        std::fs::write(file.path(), ConfigLoader::to_toml(&original).unwrap()).unwrap();
        let loaded = ConfigLoader::load_from_file(file.path()).unwrap();

        assert_eq!(loaded, original);
    }
}
