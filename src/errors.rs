//! Error types for the coinquiz game
//!
//! Round-level rejections are ordinary values: the engine reports them and
//! carries on. Only configuration and I/O problems ever stop the binary.

use thiserror::Error;

/// Root error type for everything outside the round engine
#[derive(Debug, Error)]
pub enum QuizError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A round operation was refused
    #[error("Round error: {0}")]
    Round(#[from] RoundError),

    /// Terminal or file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Journal export failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),
}

/// Reasons the round engine refuses an operation.
///
/// A refused operation never mutates the game; the engine journals the
/// rejection and the caller may simply continue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error("cannot {action} while {phase}")]
    IllegalTransition { action: &'static str, phase: String },

    #[error("unknown player: {0}")]
    UnknownPlayer(String),

    #[error("{0} did not bet on this round")]
    NotABettor(String),

    #[error("the question deck is empty")]
    DeckEmpty,
}

impl From<serde_json::Error> for QuizError {
    fn from(e: serde_json::Error) -> Self {
        QuizError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for QuizError {
    fn from(e: toml::de::Error) -> Self {
        QuizError::Configuration(ConfigurationError::LoadFailed(e.to_string()))
    }
}

impl From<toml::ser::Error> for QuizError {
    fn from(e: toml::ser::Error) -> Self {
        QuizError::Serialization(e.to_string())
    }
}

// Convenience type alias for Results
pub type QuizResult<T> = Result<T, QuizError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let config_error = ConfigurationError::ValidationFailed("no players".to_string());
        let quiz_error = QuizError::Configuration(config_error);

        assert!(quiz_error.to_string().contains("Configuration error"));
        assert!(quiz_error.to_string().contains("no players"));
    }

    #[test]
    fn test_round_error_details() {
        let err = RoundError::IllegalTransition {
            action: "draw",
            phase: "betting".to_string(),
        };
        assert_eq!(err.to_string(), "cannot draw while betting");
        assert_eq!(
            RoundError::NotABettor("Eric".to_string()).to_string(),
            "Eric did not bet on this round"
        );
    }

    #[test]
    fn test_error_conversion() {
        let quiz_error: QuizError = RoundError::UnknownPlayer("Zed".to_string()).into();

        match quiz_error {
            QuizError::Round(RoundError::UnknownPlayer(name)) => assert_eq!(name, "Zed"),
            _ => panic!("Expected round error"),
        }
    }

    #[test]
    fn test_error_source() {
        let config_error = ConfigurationError::LoadFailed("missing file".to_string());
        let quiz_error = QuizError::Configuration(config_error);

        assert!(quiz_error.source().is_some());
    }
}
