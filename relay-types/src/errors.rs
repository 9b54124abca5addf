use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// Everything that can go wrong between a submission arriving and an outcome
/// leaving. Player-facing rejections (`is_rejection`) are folded into a
/// rejected outcome at the submission boundary; the rest propagate.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GameError {
    #[error("browser id is missing or empty")]
    MissingIdentifier,
    #[error("no player registered for browser id: {browser_id}")]
    PlayerNotFound { browser_id: String },
    #[error("word \"{word}\" is shorter than {min_length} syllables")]
    WordTooShort { word: String, min_length: usize },
    #[error("word \"{word}\" must start with '{expected}'")]
    ChainMismatch { word: String, expected: char },
    #[error("word \"{word}\" was already used this round")]
    WordAlreadyUsed { word: String },
    #[error("word \"{word}\" is not in the dictionary")]
    UnknownWord { word: String },
    #[error("'{character}' is not a Hangul syllable")]
    InvalidCharacter { character: char },
    #[error("partition key \"{partition}\" is not in the allow list")]
    InvalidPartition { partition: String },
    #[error("submission lost the race for the current word")]
    ConcurrentConflict,
    #[error("upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },
}

impl GameError {
    /// Stable machine-readable code carried on every rejection.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::MissingIdentifier => "BROWSER_ID_MISSING",
            GameError::PlayerNotFound { .. } => "PLAYER_NOT_FOUND",
            GameError::WordTooShort { .. } => "WORD_TOO_SHORT",
            GameError::ChainMismatch { .. } => "NOT_FOLLOWING_RULES",
            GameError::WordAlreadyUsed { .. } => "WORD_ALREADY_USED",
            GameError::UnknownWord { .. } => "NOT_A_REAL_WORD",
            GameError::InvalidCharacter { .. } => "INVALID_CHARACTER",
            GameError::InvalidPartition { .. } => "INVALID_TABLE_NAME",
            GameError::ConcurrentConflict => "CONCURRENT_CONFLICT",
            GameError::UpstreamUnavailable { .. } => "SERVER_ERROR",
        }
    }

    /// True for errors a player can cause and recover from. These become
    /// rejected outcomes; everything else is a server-side failure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            GameError::WordTooShort { .. }
                | GameError::ChainMismatch { .. }
                | GameError::WordAlreadyUsed { .. }
                | GameError::UnknownWord { .. }
                | GameError::ConcurrentConflict
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_are_player_facing() {
        assert!(
            GameError::ChainMismatch {
                word: "하늘".to_string(),
                expected: '작',
            }
            .is_rejection()
        );
        assert!(GameError::ConcurrentConflict.is_rejection());
        assert!(!GameError::MissingIdentifier.is_rejection());
        assert!(
            !GameError::InvalidPartition {
                partition: "dict_x".to_string(),
            }
            .is_rejection()
        );
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(
            GameError::WordTooShort {
                word: "물".to_string(),
                min_length: 2,
            }
            .code(),
            "WORD_TOO_SHORT"
        );
        assert_eq!(
            GameError::UnknownWord {
                word: "없는말".to_string(),
            }
            .code(),
            "NOT_A_REAL_WORD"
        );
    }
}
