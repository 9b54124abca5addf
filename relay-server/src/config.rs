use std::env;
use std::time::Duration;

use relay_core::RoundPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub words_directory: String,
    pub start_word: String,
    pub min_word_length: usize,
    pub accept_bonus: i64,
    pub win_bonus: i64,
    pub cas_attempts: u32,
    pub reject_reused_words: bool,
    pub heartbeat_interval_seconds: u64,
    pub stale_sweep_interval_seconds: u64,
    pub stale_threshold_seconds: u64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            words_directory: env::var("WORDS_DIRECTORY")
                .unwrap_or_else(|_| "./shared/words".to_string()),
            start_word: env::var("START_WORD").unwrap_or_else(|_| "시작".to_string()),
            min_word_length: env::var("MIN_WORD_LENGTH")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .expect("Invalid MIN_WORD_LENGTH"),
            accept_bonus: env::var("ACCEPT_BONUS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("Invalid ACCEPT_BONUS"),
            win_bonus: env::var("WIN_BONUS")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .expect("Invalid WIN_BONUS"),
            cas_attempts: env::var("CAS_ATTEMPTS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .expect("Invalid CAS_ATTEMPTS"),
            reject_reused_words: env::var("REJECT_REUSED_WORDS")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .expect("Invalid REJECT_REUSED_WORDS"),
            heartbeat_interval_seconds: env::var("HEARTBEAT_INTERVAL_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("Invalid HEARTBEAT_INTERVAL_SECONDS"),
            stale_sweep_interval_seconds: env::var("STALE_SWEEP_INTERVAL_SECONDS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .expect("Invalid STALE_SWEEP_INTERVAL_SECONDS"),
            stale_threshold_seconds: env::var("STALE_THRESHOLD_SECONDS")
                .unwrap_or_else(|_| "180".to_string())
                .parse()
                .expect("Invalid STALE_THRESHOLD_SECONDS"),
        }
    }

    pub fn round_policy(&self) -> RoundPolicy {
        RoundPolicy {
            start_word: self.start_word.clone(),
            min_word_length: self.min_word_length,
            accept_bonus: self.accept_bonus,
            win_bonus: self.win_bonus,
            max_cas_attempts: self.cas_attempts,
            reject_reused_words: self.reject_reused_words,
        }
    }

    pub fn stale_threshold(&self) -> Duration {
        Duration::from_secs(self.stale_threshold_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
