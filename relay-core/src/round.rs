use std::sync::Arc;

use relay_store::SharedStore;
use relay_types::GameError;

use crate::{ScoreLedger, WordLookup, choseong, upstream};

/// Single shared current-word key, one per cluster.
pub const CURRENT_WORD_KEY: &str = "game:currentWord";

/// Ordered set of words accepted since startup, only consulted when the
/// reuse policy is enabled.
pub const USED_WORDS_KEY: &str = "game:usedWords";

/// Picks the word the round restarts from after a winning word. The default
/// is a fixed configured word; the contract is only that the result is a
/// non-empty word submissions can chain off.
pub trait StartWordSelector: Send + Sync {
    fn next_start_word(&self) -> String;
}

pub struct FixedStartWord(pub String);

impl StartWordSelector for FixedStartWord {
    fn next_start_word(&self) -> String {
        self.0.clone()
    }
}

/// Tunable rules for one deployment.
#[derive(Debug, Clone)]
pub struct RoundPolicy {
    /// Word the chain starts from while the round is unstarted.
    pub start_word: String,
    /// Minimum syllable count for a submission.
    pub min_word_length: usize,
    /// Points for a normal accepted word.
    pub accept_bonus: i64,
    /// Points for an accepted winning word.
    pub win_bonus: i64,
    /// CAS attempts before a submission surfaces `ConcurrentConflict`.
    pub max_cas_attempts: u32,
    /// When enabled, a word accepted once is rejected on resubmission.
    pub reject_reused_words: bool,
}

impl Default for RoundPolicy {
    fn default() -> Self {
        Self {
            start_word: "시작".to_string(),
            min_word_length: 2,
            accept_bonus: 10,
            win_bonus: 50,
            max_cas_attempts: 3,
            reject_reused_words: false,
        }
    }
}

/// An accepted submission, reported back so the caller can broadcast the
/// new round state after the store write has committed.
#[derive(Debug, Clone)]
pub struct AcceptedSubmission {
    pub browser_id: String,
    pub word: String,
    /// New shared current word: the submission itself, or the restart word
    /// when a winning word ended the round.
    pub current_word: String,
    pub winning_word: bool,
    pub awarded: i64,
    pub score: i64,
}

/// The one shared game round. Owns the current-word value in the store and
/// is the only mutation path for it and for the score ledger.
pub struct GameRound {
    store: Arc<dyn SharedStore>,
    lookup: Arc<dyn WordLookup>,
    ledger: ScoreLedger,
    starts: Arc<dyn StartWordSelector>,
    policy: RoundPolicy,
}

impl GameRound {
    pub fn new(
        store: Arc<dyn SharedStore>,
        lookup: Arc<dyn WordLookup>,
        ledger: ScoreLedger,
        starts: Arc<dyn StartWordSelector>,
        policy: RoundPolicy,
    ) -> Self {
        debug_assert!(!policy.start_word.is_empty());
        Self {
            store,
            lookup,
            ledger,
            starts,
            policy,
        }
    }

    pub fn policy(&self) -> &RoundPolicy {
        &self.policy
    }

    /// The word submissions currently chain off. Falls back to the
    /// configured start word while the round is unstarted.
    pub async fn current_word(&self) -> Result<String, GameError> {
        let stored = self
            .store
            .get(CURRENT_WORD_KEY)
            .await
            .map_err(upstream)?
            .filter(|word| !word.is_empty());
        Ok(stored.unwrap_or_else(|| self.policy.start_word.clone()))
    }

    /// Validate and apply one submission. Accepted submissions replace the
    /// shared current word via compare-and-set and award points; losing a
    /// race retries against the fresh word a bounded number of times.
    pub async fn submit(
        &self,
        browser_id: &str,
        word: &str,
    ) -> Result<AcceptedSubmission, GameError> {
        if browser_id.is_empty() {
            return Err(GameError::MissingIdentifier);
        }

        let syllables: Vec<char> = word.chars().collect();
        if syllables.len() < self.policy.min_word_length {
            return Err(GameError::WordTooShort {
                word: word.to_string(),
                min_length: self.policy.min_word_length,
            });
        }
        let first = syllables[0];

        if self.policy.reject_reused_words {
            let used = self
                .store
                .zscore(USED_WORDS_KEY, word)
                .await
                .map_err(upstream)?;
            if used.is_some() {
                return Err(GameError::WordAlreadyUsed {
                    word: word.to_string(),
                });
            }
        }

        // The dictionary verdict cannot change between retries, so look the
        // word up lazily once the chain rule has passed and keep the result.
        let mut entry = None;

        for attempt in 0..self.policy.max_cas_attempts {
            let stored = self
                .store
                .get(CURRENT_WORD_KEY)
                .await
                .map_err(upstream)?
                .filter(|current| !current.is_empty());
            let chain_word = stored
                .clone()
                .unwrap_or_else(|| self.policy.start_word.clone());

            // chain rule: first syllable must match the last syllable of
            // the current word
            let Some(expected) = chain_word.chars().last() else {
                return Err(GameError::UpstreamUnavailable {
                    message: "configured start word is empty".to_string(),
                });
            };
            if first != expected {
                return Err(GameError::ChainMismatch {
                    word: word.to_string(),
                    expected,
                });
            }

            if entry.is_none() {
                let partition = choseong::partition_key(first)?;
                entry = Some(
                    self.lookup
                        .lookup(partition, word)
                        .await?
                        .ok_or_else(|| GameError::UnknownWord {
                            word: word.to_string(),
                        })?,
                );
            }
            let winning_word = entry.as_ref().is_some_and(|e| e.winning_word);

            let next_word = if winning_word {
                self.starts.next_start_word()
            } else {
                word.to_string()
            };

            let swapped = self
                .store
                .compare_and_set(CURRENT_WORD_KEY, stored.as_deref(), &next_word)
                .await
                .map_err(upstream)?;
            if !swapped {
                tracing::debug!(word, attempt, "lost current-word race, retrying");
                continue;
            }

            if self.policy.reject_reused_words {
                self.store
                    .zincr_by(USED_WORDS_KEY, word, 1.0)
                    .await
                    .map_err(upstream)?;
            }

            let awarded = if winning_word {
                self.policy.win_bonus
            } else {
                self.policy.accept_bonus
            };
            let score = self.ledger.increment(browser_id, awarded).await?;

            tracing::info!(
                browser_id,
                word,
                current_word = %next_word,
                winning_word,
                awarded,
                "submission accepted"
            );
            return Ok(AcceptedSubmission {
                browser_id: browser_id.to_string(),
                word: word.to_string(),
                current_word: next_word,
                winning_word,
                awarded,
                score,
            });
        }

        Err(GameError::ConcurrentConflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DictionaryIndex;
    use async_trait::async_trait;
    use relay_store::{MemoryStore, StoreResult};

    fn test_dictionary() -> DictionaryIndex {
        let mut index = DictionaryIndex::new();
        index.insert("dict_j", "작은", false);
        index.insert("dict_ng", "은하수", false);
        index.insert("dict_ng", "은잠", true);
        index.insert("dict_s", "수박", false);
        index.insert("dict_h", "하늘", false);
        index
    }

    fn test_round_with(store: Arc<dyn SharedStore>, policy: RoundPolicy) -> GameRound {
        let start = policy.start_word.clone();
        GameRound::new(
            store.clone(),
            Arc::new(test_dictionary()),
            ScoreLedger::new(store),
            Arc::new(FixedStartWord(start)),
            policy,
        )
    }

    fn test_round() -> GameRound {
        test_round_with(Arc::new(MemoryStore::new()), RoundPolicy::default())
    }

    #[tokio::test]
    async fn test_accept_advances_current_word_and_score() {
        let round = test_round();

        // start word "시작" ends in 작
        let accepted = round.submit("b1", "작은").await.unwrap();
        assert_eq!(accepted.current_word, "작은");
        assert!(!accepted.winning_word);
        assert_eq!(accepted.awarded, 10);
        assert_eq!(accepted.score, 10);
        assert_eq!(round.current_word().await.unwrap(), "작은");
    }

    #[tokio::test]
    async fn test_chain_mismatch_is_rejected_without_side_effects() {
        let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
        let round = test_round_with(store.clone(), RoundPolicy::default());

        let err = round.submit("b2", "하늘").await.unwrap_err();
        assert!(matches!(err, GameError::ChainMismatch { expected: '작', .. }));

        // no state change, no score
        assert_eq!(store.get(CURRENT_WORD_KEY).await.unwrap(), None);
        assert_eq!(round.ledger.score_of("b2").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_word_is_rejected() {
        let round = test_round();
        // chains correctly but is not in dict_j
        assert!(matches!(
            round.submit("b1", "작살나다").await,
            Err(GameError::UnknownWord { .. })
        ));
    }

    #[tokio::test]
    async fn test_too_short_word_is_rejected() {
        let round = test_round();
        assert!(matches!(
            round.submit("b1", "작").await,
            Err(GameError::WordTooShort { .. })
        ));
        assert!(matches!(
            round.submit("b1", "").await,
            Err(GameError::WordTooShort { .. })
        ));
    }

    #[tokio::test]
    async fn test_non_hangul_word_fails_classification() {
        let round = test_round();
        assert!(matches!(
            round.submit("b1", "abc").await,
            Err(GameError::ChainMismatch { .. }) | Err(GameError::InvalidCharacter { .. })
        ));
    }

    #[tokio::test]
    async fn test_winning_word_resets_round_and_awards_win_bonus() {
        let round = test_round();

        round.submit("b1", "작은").await.unwrap();
        let accepted = round.submit("b1", "은잠").await.unwrap();

        assert!(accepted.winning_word);
        assert_eq!(accepted.awarded, 50);
        assert_eq!(accepted.current_word, "시작");
        assert_eq!(round.current_word().await.unwrap(), "시작");
        // 10 for the first accept + 50 for the win
        assert_eq!(accepted.score, 60);

        // the chain continues off the restart word
        round.submit("b2", "작은").await.unwrap();
    }

    #[tokio::test]
    async fn test_chain_continues_across_players() {
        let round = test_round();

        round.submit("b1", "작은").await.unwrap();
        round.submit("b2", "은하수").await.unwrap();
        let accepted = round.submit("b3", "수박").await.unwrap();

        assert_eq!(accepted.current_word, "수박");
        assert_eq!(round.ledger.score_of("b1").await.unwrap(), 10);
        assert_eq!(round.ledger.score_of("b2").await.unwrap(), 10);
        assert_eq!(round.ledger.score_of("b3").await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_racing_submissions_accept_exactly_one() {
        let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
        let round = Arc::new(test_round_with(store, RoundPolicy::default()));

        let mut handles = Vec::new();
        for i in 0..20 {
            let round = round.clone();
            handles.push(tokio::spawn(async move {
                round.submit(&format!("b{}", i), "작은").await
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(result) => {
                    accepted += 1;
                    assert_eq!(result.current_word, "작은");
                }
                // losers either lost the CAS or saw the already-updated word
                Err(GameError::ConcurrentConflict) | Err(GameError::ChainMismatch { .. }) => {}
                Err(other) => panic!("unexpected rejection: {:?}", other),
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(round.current_word().await.unwrap(), "작은");
    }

    #[tokio::test]
    async fn test_exhausted_cas_surfaces_concurrent_conflict() {
        /// Store whose CAS always loses, as if another instance kept
        /// winning the race with the same word.
        struct ContestedStore(MemoryStore);

        #[async_trait]
        impl SharedStore for ContestedStore {
            async fn get(&self, key: &str) -> StoreResult<Option<String>> {
                self.0.get(key).await
            }
            async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
                self.0.set(key, value).await
            }
            async fn compare_and_set(
                &self,
                _key: &str,
                _expected: Option<&str>,
                _new: &str,
            ) -> StoreResult<bool> {
                Ok(false)
            }
            async fn zincr_by(&self, set_key: &str, member: &str, delta: f64) -> StoreResult<f64> {
                self.0.zincr_by(set_key, member, delta).await
            }
            async fn zscore(&self, set_key: &str, member: &str) -> StoreResult<Option<f64>> {
                self.0.zscore(set_key, member).await
            }
            async fn zrank(&self, set_key: &str, member: &str) -> StoreResult<Option<u64>> {
                self.0.zrank(set_key, member).await
            }
        }

        let round = test_round_with(
            Arc::new(ContestedStore(MemoryStore::new())),
            RoundPolicy::default(),
        );
        assert!(matches!(
            round.submit("b1", "작은").await,
            Err(GameError::ConcurrentConflict)
        ));
        // nothing was awarded for the failed submission
        assert_eq!(round.ledger.score_of("b1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reuse_policy_rejects_repeated_word() {
        let policy = RoundPolicy {
            reject_reused_words: true,
            ..RoundPolicy::default()
        };
        let round = test_round_with(Arc::new(MemoryStore::new()), policy);

        round.submit("b1", "작은").await.unwrap();
        round.submit("b2", "은잠").await.unwrap(); // win resets to 시작

        assert!(matches!(
            round.submit("b3", "작은").await,
            Err(GameError::WordAlreadyUsed { .. })
        ));
    }

    #[tokio::test]
    async fn test_reuse_allowed_by_default() {
        let round = test_round();

        round.submit("b1", "작은").await.unwrap();
        round.submit("b2", "은잠").await.unwrap();
        // same word again after the reset round-trip
        round.submit("b3", "작은").await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_identifier_is_rejected() {
        let round = test_round();
        assert!(matches!(
            round.submit("", "작은").await,
            Err(GameError::MissingIdentifier)
        ));
    }
}
