use std::sync::Arc;

use relay_store::SharedStore;
use relay_types::GameError;

use crate::upstream;

/// Ordered set holding every player's score, keyed by browser id.
pub const USER_SET_KEY: &str = "game:users";

/// Atomic per-player score accumulation over the shared ordered store. All
/// increments go through the store's own atomic increment, never
/// read-modify-write here.
#[derive(Clone)]
pub struct ScoreLedger {
    store: Arc<dyn SharedStore>,
}

impl ScoreLedger {
    pub fn new(store: Arc<dyn SharedStore>) -> Self {
        Self { store }
    }

    /// Create the zero-score entry if the player has none yet.
    pub async fn ensure(&self, browser_id: &str) -> Result<(), GameError> {
        self.store
            .zincr_by(USER_SET_KEY, browser_id, 0.0)
            .await
            .map_err(upstream)?;
        Ok(())
    }

    /// Adds `delta` points and returns the new total. `delta` must be
    /// positive; scores never decrease.
    pub async fn increment(&self, browser_id: &str, delta: i64) -> Result<i64, GameError> {
        debug_assert!(delta > 0, "score deltas are strictly positive");
        let score = self
            .store
            .zincr_by(USER_SET_KEY, browser_id, delta as f64)
            .await
            .map_err(upstream)?;
        Ok(score as i64)
    }

    /// Current score, 0 when the player has never been created.
    pub async fn score_of(&self, browser_id: &str) -> Result<i64, GameError> {
        let score = self
            .store
            .zscore(USER_SET_KEY, browser_id)
            .await
            .map_err(upstream)?;
        Ok(score.unwrap_or(0.0) as i64)
    }

    /// 0-based leaderboard position in descending score order.
    pub async fn rank_of(&self, browser_id: &str) -> Result<u64, GameError> {
        self.store
            .zrank(USER_SET_KEY, browser_id)
            .await
            .map_err(upstream)?
            .ok_or_else(|| GameError::PlayerNotFound {
                browser_id: browser_id.to_string(),
            })
    }
}
