use std::sync::Arc;

use crate::broadcast::Broadcaster;
use crate::registry::{ConnectionHandle, ConnectionId, ConnectionRegistry};
use relay_core::{GameRound, IdentityService, ScoreLedger};
use relay_types::{
    ConnectionStatus, GameError, PlayerIdentity, PushEvent, RankedScore, SubmitOutcome,
};

/// Ties the round, ledger, identity and registry together behind the
/// operations the transport and admin surfaces call. Broadcasts always
/// happen after the round state has committed to the shared store.
pub struct GameService {
    round: GameRound,
    ledger: ScoreLedger,
    identity: IdentityService,
    registry: Arc<ConnectionRegistry>,
    broadcaster: Broadcaster,
}

impl GameService {
    pub fn new(
        round: GameRound,
        ledger: ScoreLedger,
        identity: IdentityService,
        registry: Arc<ConnectionRegistry>,
    ) -> Self {
        let broadcaster = Broadcaster::new(registry.clone());
        Self {
            round,
            ledger,
            identity,
            registry,
            broadcaster,
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Establish a player's identity and register a fresh connection for
    /// it, superseding any previous one. The welcome events (identity,
    /// current word, own score) are queued before this returns.
    pub async fn connect(
        &self,
        browser_id: &str,
    ) -> Result<(PlayerIdentity, ConnectionHandle), GameError> {
        let identity = self.identity.resolve_or_create(browser_id).await?;
        let handle = self.registry.register(browser_id).await;

        let current_word = self.round.current_word().await?;
        let score = self.ledger.score_of(browser_id).await?;

        self.registry
            .send(
                browser_id,
                PushEvent::Connect {
                    nickname: identity.nickname.clone(),
                    browser_id: browser_id.to_string(),
                },
            )
            .await;
        self.registry
            .send(browser_id, PushEvent::RoundUpdate { current_word })
            .await;
        self.registry
            .send(browser_id, PushEvent::Score { value: score })
            .await;

        Ok((identity, handle))
    }

    /// Run one submission through the round. Player-caused failures come
    /// back as rejected outcomes for unicast feedback; only server-side
    /// failures propagate as errors.
    pub async fn submit(&self, browser_id: &str, word: &str) -> Result<SubmitOutcome, GameError> {
        self.registry.touch(browser_id).await;

        match self.round.submit(browser_id, word).await {
            Ok(accepted) => {
                self.broadcaster.publish_round(&accepted.current_word).await;
                self.broadcaster
                    .publish_score(browser_id, accepted.score)
                    .await;
                Ok(SubmitOutcome::Accepted {
                    current_word: accepted.current_word,
                    score: accepted.score,
                    winning_word: accepted.winning_word,
                })
            }
            Err(error) if error.is_rejection() => {
                tracing::debug!(browser_id, word, code = error.code(), "submission rejected");
                Ok(SubmitOutcome::rejected(&error))
            }
            Err(error) => Err(error),
        }
    }

    pub async fn current_word(&self) -> Result<String, GameError> {
        self.round.current_word().await
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.registry.snapshot().await
    }

    pub async fn heartbeat(&self, browser_id: &str) {
        self.registry.touch(browser_id).await;
    }

    pub async fn disconnect(&self, browser_id: &str) {
        self.registry.remove(browser_id).await;
    }

    /// Transport teardown path: only removes the entry still owned by the
    /// finishing task.
    pub async fn disconnect_exact(&self, browser_id: &str, id: ConnectionId) {
        self.registry.remove_exact(browser_id, id).await;
    }

    /// Score plus leaderboard position. Fails with `PlayerNotFound` for a
    /// browser id that never played.
    pub async fn ranked_score(&self, browser_id: &str) -> Result<RankedScore, GameError> {
        let rank = self.ledger.rank_of(browser_id).await?;
        let score = self.ledger.score_of(browser_id).await?;
        Ok(RankedScore {
            browser_id: browser_id.to_string(),
            score,
            rank,
        })
    }

    /// Manual score push for operational use.
    pub async fn push_score(&self, browser_id: &str) -> Result<bool, GameError> {
        let score = self.ledger.score_of(browser_id).await?;
        Ok(self.broadcaster.publish_score(browser_id, score).await)
    }

    /// Push every connected player their own score.
    pub async fn broadcast_scores(&self) -> Result<(), GameError> {
        let status = self.registry.snapshot().await;
        tracing::info!(
            connections = status.active_connections,
            "broadcasting scores"
        );
        for browser_id in status.connected_clients {
            let score = self.ledger.score_of(&browser_id).await?;
            self.broadcaster.publish_score(&browser_id, score).await;
        }
        Ok(())
    }

    pub async fn publish_custom(
        &self,
        target: Option<&str>,
        name: &str,
        payload: serde_json::Value,
    ) -> bool {
        self.broadcaster.publish_custom(target, name, payload).await
    }
}
