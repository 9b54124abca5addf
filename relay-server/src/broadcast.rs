use std::sync::Arc;

use crate::registry::ConnectionRegistry;
use relay_types::PushEvent;

/// Fan-out of round and score events over the registry. Everything here is
/// fire-and-forget: a push failure tears down that one connection and
/// nothing else, and is never reported back to the submission path.
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Push the new current word to every live connection.
    pub async fn publish_round(&self, current_word: &str) {
        self.registry
            .broadcast(PushEvent::RoundUpdate {
                current_word: current_word.to_string(),
            })
            .await;
    }

    /// Unicast a player's score. Returns whether delivery was attempted;
    /// `false` just means no live connection, not an error.
    pub async fn publish_score(&self, browser_id: &str, score: i64) -> bool {
        self.registry
            .send(browser_id, PushEvent::Score { value: score })
            .await
    }

    /// Unicast (`Some(browser_id)`) or broadcast (`None`) an extension
    /// event.
    pub async fn publish_custom(
        &self,
        target: Option<&str>,
        name: &str,
        payload: serde_json::Value,
    ) -> bool {
        let event = PushEvent::Custom {
            name: name.to_string(),
            payload,
        };
        match target {
            Some(browser_id) => self.registry.send(browser_id, event).await,
            None => {
                self.registry.broadcast(event).await;
                true
            }
        }
    }
}
