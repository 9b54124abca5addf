use std::sync::Arc;

use rand::seq::SliceRandom;

use relay_store::SharedStore;
use relay_types::{GameError, PlayerIdentity};

use crate::{ScoreLedger, upstream};

const NICKNAME_KEY_PREFIX: &str = "game:user_";
const FALLBACK_NICKNAME: &str = "행운의 동물🦄";

const ADJECTIVES: [&str; 20] = [
    "용감한", "졸린", "명랑한", "수줍은", "재빠른", "느긋한", "씩씩한", "엉뚱한",
    "다정한", "은밀한", "상냥한", "우아한", "활발한", "조용한", "영리한", "배고픈",
    "신나는", "반짝이는", "어리둥절한", "당당한",
];

const ANIMALS: [&str; 16] = [
    "수달", "고슴도치", "너구리", "두더지", "호랑이", "펭귄", "다람쥐", "부엉이",
    "여우", "돌고래", "알파카", "판다", "고양이", "까치", "사막여우", "물범",
];

/// Assigns and remembers one display nickname per browser id. The nickname
/// is display-only; it never keys scores or connections.
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn SharedStore>,
    ledger: ScoreLedger,
}

impl IdentityService {
    pub fn new(store: Arc<dyn SharedStore>, ledger: ScoreLedger) -> Self {
        Self { store, ledger }
    }

    /// Returns the identity for `browser_id`, minting a nickname and the
    /// zero-score ledger entry on first contact.
    pub async fn resolve_or_create(&self, browser_id: &str) -> Result<PlayerIdentity, GameError> {
        if browser_id.is_empty() {
            return Err(GameError::MissingIdentifier);
        }

        let key = format!("{}{}", NICKNAME_KEY_PREFIX, browser_id);
        if let Some(nickname) = self.store.get(&key).await.map_err(upstream)? {
            return Ok(PlayerIdentity {
                browser_id: browser_id.to_string(),
                nickname,
            });
        }

        // Mint atomically so concurrent first contacts agree on one
        // nickname; the loser of the race adopts the stored one.
        let generated = generate_nickname();
        let minted = self
            .store
            .compare_and_set(&key, None, &generated)
            .await
            .map_err(upstream)?;
        let nickname = if minted {
            tracing::info!(browser_id, nickname = generated, "new player identity created");
            generated
        } else {
            self.store
                .get(&key)
                .await
                .map_err(upstream)?
                .unwrap_or(generated)
        };
        self.ledger.ensure(browser_id).await?;

        Ok(PlayerIdentity {
            browser_id: browser_id.to_string(),
            nickname,
        })
    }
}

fn generate_nickname() -> String {
    let mut rng = rand::thread_rng();
    match (ADJECTIVES.choose(&mut rng), ANIMALS.choose(&mut rng)) {
        (Some(adjective), Some(animal)) => format!("{} {}", adjective, animal),
        _ => FALLBACK_NICKNAME.to_string(),
    }
}
