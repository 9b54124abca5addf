use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Stable external player key. Scores and connections are always keyed by
/// this, never by the display nickname.
pub type BrowserId = String;

/// Identity established on first contact and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PlayerIdentity {
    pub browser_id: BrowserId,
    pub nickname: String,
}

/// Point-in-time view of the live connection registry.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub active_connections: usize,
    pub connected_clients: Vec<BrowserId>,
}

/// Leaderboard entry: score plus 0-based rank in descending score order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RankedScore {
    pub browser_id: BrowserId,
    pub score: i64,
    pub rank: u64,
}
