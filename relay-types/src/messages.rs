use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::GameError;

/// Messages a connected client may send over the socket.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ClientMessage {
    SubmitWord { word: String },
    Heartbeat,
}

/// Named push events delivered to clients, fire-and-forget.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum PushEvent {
    #[serde(rename_all = "camelCase")]
    Connect { nickname: String, browser_id: String },
    #[serde(rename_all = "camelCase")]
    RoundUpdate { current_word: String },
    Score { value: i64 },
    Heartbeat,
    Custom {
        name: String,
        payload: serde_json::Value,
    },
}

/// Inbound submission message, also accepted over the HTTP fallback.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub browser_id: String,
    pub word: String,
}

/// Every submission resolves to exactly one of these.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SubmitOutcome {
    #[serde(rename_all = "camelCase")]
    Accepted {
        current_word: String,
        score: i64,
        winning_word: bool,
    },
    Rejected { code: String, message: String },
}

impl SubmitOutcome {
    pub fn rejected(error: &GameError) -> Self {
        SubmitOutcome::Rejected {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_event_uses_named_events() {
        let event = PushEvent::RoundUpdate {
            current_word: "작은".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "roundUpdate");
        assert_eq!(json["data"]["currentWord"], "작은");

        let heartbeat = serde_json::to_value(PushEvent::Heartbeat).unwrap();
        assert_eq!(heartbeat["event"], "heartbeat");
    }

    #[test]
    fn test_rejected_outcome_carries_code_and_message() {
        let err = GameError::UnknownWord {
            word: "없는말".to_string(),
        };
        let outcome = SubmitOutcome::rejected(&err);
        match outcome {
            SubmitOutcome::Rejected { code, message } => {
                assert_eq!(code, "NOT_A_REAL_WORD");
                assert!(message.contains("없는말"));
            }
            _ => panic!("expected rejection"),
        }
    }

    #[test]
    fn test_submit_request_wire_format() {
        let req: SubmitRequest =
            serde_json::from_str(r#"{"browserId": "b1", "word": "작은"}"#).unwrap();
        assert_eq!(req.browser_id, "b1");
        assert_eq!(req.word, "작은");
    }
}
