use serde::{Deserialize, Serialize};

/// Slack `response_type` that makes a reply visible to the whole channel.
pub const IN_CHANNEL: &str = "in_channel";

const ACK_TEXT: &str = "You got it boss! Hang tight...";
const SUCCESS_TEXT: &str = "Alright, the gate is open! :thumbsup:";
const FAILURE_TEXT: &str =
    "Argh! Something's busted in my programming, I couldn't open the gate for you. :disappointed:";

/// A message posted back to a Slack channel, either as the synchronous
/// slash-command response or to a `response_url` later on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackReply {
    pub response_type: String,
    pub text: String,
    pub attachments: Vec<serde_json::Value>,
}

impl SlackReply {
    fn in_channel(text: &str) -> Self {
        Self {
            response_type: IN_CHANNEL.to_string(),
            text: text.to_string(),
            attachments: Vec::new(),
        }
    }

    /// Immediate acknowledgement of an accepted trigger.
    pub fn ack() -> Self {
        Self::in_channel(ACK_TEXT)
    }

    /// Sent when the gate controller confirms the gate opened.
    pub fn success() -> Self {
        Self::in_channel(SUCCESS_TEXT)
    }

    /// Sent when the confirmation window elapses without a confirmation.
    pub fn failure() -> Self {
        Self::in_channel(FAILURE_TEXT)
    }
}

/// Body of `GET /api`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateStatus {
    #[serde(rename = "shouldOpen")]
    pub should_open: bool,
}

/// Body of `POST /api/reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmAck {
    pub success: bool,
}

impl ConfirmAck {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
