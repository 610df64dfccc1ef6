use serde::{Deserialize, Serialize};

/// Successful response body for one interactive chat turn.
///
/// A 2xx reply may still lack `response` text; callers treat that as an error
/// condition, but only after honoring any session identifier the gateway
/// issued alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// The agent's response text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    /// Session identifier issued or confirmed by the gateway.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Server-side timestamp of the reply, if provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ChatReply {
    /// The response text, treating an empty string the same as absent.
    pub fn text(&self) -> Option<&str> {
        self.response.as_deref().filter(|text| !text.is_empty())
    }
}
