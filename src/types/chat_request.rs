use serde::{Deserialize, Serialize};

/// Request body for one interactive chat turn.
///
/// The session identifier is omitted from the JSON payload entirely when
/// absent; the gateway mints a fresh session in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user-authored message text.
    pub message: String,

    /// Opaque session identifier from a prior exchange, echoed back verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ChatRequest {
    /// Create a request for a fresh session.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: None,
        }
    }

    /// Attach a session identifier to the request.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}
