//! Session identifier handling.
//!
//! The gateway correlates chat turns server-side through an opaque session
//! identifier issued on the first reply. This module holds that identifier in
//! an explicit context object rather than ambient state, so attachment and
//! replacement are testable in isolation.

use crate::types::{ChatReply, ChatRequest};

/// Explicit holder for the opaque session identifier.
///
/// Once set, the identifier is echoed back verbatim on every later request.
/// The client never mutates it; it is only replaced when the gateway issues a
/// new value, or dropped by [`SessionContext::clear`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    session_id: Option<String>,
}

impl SessionContext {
    /// Creates an empty session context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored session identifier, if any.
    pub fn id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Attach the stored identifier to an outgoing request.
    ///
    /// When no identifier is stored, the request is returned unchanged and
    /// carries no session field on the wire.
    pub fn attach(&self, request: ChatRequest) -> ChatRequest {
        match &self.session_id {
            Some(id) => request.with_session_id(id.clone()),
            None => request,
        }
    }

    /// Adopt the session identifier from a reply, if the gateway issued one.
    ///
    /// Returns true when the stored identifier changed. This runs before the
    /// reply body is otherwise validated; the gateway can mint a session even
    /// on a reply that carries no response text.
    pub fn adopt(&mut self, reply: &ChatReply) -> bool {
        match &reply.session_id {
            Some(id) if self.session_id.as_deref() != Some(id.as_str()) => {
                self.session_id = Some(id.clone());
                true
            }
            _ => false,
        }
    }

    /// Drop the stored identifier; the next turn starts a fresh session.
    pub fn clear(&mut self) {
        self.session_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply_with_session(id: &str) -> ChatReply {
        ChatReply {
            response: Some("hello".to_string()),
            session_id: Some(id.to_string()),
            timestamp: None,
        }
    }

    #[test]
    fn attach_without_session_omits_field() {
        let context = SessionContext::new();
        let request = context.attach(ChatRequest::new("hi"));
        assert!(request.session_id.is_none());
    }

    #[test]
    fn attach_includes_stored_id_verbatim() {
        let mut context = SessionContext::new();
        context.adopt(&reply_with_session("sess-1"));
        let request = context.attach(ChatRequest::new("hi"));
        assert_eq!(request.session_id.as_deref(), Some("sess-1"));
    }

    #[test]
    fn adopt_replaces_stored_id() {
        let mut context = SessionContext::new();
        assert!(context.adopt(&reply_with_session("sess-1")));
        assert!(context.adopt(&reply_with_session("sess-2")));
        assert_eq!(context.id(), Some("sess-2"));
    }

    #[test]
    fn adopt_ignores_replies_without_session() {
        let mut context = SessionContext::new();
        context.adopt(&reply_with_session("sess-1"));
        let reply = ChatReply {
            response: Some("more".to_string()),
            session_id: None,
            timestamp: None,
        };
        assert!(!context.adopt(&reply));
        assert_eq!(context.id(), Some("sess-1"));
    }

    #[test]
    fn adopt_even_when_response_missing() {
        // The gateway can mint a session on a reply with no response text.
        let mut context = SessionContext::new();
        let reply = ChatReply {
            response: None,
            session_id: Some("sess-3".to_string()),
            timestamp: None,
        };
        assert!(context.adopt(&reply));
        assert_eq!(context.id(), Some("sess-3"));
    }

    #[test]
    fn clear_starts_fresh() {
        let mut context = SessionContext::new();
        context.adopt(&reply_with_session("sess-1"));
        context.clear();
        assert!(context.id().is_none());
    }
}
