//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the transcript,
//! the session context, and the active agent selection, and drives one chat
//! turn at a time against the gateway.

use std::time::Instant;

use async_trait::async_trait;

use crate::client::Gateway;
use crate::error::{Error, Result};
use crate::observability;
use crate::render::Renderer;
use crate::session::SessionContext;
use crate::transcript::{Category, ConnectionStatus, Entry, Transcript};
use crate::types::{Agent, ChatReply, ChatRequest, HealthStatus};

use super::config::ChatConfig;

/// Transport behavior expected by the chat session.
///
/// [`Gateway`] is the production implementation; tests script replies
/// through this seam.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send one chat turn to the selected agent.
    async fn chat(&self, agent: Agent, request: &ChatRequest) -> Result<ChatReply>;

    /// Check the gateway health endpoint.
    async fn health(&self) -> Result<HealthStatus>;
}

#[async_trait]
impl ChatTransport for Gateway {
    async fn chat(&self, agent: Agent, request: &ChatRequest) -> Result<ChatReply> {
        Gateway::chat(self, agent, request).await
    }

    async fn health(&self) -> Result<HealthStatus> {
        Gateway::health(self).await
    }
}

/// Holds the reentrancy flag for the duration of one transport call.
///
/// Dropping the guard releases the flag, so a caller that abandons the send
/// future mid-await (a timeout or a select) does not wedge the session.
struct InFlightGuard<'a> {
    flag: &'a mut bool,
}

impl<'a> InFlightGuard<'a> {
    fn arm(flag: &'a mut bool) -> Self {
        *flag = true;
        Self { flag }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}

/// An interactive chat session against the gateway.
///
/// The session drives one turn at a time: exactly one request per
/// [`ChatSession::send`] invocation, guarded against overlapping submissions.
/// Every failure path is converted into a transcript error entry; nothing
/// escapes to the host loop.
pub struct ChatSession<T: ChatTransport> {
    transport: T,
    agent: Agent,
    session: SessionContext,
    transcript: Transcript,
    status: ConnectionStatus,
    in_flight: bool,
}

impl ChatSession<Gateway> {
    /// Creates a new chat session with the given client and configuration.
    pub fn new(gateway: Gateway, config: ChatConfig) -> Self {
        Self::with_transport(gateway, config.agent)
    }
}

impl<T: ChatTransport> ChatSession<T> {
    /// Creates a new chat session over a custom transport.
    pub fn with_transport(transport: T, agent: Agent) -> Self {
        Self {
            transport,
            agent,
            session: SessionContext::new(),
            transcript: Transcript::new(),
            status: ConnectionStatus::Unknown,
            in_flight: false,
        }
    }

    /// Sends one user-authored message and records the outcome.
    ///
    /// Empty or whitespace-only input is a silent no-op: nothing is appended
    /// and no request is issued. Otherwise exactly one user entry is appended
    /// before the request, and exactly one of {agent entry, error entry} is
    /// appended after it settles. Network and payload failures become error
    /// entries rather than returned errors. The reentrancy guard is released
    /// when the turn settles and when the returned future is dropped early.
    ///
    /// # Errors
    ///
    /// Returns an error only if a previous send on this session is still
    /// outstanding.
    pub async fn send(&mut self, input: &str, renderer: &mut dyn Renderer) -> Result<()> {
        let message = input.trim();
        if message.is_empty() {
            return Ok(());
        }
        if self.in_flight {
            return Err(Error::validation(
                "a chat request is already in flight",
                None,
            ));
        }

        observability::CHAT_TURNS.click();
        self.record(Entry::new(Category::User, message), renderer);

        let request = self.session.attach(ChatRequest::new(message));

        let start = Instant::now();
        let result = {
            // Released when the guard drops, on settlement or abandonment.
            let _guard = InFlightGuard::arm(&mut self.in_flight);
            self.transport.chat(self.agent, &request).await
        };
        observability::CHAT_TURN_DURATION.add(start.elapsed().as_secs_f64());

        match result {
            Ok(reply) => {
                // The gateway can mint a session even on a reply with no
                // response text; adopt it before validating the body.
                self.session.adopt(&reply);
                match reply.text() {
                    Some(text) => {
                        let text = text.to_string();
                        self.record(Entry::new(Category::Agent, text), renderer);
                        if self.transcript.looks_connected() {
                            self.set_status(ConnectionStatus::Connected, renderer);
                        }
                    }
                    None => {
                        observability::CHAT_TURN_ERRORS.click();
                        self.record(
                            Entry::new(Category::Error, "No response received from agent"),
                            renderer,
                        );
                        self.set_status(ConnectionStatus::Degraded, renderer);
                    }
                }
            }
            Err(err) => {
                observability::CHAT_TURN_ERRORS.click();
                self.record(Entry::new(Category::Error, err.to_string()), renderer);
                self.set_status(ConnectionStatus::Degraded, renderer);
            }
        }

        Ok(())
    }

    /// Probe the gateway health endpoint and reflect the result.
    ///
    /// Never fails the caller; an unreachable gateway degrades the indicator.
    pub async fn check_health(&mut self, renderer: &mut dyn Renderer) {
        match self.transport.health().await {
            Ok(health) if health.is_ok() => {
                self.set_status(ConnectionStatus::Ready, renderer);
            }
            _ => {
                self.set_status(ConnectionStatus::Degraded, renderer);
            }
        }
    }

    /// Switch the active agent for subsequent chat and batch submissions.
    ///
    /// A no-op when the agent is already active; otherwise the agent's
    /// greeting is appended as a system entry.
    pub fn set_agent(&mut self, agent: Agent, renderer: &mut dyn Renderer) {
        if agent == self.agent {
            return;
        }
        self.agent = agent;
        self.record(Entry::new(Category::System, agent.greeting()), renderer);
    }

    /// The currently selected agent.
    pub fn agent(&self) -> Agent {
        self.agent
    }

    /// Append an entry to the transcript and render it.
    pub fn record(&mut self, entry: Entry, renderer: &mut dyn Renderer) {
        renderer.render(&entry);
        self.transcript.push(entry);
    }

    /// The transcript accumulated so far.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The current session identifier, if the gateway issued one.
    pub fn session_id(&self) -> Option<&str> {
        self.session.id()
    }

    /// Drop the session identifier; the next turn starts a fresh session.
    pub fn clear_session(&mut self) {
        self.session.clear();
    }

    /// Clear the transcript.
    pub fn clear(&mut self) {
        self.transcript.clear();
    }

    /// The cosmetic connection indicator.
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    fn set_status(&mut self, status: ConnectionStatus, renderer: &mut dyn Renderer) {
        if self.status != status {
            self.status = status;
            renderer.connection_status(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;

    #[derive(Default)]
    struct RecordingRenderer {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingRenderer {
        fn with_log(events: Arc<Mutex<Vec<String>>>) -> Self {
            Self { events }
        }
    }

    impl Renderer for RecordingRenderer {
        fn render(&mut self, entry: &Entry) {
            self.events
                .lock()
                .unwrap()
                .push(format!("render:{:?}", entry.category));
        }

        fn connection_status(&mut self, status: ConnectionStatus) {
            self.events
                .lock()
                .unwrap()
                .push(format!("status:{status:?}"));
        }
    }

    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<ChatReply>>>,
        requests: Mutex<Vec<(Agent, ChatRequest)>>,
        events: Arc<Mutex<Vec<String>>>,
        health: Option<HealthStatus>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<Result<ChatReply>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().collect()),
                requests: Mutex::new(Vec::new()),
                events: Arc::new(Mutex::new(Vec::new())),
                health: Some(HealthStatus {
                    status: "ok".to_string(),
                }),
            }
        }

        fn requests(&self) -> Vec<(Agent, ChatRequest)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatTransport for &ScriptedTransport {
        async fn chat(&self, agent: Agent, request: &ChatRequest) -> Result<ChatReply> {
            self.events.lock().unwrap().push("chat".to_string());
            self.requests.lock().unwrap().push((agent, request.clone()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted reply left")
        }

        async fn health(&self) -> Result<HealthStatus> {
            self.health
                .clone()
                .ok_or_else(|| Error::connection("health unreachable", None))
        }
    }

    /// Stalls forever on the first chat call, then delegates to the scripted
    /// transport.
    struct StallOnceTransport {
        inner: ScriptedTransport,
        stalled: AtomicBool,
    }

    impl StallOnceTransport {
        fn new(replies: Vec<Result<ChatReply>>) -> Self {
            Self {
                inner: ScriptedTransport::new(replies),
                stalled: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl ChatTransport for &StallOnceTransport {
        async fn chat(&self, agent: Agent, request: &ChatRequest) -> Result<ChatReply> {
            if !self.stalled.swap(true, Ordering::SeqCst) {
                futures::future::pending::<()>().await;
            }
            (&self.inner).chat(agent, request).await
        }

        async fn health(&self) -> Result<HealthStatus> {
            (&self.inner).health().await
        }
    }

    fn reply(text: &str, session_id: Option<&str>) -> Result<ChatReply> {
        Ok(ChatReply {
            response: Some(text.to_string()),
            session_id: session_id.map(String::from),
            timestamp: None,
        })
    }

    #[tokio::test]
    async fn empty_input_is_a_silent_no_op() {
        let transport = ScriptedTransport::new(vec![]);
        let mut session = ChatSession::with_transport(&transport, Agent::DocIngestion);
        let mut renderer = RecordingRenderer::default();

        session.send("", &mut renderer).await.unwrap();
        session.send("   \t  ", &mut renderer).await.unwrap();

        assert!(session.transcript().is_empty());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn user_entry_rendered_before_request_is_sent() {
        let transport = ScriptedTransport::new(vec![reply("hello back", None)]);
        let mut renderer = RecordingRenderer::with_log(transport.events.clone());
        let mut session = ChatSession::with_transport(&transport, Agent::DocIngestion);

        session.send("hello", &mut renderer).await.unwrap();

        let events = transport.events.lock().unwrap().clone();
        assert_eq!(events[0], "render:User");
        assert_eq!(events[1], "chat");
        assert_eq!(events[2], "render:Agent");
    }

    #[tokio::test]
    async fn session_id_absent_then_adopted_then_reused() {
        let transport = ScriptedTransport::new(vec![
            reply("first", Some("sess-1")),
            reply("second", Some("sess-2")),
            reply("third", None),
        ]);
        let mut session = ChatSession::with_transport(&transport, Agent::DocIngestion);
        let mut renderer = RecordingRenderer::default();

        session.send("one", &mut renderer).await.unwrap();
        session.send("two", &mut renderer).await.unwrap();
        session.send("three", &mut renderer).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].1.session_id, None);
        assert_eq!(requests[1].1.session_id.as_deref(), Some("sess-1"));
        assert_eq!(requests[2].1.session_id.as_deref(), Some("sess-2"));
        assert_eq!(session.session_id(), Some("sess-2"));
    }

    #[tokio::test]
    async fn missing_response_text_is_one_error_entry() {
        let transport = ScriptedTransport::new(vec![Ok(ChatReply {
            response: None,
            session_id: Some("sess-9".to_string()),
            timestamp: None,
        })]);
        let mut session = ChatSession::with_transport(&transport, Agent::DocIngestion);
        let mut renderer = RecordingRenderer::default();

        session.send("anyone there?", &mut renderer).await.unwrap();

        assert_eq!(session.transcript().of_category(Category::Agent).count(), 0);
        let errors: Vec<_> = session.transcript().of_category(Category::Error).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].text, "No response received from agent");
        assert_eq!(session.status(), ConnectionStatus::Degraded);
        // The session identifier was still adopted.
        assert_eq!(session.session_id(), Some("sess-9"));
    }

    #[tokio::test]
    async fn transport_failure_is_one_error_entry() {
        let transport =
            ScriptedTransport::new(vec![Err(Error::connection("connection refused", None))]);
        let mut session = ChatSession::with_transport(&transport, Agent::DocIngestion);
        let mut renderer = RecordingRenderer::default();

        session.send("hello?", &mut renderer).await.unwrap();

        assert_eq!(session.transcript().len(), 2);
        let last = session.transcript().last().unwrap();
        assert_eq!(last.category, Category::Error);
        assert!(last.text.contains("connection refused"));
        assert_eq!(session.status(), ConnectionStatus::Degraded);
    }

    #[tokio::test]
    async fn guard_released_after_failure() {
        let transport = ScriptedTransport::new(vec![
            Err(Error::connection("connection refused", None)),
            reply("recovered", None),
        ]);
        let mut session = ChatSession::with_transport(&transport, Agent::DocIngestion);
        let mut renderer = RecordingRenderer::default();

        session.send("first", &mut renderer).await.unwrap();
        assert!(!session.in_flight);

        // The next send goes through normally.
        session.send("second", &mut renderer).await.unwrap();
        assert_eq!(session.transcript().of_category(Category::Agent).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_send_does_not_wedge_the_session() {
        let transport = StallOnceTransport::new(vec![reply("still here", None)]);
        let mut session = ChatSession::with_transport(&transport, Agent::DocIngestion);
        let mut renderer = RecordingRenderer::default();

        // Deadline the first turn; the transport never answers it.
        let deadline =
            tokio::time::timeout(Duration::from_secs(1), session.send("hello?", &mut renderer))
                .await;
        assert!(deadline.is_err());
        assert!(!session.in_flight);

        // The next turn goes through normally.
        session.send("anyone?", &mut renderer).await.unwrap();
        assert_eq!(session.transcript().of_category(Category::Agent).count(), 1);
    }

    #[tokio::test]
    async fn turn_duration_is_recorded() {
        use biometrics::Sensor;

        let transport = ScriptedTransport::new(vec![reply("hi", None)]);
        let mut session = ChatSession::with_transport(&transport, Agent::DocIngestion);
        let mut renderer = RecordingRenderer::default();

        let before = observability::CHAT_TURN_DURATION.read().n;
        session.send("hello", &mut renderer).await.unwrap();
        let after = observability::CHAT_TURN_DURATION.read().n;
        assert!(after > before);
    }

    #[tokio::test]
    async fn overlapping_send_is_rejected_without_entries() {
        let transport = ScriptedTransport::new(vec![]);
        let mut session = ChatSession::with_transport(&transport, Agent::DocIngestion);
        let mut renderer = RecordingRenderer::default();

        session.in_flight = true;
        let err = session.send("too eager", &mut renderer).await.unwrap_err();
        assert!(err.is_validation());
        assert!(session.transcript().is_empty());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn agent_switch_changes_next_endpoint() {
        let transport = ScriptedTransport::new(vec![reply("doc answer", None), reply("xql", None)]);
        let mut session = ChatSession::with_transport(&transport, Agent::DocIngestion);
        let mut renderer = RecordingRenderer::default();

        session.send("describe syslog", &mut renderer).await.unwrap();
        session.set_agent(Agent::SplToXql, &mut renderer);
        session.send("index=main", &mut renderer).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].0, Agent::DocIngestion);
        assert_eq!(requests[1].0, Agent::SplToXql);

        // The switch itself left a system greeting.
        assert_eq!(session.transcript().of_category(Category::System).count(), 1);
    }

    #[tokio::test]
    async fn switching_to_the_active_agent_is_a_no_op() {
        let transport = ScriptedTransport::new(vec![]);
        let mut session = ChatSession::with_transport(&transport, Agent::DocIngestion);
        let mut renderer = RecordingRenderer::default();

        session.set_agent(Agent::DocIngestion, &mut renderer);
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn connected_after_established_exchange() {
        let transport = ScriptedTransport::new(vec![reply("hi", None)]);
        let mut session = ChatSession::with_transport(&transport, Agent::DocIngestion);
        let mut renderer = RecordingRenderer::default();

        session.send("hello", &mut renderer).await.unwrap();
        assert_eq!(session.status(), ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn health_probe_sets_ready() {
        let transport = ScriptedTransport::new(vec![]);
        let mut session = ChatSession::with_transport(&transport, Agent::DocIngestion);
        let mut renderer = RecordingRenderer::default();

        session.check_health(&mut renderer).await;
        assert_eq!(session.status(), ConnectionStatus::Ready);
    }

    #[tokio::test]
    async fn health_probe_failure_degrades() {
        let mut transport = ScriptedTransport::new(vec![]);
        transport.health = None;
        let mut session = ChatSession::with_transport(&transport, Agent::DocIngestion);
        let mut renderer = RecordingRenderer::default();

        session.check_health(&mut renderer).await;
        assert_eq!(session.status(), ConnectionStatus::Degraded);
    }
}
