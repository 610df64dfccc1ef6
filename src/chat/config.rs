//! Configuration types for the chat front-end.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for the interactive session.

use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::batch::DEFAULT_POLL_INTERVAL;
use crate::error::Error;
use crate::types::Agent;

/// Command-line arguments for the parlance-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Gateway base URL.
    #[arrrg(optional, "Gateway base URL (default: PARLANCE_URL or local)", "URL")]
    pub url: Option<String>,

    /// Agent to start with.
    #[arrrg(optional, "Agent to start with: doc, spl, or dmgen (default: doc)", "AGENT")]
    pub agent: Option<String>,

    /// Batch poll interval in seconds.
    #[arrrg(optional, "Seconds between batch status polls (default: 5)", "SECONDS")]
    pub poll_interval: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for an interactive session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Gateway base URL override; None defers to the environment.
    pub base_url: Option<String>,

    /// The agent selected at startup.
    pub agent: Agent,

    /// Wall-clock spacing between batch status polls.
    pub poll_interval: Duration,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Agent: doc
    /// - Poll interval: 5 seconds
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            base_url: None,
            agent: Agent::DocIngestion,
            poll_interval: DEFAULT_POLL_INTERVAL,
            use_color: true,
        }
    }

    /// Sets the gateway base URL.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Sets the starting agent.
    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.agent = agent;
        self
    }

    /// Sets the batch poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = Error;

    /// Fails when the agent selector is unrecognized; no request is ever
    /// issued for an unknown agent.
    fn try_from(args: ChatArgs) -> Result<Self, Error> {
        let agent = match args.agent {
            Some(selector) => selector.parse::<Agent>()?,
            None => Agent::DocIngestion,
        };
        let poll_interval = args
            .poll_interval
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        Ok(ChatConfig {
            base_url: args.url,
            agent,
            poll_interval,
            use_color: !args.no_color,
        })
    }
}
