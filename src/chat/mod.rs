//! Interactive chat front-end for the agent gateway.
//!
//! This module provides a REPL-style chat interface built on top of the
//! parlance client library. It supports:
//!
//! - One chat turn at a time with session continuity
//! - Agent switching without restart
//! - Batch file submissions tracked between prompts
//! - Slash commands for session control
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Core chat session management and API interaction
//! - [`commands`]: Slash command parsing and handling

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use session::{ChatSession, ChatTransport};
