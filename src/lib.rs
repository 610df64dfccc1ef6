// Public modules
pub mod batch;
pub mod chat;
pub mod client;
pub mod error;
pub mod observability;
pub mod render;
pub mod session;
pub mod transcript;
pub mod types;

// Re-exports
pub use batch::{
    BatchOutcome, BatchTracker, DEFAULT_POLL_INTERVAL, StatusSource, poll_until_terminal,
    submit_and_track,
};
pub use client::Gateway;
pub use error::{Error, Result};
pub use render::{PlainTextRenderer, Renderer};
pub use session::SessionContext;
pub use transcript::{Category, ConnectionStatus, Entry, Transcript};
pub use types::*;
