//! Output rendering for the transcript.
//!
//! The transcript itself is a pure model; this module provides the adapter
//! that projects entries onto a display. The default implementation writes
//! to stdout with ANSI styling per category.

use std::io::{self, Stdout, Write};

use crate::transcript::{Category, ConnectionStatus, Entry};

/// ANSI escape code for dim text (used for system notices).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for download links).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for agent replies).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Trait for rendering transcript output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - Collecting renderers in tests
pub trait Renderer: Send {
    /// Render one transcript entry as it is appended.
    fn render(&mut self, entry: &Entry);

    /// Reflect a change of the cosmetic connection indicator.
    fn connection_status(&mut self, status: ConnectionStatus);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            use_color: true,
        }
    }

    /// Creates a new PlainTextRenderer with the specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    fn styled(&mut self, prefix: &str, color: &str, text: &str) {
        let mut lock = self.stdout.lock();
        if self.use_color {
            let _ = writeln!(lock, "{color}{prefix}{text}{ANSI_RESET}");
        } else {
            let _ = writeln!(lock, "{prefix}{text}");
        }
        let _ = lock.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn render(&mut self, entry: &Entry) {
        match entry.category {
            Category::User => self.styled("You: ", "", &entry.text),
            Category::Agent => self.styled("Agent: ", ANSI_GREEN, &entry.text),
            Category::System => {
                if let Some(href) = entry.href.as_deref() {
                    let line = format!("{} -> {}", entry.text, href);
                    self.styled("", ANSI_CYAN, &line);
                } else {
                    self.styled("", ANSI_DIM, &entry.text);
                }
            }
            Category::Error => self.styled("error: ", ANSI_RED, &entry.text),
        }
    }

    fn connection_status(&mut self, status: ConnectionStatus) {
        let text = match status {
            ConnectionStatus::Unknown => "connection status unknown",
            ConnectionStatus::Ready => "gateway ready",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Degraded => "connection issue",
        };
        self.styled("", ANSI_DIM, text);
    }
}
