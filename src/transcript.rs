//! The transcript model.
//!
//! An append-only, ordered list of categorized entries, kept free of any
//! display concern so message sequencing can be tested without a rendering
//! surface. A [`crate::Renderer`] projects entries to the actual display.

use serde::{Deserialize, Serialize};

/// Category of a transcript entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// User-authored message.
    User,
    /// Agent reply.
    Agent,
    /// Informational notice (agent switches, batch progress).
    System,
    /// Failure surfaced to the user.
    Error,
}

/// One immutable transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Entry category.
    pub category: Category,
    /// Entry text.
    pub text: String,
    /// Hyperlink payload, set on batch download-link entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl Entry {
    /// Creates a plain text entry.
    pub fn new(category: Category, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
            href: None,
        }
    }

    /// Creates a download-link entry.
    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            category: Category::System,
            text: text.into(),
            href: Some(href.into()),
        }
    }
}

/// Cosmetic connection indicator derived from transcript activity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No probe has run yet.
    #[default]
    Unknown,
    /// Health probe succeeded.
    Ready,
    /// At least one agent exchange has landed.
    Connected,
    /// The last operation failed.
    Degraded,
}

/// Ordered, append-only list of categorized messages.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
    agent_replies: usize,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry; returns the total entry count.
    pub fn push(&mut self, entry: Entry) -> usize {
        if entry.category == Category::Agent {
            self.agent_replies += 1;
        }
        self.entries.push(entry);
        self.entries.len()
    }

    /// All entries in append order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The most recent entry, if any.
    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the transcript holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of agent-category entries.
    pub fn agent_replies(&self) -> usize {
        self.agent_replies
    }

    /// Whether the transcript shows an established exchange.
    ///
    /// Heuristic carried over from the original indicator: an agent reply
    /// after at least one prior entry. Cosmetic only, not a contract.
    pub fn looks_connected(&self) -> bool {
        self.agent_replies >= 1 && self.entries.len() > 1
    }

    /// Entries of one category, in order.
    pub fn of_category(&self, category: Category) -> impl Iterator<Item = &Entry> {
        self.entries
            .iter()
            .filter(move |entry| entry.category == category)
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.agent_replies = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_only_ordering() {
        let mut transcript = Transcript::new();
        transcript.push(Entry::new(Category::User, "first"));
        transcript.push(Entry::new(Category::Agent, "second"));
        transcript.push(Entry::new(Category::Error, "third"));
        let texts: Vec<&str> = transcript
            .entries()
            .iter()
            .map(|entry| entry.text.as_str())
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn push_returns_running_count() {
        let mut transcript = Transcript::new();
        assert_eq!(transcript.push(Entry::new(Category::User, "a")), 1);
        assert_eq!(transcript.push(Entry::new(Category::Agent, "b")), 2);
    }

    #[test]
    fn connected_needs_agent_reply_beyond_first_entry() {
        let mut transcript = Transcript::new();
        assert!(!transcript.looks_connected());
        transcript.push(Entry::new(Category::User, "hi"));
        assert!(!transcript.looks_connected());
        transcript.push(Entry::new(Category::Agent, "hello"));
        assert!(transcript.looks_connected());
    }

    #[test]
    fn category_filter() {
        let mut transcript = Transcript::new();
        transcript.push(Entry::new(Category::User, "q"));
        transcript.push(Entry::new(Category::Error, "boom"));
        transcript.push(Entry::new(Category::Error, "bang"));
        assert_eq!(transcript.of_category(Category::Error).count(), 2);
        assert_eq!(transcript.of_category(Category::Agent).count(), 0);
    }

    #[test]
    fn link_entries_carry_href() {
        let mut transcript = Transcript::new();
        transcript.push(Entry::link("Download result file", "/results/x.csv"));
        let entry = transcript.last().unwrap();
        assert_eq!(entry.category, Category::System);
        assert_eq!(entry.href.as_deref(), Some("/results/x.csv"));
    }

    #[test]
    fn clear_resets_counts() {
        let mut transcript = Transcript::new();
        transcript.push(Entry::new(Category::User, "q"));
        transcript.push(Entry::new(Category::Agent, "a"));
        transcript.clear();
        assert!(transcript.is_empty());
        assert_eq!(transcript.agent_replies(), 0);
        assert!(!transcript.looks_connected());
    }
}
