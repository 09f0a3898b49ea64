//! Conversation history and windowing.
//!
//! A turn is exactly two entries: the user's message followed by the lead
//! agent's reply. History is only ever replaced as a whole document, so the
//! type exposes "append a turn" as a function returning a new `History`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person being counseled.
    User,
    /// The lead counseling agent.
    Agent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Agent => "agent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub text: String,
}

impl HistoryEntry {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(Role::Agent, text)
    }
}

/// Ordered, append-only conversation record for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<HistoryEntry>);

impl History {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.0
    }

    pub fn into_entries(self) -> Vec<HistoryEntry> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of completed turns.
    pub fn turns(&self) -> usize {
        self.0.len() / 2
    }

    /// Returns a new history with one (user, agent) pair appended.
    pub fn with_turn(&self, user_text: impl Into<String>, agent_text: impl Into<String>) -> Self {
        let mut entries = Vec::with_capacity(self.0.len() + 2);
        entries.extend_from_slice(&self.0);
        entries.push(HistoryEntry::user(user_text));
        entries.push(HistoryEntry::agent(agent_text));
        Self(entries)
    }

    /// True if entries alternate user/agent starting with user and the
    /// length is even.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() % 2 == 0
            && self.0.iter().enumerate().all(|(i, entry)| {
                let expected = if i % 2 == 0 { Role::User } else { Role::Agent };
                entry.role == expected
            })
    }

    /// The most recent `max_turns` turns. See [`window`].
    pub fn window(&self, max_turns: usize) -> &[HistoryEntry] {
        window(&self.0, max_turns)
    }
}

/// Trims a history to its most recent `max_turns` turns.
///
/// Returns the input unchanged when it holds at most `2 * max_turns`
/// entries, otherwise the last `2 * max_turns` entries. The cut is always an
/// even distance from the end, so a well-formed history never loses half of
/// a (user, agent) pair.
pub fn window(history: &[HistoryEntry], max_turns: usize) -> &[HistoryEntry] {
    let max_entries = max_turns.saturating_mul(2);
    if history.len() <= max_entries {
        return history;
    }
    &history[history.len() - max_entries..]
}

/// Renders entries as `role: text` lines for prompt context.
pub fn render_transcript(entries: &[HistoryEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("{}: {}", entry.role, entry.text))
        .collect::<Vec<_>>()
        .join("\n")
}
