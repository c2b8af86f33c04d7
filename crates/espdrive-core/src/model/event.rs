// ── Event history domain types ──

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::command::CommandKind;

/// One historical command, as reported by the events service.
///
/// Read-only projection of server data. `command` keeps the raw string
/// verbatim; `kind` is set when it matches a known wire token.
/// `timestamp` is `None` when the server value could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub command: String,
    pub kind: Option<CommandKind>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl EventRecord {
    pub fn new(id: impl Into<String>, command: impl Into<String>, timestamp: Option<DateTime<Utc>>) -> Self {
        let command = command.into();
        Self {
            id: id.into(),
            kind: CommandKind::from_token(&command),
            command,
            timestamp,
        }
    }

    /// Case-insensitive match of the raw command against a kind's token.
    pub fn is_command(&self, kind: CommandKind) -> bool {
        self.command.trim().eq_ignore_ascii_case(kind.token())
    }
}

/// Bucket key for grouped history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "date")]
pub enum GroupKey {
    Day(NaiveDate),
    /// Records whose timestamp could not be parsed. Always sorts last.
    UnknownDate,
}

/// Records sharing one calendar day, with a display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventGroup {
    pub key: GroupKey,
    pub label: String,
    pub records: Vec<EventRecord>,
}

impl EventGroup {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
