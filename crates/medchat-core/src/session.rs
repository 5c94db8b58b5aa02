//! In-memory log of successful exchanges.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// One user message and the generated reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    /// The user's message, verbatim
    #[serde(rename = "user")]
    pub user_text: String,
    /// The generated reply
    #[serde(rename = "bot")]
    pub bot_text: String,
    /// When the reply was received
    pub timestamp: DateTime<Utc>,
}

impl Exchange {
    /// Create an exchange stamped with the current time
    pub fn now(user_text: impl Into<String>, bot_text: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
            bot_text: bot_text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Append-only, process-lifetime conversation log.
///
/// Appends are serialized by the lock, so concurrent writers never lose or
/// interleave entries.
#[derive(Debug, Default)]
pub struct SessionLog {
    entries: RwLock<Vec<Exchange>>,
}

impl SessionLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exchange to the end of the log
    pub fn append(&self, exchange: Exchange) {
        self.entries.write().push(exchange);
    }

    /// Snapshot of every exchange, in insertion order
    #[must_use]
    pub fn all(&self) -> Vec<Exchange> {
        self.entries.read().clone()
    }

    /// Number of recorded exchanges
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing has been recorded yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
