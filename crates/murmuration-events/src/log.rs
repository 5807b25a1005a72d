//! Log entries kept in the engine's bounded history.

use serde::{Deserialize, Serialize};

use crate::Tick;

/// A single timestamped log message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: Tick,
    pub message: String,
}

impl LogEntry {
    pub fn new(timestamp: Tick, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }
}
