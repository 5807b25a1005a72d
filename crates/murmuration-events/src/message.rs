//! Messages exchanged between members.

use serde::{Deserialize, Serialize};

use crate::Tick;

/// A message routed through the murmuration.
///
/// Probe messages trigger a transformation in their receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender: String,
    pub receiver: String,
    pub content: String,
    pub timestamp: Tick,
    pub is_probe: bool,
    pub hops: u32,
    /// Member ids the message has passed through, starting with the sender
    pub route: Vec<String>,
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        content: impl Into<String>,
        timestamp: Tick,
        is_probe: bool,
    ) -> Self {
        let sender = sender.into();
        Self {
            id: id.into(),
            route: vec![sender.clone()],
            sender,
            receiver: receiver.into(),
            content: content.into(),
            timestamp,
            is_probe,
            hops: 0,
        }
    }
}
