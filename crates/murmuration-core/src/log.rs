//! Event Log
//!
//! Bounded FIFO of log messages plus the append-only transformation log.

use bevy_ecs::prelude::*;
use murmuration_events::{LogEntry, Tick, TransformationArt, TransformationRecord};
use std::collections::VecDeque;

/// Resource: recent log messages and every transformation so far
#[derive(Resource, Debug)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    transformations: Vec<TransformationRecord>,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            transformations: Vec::new(),
        }
    }

    /// Appends a message, evicting the oldest entry once over capacity
    pub fn record(&mut self, timestamp: Tick, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(target: "murmuration", tick = timestamp, "{}", message);

        self.entries.push_back(LogEntry::new(timestamp, message));
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn push_transformation(&mut self, record: TransformationRecord) {
        self.transformations.push(record);
    }

    /// Last `limit` log entries, oldest first
    pub fn recent_entries(&self, limit: usize) -> Vec<LogEntry> {
        let skip = self.entries.len().saturating_sub(limit);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// Last `limit` transformation records, oldest first
    pub fn transformations(&self, limit: usize) -> Vec<TransformationRecord> {
        let start = self.transformations.len().saturating_sub(limit);
        self.transformations[start..].to_vec()
    }

    pub fn transformation_art(&self, limit: usize) -> Vec<TransformationArt> {
        let start = self.transformations.len().saturating_sub(limit);
        self.transformations[start..]
            .iter()
            .map(TransformationArt::from)
            .collect()
    }

    pub fn total_transformations(&self) -> usize {
        self.transformations.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
