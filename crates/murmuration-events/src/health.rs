//! Swarm health summary.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Tick;

/// Point-in-time summary of the murmuration, computed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub total_members: usize,
    pub transforming_count: usize,
    pub stable_count: usize,
    /// Mean degree in the connection graph; 0 for an empty swarm
    pub average_connections: f32,
    pub uptime_ticks: Tick,
    pub total_transformations: usize,
    pub active_probes: usize,
}

impl fmt::Display for HealthRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} members ({} transforming, {} stable), avg connections {:.2}, {} transformations, {} probes, uptime {} ticks",
            self.total_members,
            self.transforming_count,
            self.stable_count,
            self.average_connections,
            self.total_transformations,
            self.active_probes,
            self.uptime_ticks,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats_average_with_two_decimals() {
        let health = HealthRecord {
            total_members: 3,
            transforming_count: 1,
            stable_count: 2,
            average_connections: 2.0 / 3.0,
            uptime_ticks: 12,
            total_transformations: 4,
            active_probes: 0,
        };
        let text = health.to_string();
        assert!(text.contains("avg connections 0.67"));
        assert!(text.starts_with("3 members (1 transforming, 2 stable)"));
    }
}
