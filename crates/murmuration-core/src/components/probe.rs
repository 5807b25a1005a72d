//! Probe Registry
//!
//! Probes are short-lived stimuli. Their life drains every tick and they are
//! purged once it reaches zero.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ProbeConfig;
use crate::math::Vec2;

/// A transient external stimulus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Probe {
    pub id: String,
    pub position: Vec2,
    pub life: f32,
    pub decay_rate: f32,
    pub size: f32,
    pub growth_rate: f32,
}

impl Probe {
    pub fn new(id: impl Into<String>, position: Vec2, config: &ProbeConfig) -> Self {
        Self {
            id: id.into(),
            position,
            life: config.initial_life,
            decay_rate: config.decay_rate,
            size: config.initial_size,
            growth_rate: config.growth_rate,
        }
    }

    /// Drains life and grows the probe by one tick
    pub fn update(&mut self) {
        self.life -= self.decay_rate;
        self.size += self.growth_rate;
    }

    pub fn is_done(&self) -> bool {
        self.life <= 0.0
    }
}

/// Reference to an injected probe
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProbeHandle {
    pub id: String,
}

/// Resource: probes currently influencing the flock, in injection order
#[derive(Resource, Debug, Default)]
pub struct ActiveProbes {
    probes: Vec<Probe>,
    next_probe_id: u64,
}

impl ActiveProbes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the next probe ID
    pub fn next_id(&mut self) -> String {
        self.next_probe_id += 1;
        format!("probe_{:06}", self.next_probe_id)
    }

    pub fn spawn(&mut self, position: Vec2, config: &ProbeConfig) -> ProbeHandle {
        let id = self.next_id();
        self.probes.push(Probe::new(id.clone(), position, config));
        ProbeHandle { id }
    }

    pub fn get(&self, id: &str) -> Option<&Probe> {
        self.probes.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Probe> {
        self.probes.iter()
    }

    /// Closest probe strictly within `radius` of `position`
    pub fn nearest_within(&self, position: Vec2, radius: f32) -> Option<&Probe> {
        self.probes
            .iter()
            .map(|p| (p, p.position.distance(position)))
            .filter(|(_, d)| *d < radius)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(p, _)| p)
    }

    /// Ages every probe by one tick and removes the expired ones.
    ///
    /// Returns the ids of the removed probes.
    pub fn decay(&mut self) -> Vec<String> {
        let mut expired = Vec::new();
        self.probes.retain_mut(|probe| {
            probe.update();
            if probe.is_done() {
                expired.push(probe.id.clone());
                false
            } else {
                true
            }
        });
        expired
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}
