//! Configuration System
//!
//! All tuning parameters for the murmuration, loadable from a TOML file.
//! Every section falls back to its defaults, so a partial file is valid.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "murmuration.toml";

/// Complete simulation configuration.
#[derive(Resource, Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub flocking: FlockingConfig,
    #[serde(default)]
    pub probes: ProbeConfig,
    #[serde(default)]
    pub transformation: TransformationConfig,
    #[serde(default)]
    pub connections: ConnectionConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Simulation bounds. Members bounce off the edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
        }
    }
}

/// Flocking limits, radii and weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockingConfig {
    pub max_speed: f32,
    pub max_force: f32,
    pub desired_separation: f32,
    pub neighbor_distance: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
}

impl Default for FlockingConfig {
    fn default() -> Self {
        Self {
            max_speed: 3.0,
            max_force: 0.1,
            desired_separation: 40.0,
            neighbor_distance: 100.0,
            separation_weight: 1.5,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
        }
    }
}

/// Probe lifetime and influence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub initial_life: f32,
    /// Life lost per tick
    pub decay_rate: f32,
    pub initial_size: f32,
    /// Size gained per tick
    pub growth_rate: f32,
    pub avoidance_radius: f32,
    pub avoidance_weight: f32,
    pub trigger_radius: f32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            initial_life: 100.0,
            decay_rate: 2.0,
            initial_size: 10.0,
            growth_rate: 0.2,
            avoidance_radius: 100.0,
            avoidance_weight: 0.5,
            trigger_radius: 50.0,
        }
    }
}

/// Transformation timing and propagation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformationConfig {
    /// Ticks a member spends transforming (60 ticks is about 2s at 30 Hz)
    pub duration_ticks: u64,
    /// Notify graph peers when a member transforms
    pub propagate_to_peers: bool,
}

impl Default for TransformationConfig {
    fn default() -> Self {
        Self {
            duration_ticks: 60,
            propagate_to_peers: true,
        }
    }
}

/// Peer count drawn for each joining member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub min_peers: usize,
    pub max_peers: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            min_peers: 2,
            max_peers: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub capacity: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

impl SimulationConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serializes the configuration as pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Loads configuration from the default path, or uses defaults if it cannot be read
    pub fn load_or_default() -> Self {
        Self::from_file(DEFAULT_CONFIG_PATH).unwrap_or_else(|e| {
            tracing::warn!("Could not load {}: {}. Using defaults.", DEFAULT_CONFIG_PATH, e);
            Self::default()
        })
    }

    /// Rejects parameters the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("world.width", self.world.width)?;
        positive("world.height", self.world.height)?;

        positive("flocking.max_speed", self.flocking.max_speed)?;
        positive("flocking.max_force", self.flocking.max_force)?;
        non_negative("flocking.desired_separation", self.flocking.desired_separation)?;
        non_negative("flocking.neighbor_distance", self.flocking.neighbor_distance)?;
        non_negative("flocking.separation_weight", self.flocking.separation_weight)?;
        non_negative("flocking.alignment_weight", self.flocking.alignment_weight)?;
        non_negative("flocking.cohesion_weight", self.flocking.cohesion_weight)?;

        positive("probes.initial_life", self.probes.initial_life)?;
        positive("probes.decay_rate", self.probes.decay_rate)?;
        non_negative("probes.initial_size", self.probes.initial_size)?;
        non_negative("probes.growth_rate", self.probes.growth_rate)?;
        non_negative("probes.avoidance_radius", self.probes.avoidance_radius)?;
        non_negative("probes.avoidance_weight", self.probes.avoidance_weight)?;
        non_negative("probes.trigger_radius", self.probes.trigger_radius)?;

        if self.transformation.duration_ticks == 0 {
            return Err(ConfigError::invalid(
                "transformation.duration_ticks",
                "must be at least 1",
            ));
        }
        if self.connections.min_peers > self.connections.max_peers {
            return Err(ConfigError::invalid(
                "connections.min_peers",
                format!(
                    "{} exceeds connections.max_peers ({})",
                    self.connections.min_peers, self.connections.max_peers
                ),
            ));
        }
        if self.log.capacity == 0 {
            return Err(ConfigError::invalid("log.capacity", "must be at least 1"));
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be positive, got {}", value)))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be non-negative, got {}", value)))
    }
}

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
