//! Murmuration simulation engine.
//!
//! A swarm of members moves under flocking dynamics. Probes injected into the
//! world push nearby members into a short transformation, each of which emits
//! a [`TransformationRecord`](murmuration_events::TransformationRecord) and a
//! log entry. [`Simulation`] is the entry point; adapters call its operations
//! and read its queries.
//!
//! ```
//! use murmuration_core::{Simulation, SimulationConfig, Vec2};
//! use murmuration_events::MemberKind;
//!
//! let mut sim = Simulation::new(SimulationConfig::default(), 42).unwrap();
//! sim.add_member_at("sparrow", MemberKind::Standard, Vec2::new(500.0, 500.0)).unwrap();
//! sim.inject_probe(Vec2::new(500.0, 510.0)).unwrap();
//! sim.tick();
//! assert_eq!(sim.health().transforming_count, 1);
//! ```

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod clock;
pub mod components;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod log;
pub mod math;
pub mod simulation;
pub mod systems;

pub use clock::{CancelHandle, ScheduledEffect, SimulationClock};
pub use components::{MemberView, Probe, ProbeHandle};
pub use config::{ConfigError, SimulationConfig};
pub use error::SimulationError;
pub use export::TransformationWriter;
pub use graph::ConnectionGraph;
pub use log::EventLog;
pub use math::Vec2;
pub use simulation::{MemberHandle, Simulation};

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
