//! Simulation Context
//!
//! [`Simulation`] owns the ECS world holding every member, probe, the
//! connection graph, the clock and the logs. Adapters drive it through
//! [`Simulation::tick`] and read it through the query methods; nothing else
//! mutates its state.

use bevy_ecs::prelude::*;
use murmuration_events::{
    HealthRecord, LogEntry, MemberKind, Message, Tick, TransformationArt, TransformationRecord,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, VecDeque};

use crate::clock::SimulationClock;
use crate::components::member::{
    Capabilities, Kinematics, Member, MemberBundle, MemberId, MemberView, Position, Steering,
    Transformation, Velocity,
};
use crate::components::probe::{ActiveProbes, Probe, ProbeHandle};
use crate::config::SimulationConfig;
use crate::error::{Result, SimulationError};
use crate::graph::ConnectionGraph;
use crate::log::EventLog;
use crate::math::Vec2;
use crate::systems::{
    advance_transformations, compute_steering, decay_probes, detect_probe_contact,
    integrate_motion, process_transformations, TransformationQueue,
};
use crate::SimRng;

/// Reference to a member that joined the murmuration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberHandle {
    pub id: String,
    entity: Entity,
}

impl MemberHandle {
    pub fn entity(&self) -> Entity {
        self.entity
    }
}

/// The murmuration engine
pub struct Simulation {
    world: World,
    tick_schedule: Schedule,
    trigger_schedule: Schedule,
    members: BTreeMap<String, Entity>,
    /// Most recent messages, bounded by the log capacity
    messages: VecDeque<Message>,
}

impl Simulation {
    /// Creates a simulation seeded for reproducible runs
    pub fn new(config: SimulationConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }

    pub fn with_rng(config: SimulationConfig, rng: SmallRng) -> Result<Self> {
        config.validate()?;
        let message_capacity = config.log.capacity;

        let mut world = World::new();
        world.insert_resource(EventLog::new(config.log.capacity));
        world.insert_resource(ConnectionGraph::new(
            config.connections.min_peers,
            config.connections.max_peers,
        ));
        world.insert_resource(SimulationClock::new());
        world.insert_resource(ActiveProbes::new());
        world.insert_resource(TransformationQueue::new());
        world.insert_resource(SimRng(rng));
        world.insert_resource(config);

        // Clock first, then probe contact on start-of-tick positions, then
        // forces from the same snapshot, motion and probe decay
        let mut tick_schedule = Schedule::default();
        tick_schedule.add_systems(
            (
                advance_transformations,
                detect_probe_contact,
                process_transformations,
                compute_steering,
                integrate_motion,
                decay_probes,
            )
                .chain(),
        );

        // Applies direct triggers between ticks
        let mut trigger_schedule = Schedule::default();
        trigger_schedule.add_systems(process_transformations);

        Ok(Self {
            world,
            tick_schedule,
            trigger_schedule,
            members: BTreeMap::new(),
            messages: VecDeque::with_capacity(message_capacity),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        self.world.resource::<SimulationConfig>()
    }

    pub fn current_tick(&self) -> Tick {
        self.world.resource::<SimulationClock>().now()
    }

    /// Joins a member at a random position inside the world
    pub fn add_member(&mut self, id: &str, kind: MemberKind) -> Result<MemberHandle> {
        let (width, height) = {
            let world = &self.config().world;
            (world.width, world.height)
        };
        let position = {
            let mut rng = self.world.resource_mut::<SimRng>();
            Vec2::new(rng.0.gen_range(0.0..width), rng.0.gen_range(0.0..height))
        };
        self.add_member_at(id, kind, position)
    }

    /// Joins a member at an explicit position
    pub fn add_member_at(
        &mut self,
        id: &str,
        kind: MemberKind,
        position: Vec2,
    ) -> Result<MemberHandle> {
        if id.is_empty() {
            return Err(SimulationError::EmptyMemberId);
        }
        if self.members.contains_key(id) {
            return Err(SimulationError::DuplicateMember(id.to_string()));
        }
        self.check_position(position)?;

        let (velocity, capabilities) = {
            let mut sim_rng = self.world.resource_mut::<SimRng>();
            let rng = &mut sim_rng.0;
            let velocity = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0));
            (velocity, Capabilities::generate(kind, rng))
        };
        let peers = self.world.resource_scope(|world, mut rng: Mut<SimRng>| {
            world.resource_mut::<ConnectionGraph>().join(id, &mut rng.0)
        });

        let kinematics = {
            let flocking = &self.config().flocking;
            Kinematics {
                max_speed: flocking.max_speed,
                max_force: flocking.max_force,
            }
        };
        let entity = self
            .world
            .spawn(MemberBundle {
                marker: Member,
                id: MemberId(id.to_string()),
                position: Position(position),
                velocity: Velocity(velocity.limit(kinematics.max_speed)),
                kinematics,
                steering: Steering::default(),
                capabilities,
                transformation: Transformation::default(),
            })
            .id();
        self.members.insert(id.to_string(), entity);

        tracing::debug!(member = id, %kind, ?peers, "member connected");
        self.record(format!("Node {} joined the murmuration", id));

        Ok(MemberHandle {
            id: id.to_string(),
            entity,
        })
    }

    /// Removes a member, its graph edges and any pending stabilization.
    ///
    /// Returns false for unknown ids.
    pub fn remove_member(&mut self, id: &str) -> bool {
        let Some(entity) = self.members.remove(id) else {
            return false;
        };

        let pending = self
            .world
            .get::<Transformation>(entity)
            .and_then(|t| t.pending);
        if let Some(handle) = pending {
            self.world.resource_mut::<SimulationClock>().cancel(handle);
        }
        self.world.resource_mut::<ConnectionGraph>().leave(id);
        self.world.despawn(entity);

        self.record(format!("Node {} left the murmuration", id));
        true
    }

    /// Places a probe. Members find it through proximity on the next tick.
    pub fn inject_probe(&mut self, position: Vec2) -> Result<ProbeHandle> {
        self.check_position(position)?;

        let config = self.config().probes.clone();
        let handle = self
            .world
            .resource_mut::<ActiveProbes>()
            .spawn(position, &config);
        self.record(format!(
            "Probe {} injected at ({:.1}, {:.1})",
            handle.id, position.x, position.y
        ));
        Ok(handle)
    }

    /// Places a probe and immediately transforms the nearest stable member
    pub fn inject_targeted_probe(&mut self, position: Vec2) -> Result<ProbeHandle> {
        let handle = self.inject_probe(position)?;

        let nearest = self
            .members
            .values()
            .filter_map(|&entity| {
                let transformation = self.world.get::<Transformation>(entity)?;
                if transformation.is_transforming() {
                    return None;
                }
                let d = self.world.get::<Position>(entity)?.0.distance(position);
                Some((entity, d))
            })
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(entity, _)| entity);

        if let Some(entity) = nearest {
            self.apply_trigger(entity, Some(handle.id.clone()));
        }
        Ok(handle)
    }

    /// Transforms a member without a probe.
    ///
    /// Returns false if the member is unknown or already transforming.
    pub fn trigger_transformation(&mut self, id: &str) -> bool {
        let Some(&entity) = self.members.get(id) else {
            return false;
        };
        self.apply_trigger(entity, None)
    }

    /// Routes a message to a member. Probe messages transform the receiver.
    pub fn send_message(
        &mut self,
        sender: &str,
        receiver: &str,
        content: &str,
        is_probe: bool,
    ) -> Message {
        let id = {
            let mut rng = self.world.resource_mut::<SimRng>();
            let token = uuid::Builder::from_random_bytes(rng.0.gen()).into_uuid();
            format!("msg_{}", token.simple())
        };
        let message = Message::new(id, sender, receiver, content, self.current_tick(), is_probe);
        self.record(format!(
            "Message {} sent from {} to {}",
            message.id, sender, receiver
        ));
        if self.messages.len() == self.config().log.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message.clone());

        if is_probe {
            match self.members.get(receiver).copied() {
                Some(entity) => {
                    self.apply_trigger(entity, Some(message.id.clone()));
                }
                None => tracing::debug!(receiver, "probe message for unknown member"),
            }
        }
        message
    }

    /// Advances the simulation by one tick
    pub fn tick(&mut self) {
        self.tick_schedule.run(&mut self.world);
        tracing::debug!(
            tick = self.current_tick(),
            members = self.members.len(),
            probes = self.world.resource::<ActiveProbes>().len(),
            "tick complete"
        );
    }

    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Swarm summary computed from the current state
    pub fn health(&self) -> HealthRecord {
        let total_members = self.members.len();
        let transforming_count = self
            .members
            .values()
            .filter_map(|&entity| self.world.get::<Transformation>(entity))
            .filter(|t| t.is_transforming())
            .count();

        HealthRecord {
            total_members,
            transforming_count,
            stable_count: total_members - transforming_count,
            average_connections: self.world.resource::<ConnectionGraph>().average_degree(),
            uptime_ticks: self.current_tick(),
            total_transformations: self.world.resource::<EventLog>().total_transformations(),
            active_probes: self.world.resource::<ActiveProbes>().len(),
        }
    }

    /// Last `limit` transformation records, oldest first
    pub fn recent_transformations(&self, limit: usize) -> Vec<TransformationRecord> {
        self.world.resource::<EventLog>().transformations(limit)
    }

    /// Last `limit` log entries, oldest first
    pub fn recent_log(&self, limit: usize) -> Vec<LogEntry> {
        self.world.resource::<EventLog>().recent_entries(limit)
    }

    pub fn transformation_art(&self, limit: usize) -> Vec<TransformationArt> {
        self.world.resource::<EventLog>().transformation_art(limit)
    }

    pub fn recent_messages(&self, limit: usize) -> Vec<Message> {
        let skip = self.messages.len().saturating_sub(limit);
        self.messages.iter().skip(skip).cloned().collect()
    }

    pub fn contains_member(&self, id: &str) -> bool {
        self.members.contains_key(id)
    }

    pub fn member(&self, id: &str) -> Option<MemberView> {
        let entity = *self.members.get(id)?;
        self.view(id, entity)
    }

    /// Every member, ordered by id
    pub fn members(&self) -> Vec<MemberView> {
        self.members
            .iter()
            .filter_map(|(id, &entity)| self.view(id, entity))
            .collect()
    }

    pub fn probes(&self) -> Vec<Probe> {
        self.world.resource::<ActiveProbes>().iter().cloned().collect()
    }

    /// Members strictly within `range` of the given member, by distance. Flocking uses
    /// this notion of neighbour; it is unrelated to the connection graph.
    pub fn spatial_neighbors(&self, id: &str, range: f32) -> Vec<String> {
        let Some(origin) = self
            .members
            .get(id)
            .and_then(|&entity| self.world.get::<Position>(entity))
            .map(|p| p.0)
        else {
            return Vec::new();
        };

        let mut nearby: Vec<(String, f32)> = self
            .members
            .iter()
            .filter(|(other, _)| other.as_str() != id)
            .filter_map(|(other, &entity)| {
                let d = self.world.get::<Position>(entity)?.0.distance(origin);
                (d < range).then(|| (other.clone(), d))
            })
            .collect();
        nearby.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        nearby.into_iter().map(|(other, _)| other).collect()
    }

    /// Peers linked to the member in the connection graph
    pub fn graph_neighbors(&self, id: &str) -> Vec<String> {
        self.world.resource::<ConnectionGraph>().neighbors_of(id)
    }

    pub fn graph(&self) -> &ConnectionGraph {
        self.world.resource::<ConnectionGraph>()
    }

    fn apply_trigger(&mut self, entity: Entity, probe_id: Option<String>) -> bool {
        let before = self.world.get::<Transformation>(entity).map(|t| t.count);
        self.world
            .resource_mut::<TransformationQueue>()
            .push(entity, probe_id);
        self.trigger_schedule.run(&mut self.world);
        let after = self.world.get::<Transformation>(entity).map(|t| t.count);
        before.is_some() && after != before
    }

    fn record(&mut self, message: String) {
        let now = self.current_tick();
        self.world.resource_mut::<EventLog>().record(now, message);
    }

    fn check_position(&self, position: Vec2) -> Result<()> {
        if !position.is_finite() {
            return Err(SimulationError::NonFinitePosition(position));
        }
        let world = &self.config().world;
        if position.x < 0.0 || position.x > world.width || position.y < 0.0 || position.y > world.height {
            return Err(SimulationError::OutOfBounds {
                x: position.x,
                y: position.y,
                width: world.width,
                height: world.height,
            });
        }
        Ok(())
    }

    fn view(&self, id: &str, entity: Entity) -> Option<MemberView> {
        let capabilities = self.world.get::<Capabilities>(entity)?;
        let transformation = self.world.get::<Transformation>(entity)?;
        Some(MemberView {
            id: id.to_string(),
            kind: capabilities.kind,
            region: capabilities.region,
            position: self.world.get::<Position>(entity)?.0,
            velocity: self.world.get::<Velocity>(entity)?.0,
            state: transformation.state,
            transform_elapsed: transformation.elapsed,
            transformation_count: transformation.count,
            last_transform: transformation.last_transform,
            connections: self.graph_neighbors(id),
        })
    }
}
