//! Transformation System
//!
//! Drives the stable <-> transforming cycle. Triggers are queued by probe
//! contact (or direct requests), processed in one place, and each accepted
//! trigger schedules its own stabilization on the clock.

use bevy_ecs::prelude::*;
use murmuration_events::{Signature, SymbolicState, Tick, TransformationRecord};
use rand::Rng;

use crate::clock::{ScheduledEffect, SimulationClock};
use crate::components::member::{Capabilities, MemberId, Position, Transformation};
use crate::components::probe::ActiveProbes;
use crate::config::SimulationConfig;
use crate::graph::ConnectionGraph;
use crate::log::EventLog;
use crate::SimRng;

/// A request to transform one member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformationTrigger {
    pub member: Entity,
    /// Probe or probe message responsible; `None` when self-triggered
    pub probe_id: Option<String>,
}

/// Resource: triggers waiting to be processed
#[derive(Resource, Debug, Default)]
pub struct TransformationQueue {
    pub triggers: Vec<TransformationTrigger>,
}

impl TransformationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, member: Entity, probe_id: Option<String>) {
        self.triggers.push(TransformationTrigger { member, probe_id });
    }

    pub fn drain(&mut self) -> Vec<TransformationTrigger> {
        std::mem::take(&mut self.triggers)
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}

/// Random `0x`-prefixed 16 hex digit token
pub fn generate_signature(rng: &mut impl Rng) -> Signature {
    let mut nibbles = [0u8; 16];
    for nibble in nibbles.iter_mut() {
        *nibble = rng.gen_range(0..16);
    }
    Signature::from_nibbles(nibbles)
}

/// Builds the record for a member that just entered the transforming state
pub fn create_record(
    member_id: &str,
    probe_id: Option<String>,
    capabilities: &Capabilities,
    timestamp: Tick,
    rng: &mut impl Rng,
) -> TransformationRecord {
    let generators = &capabilities.art_generators;
    let art_type = generators[rng.gen_range(0..generators.len())];
    let new_state = SymbolicState::ALL[rng.gen_range(0..SymbolicState::ALL.len())];

    TransformationRecord {
        node_id: member_id.to_string(),
        probe_id,
        timestamp,
        art_type,
        new_state,
        signature: generate_signature(rng),
    }
}

/// System: advance the clock, count transformation ticks and apply due stabilizations
pub fn advance_transformations(
    config: Res<SimulationConfig>,
    mut clock: ResMut<SimulationClock>,
    mut log: ResMut<EventLog>,
    mut members: Query<(&MemberId, &mut Transformation)>,
) {
    let due = clock.advance();
    let now = clock.now();
    let duration = config.transformation.duration_ticks;

    for (_, mut transformation) in members.iter_mut() {
        transformation.advance(duration);
    }

    for effect in due {
        match effect {
            ScheduledEffect::Stabilize { member } => match members.get_mut(member) {
                Ok((id, mut transformation)) => {
                    if transformation.stabilize() {
                        log.record(now, format!("Node {} stabilized after transformation", id.0));
                    }
                }
                Err(_) => {
                    tracing::debug!(?member, "stabilization target no longer exists");
                }
            },
        }
    }
}

/// System: queue every stable member that is inside a probe's trigger radius
pub fn detect_probe_contact(
    config: Res<SimulationConfig>,
    probes: Res<ActiveProbes>,
    mut queue: ResMut<TransformationQueue>,
    members: Query<(Entity, &Position, &Transformation)>,
) {
    if probes.is_empty() {
        return;
    }

    for (entity, position, transformation) in members.iter() {
        if transformation.is_transforming() {
            continue;
        }
        if let Some(probe) = probes.nearest_within(position.0, config.probes.trigger_radius) {
            queue.push(entity, Some(probe.id.clone()));
        }
    }
}

/// System: apply queued triggers to members that are still stable
pub fn process_transformations(
    config: Res<SimulationConfig>,
    mut queue: ResMut<TransformationQueue>,
    mut rng: ResMut<SimRng>,
    mut clock: ResMut<SimulationClock>,
    mut log: ResMut<EventLog>,
    graph: Res<ConnectionGraph>,
    mut members: Query<(&MemberId, &Capabilities, &mut Transformation)>,
) {
    let now = clock.now();

    for trigger in queue.drain() {
        let Ok((id, capabilities, mut transformation)) = members.get_mut(trigger.member) else {
            continue;
        };
        if !transformation.begin(now) {
            continue;
        }

        let handle = clock.schedule_after(
            config.transformation.duration_ticks,
            ScheduledEffect::Stabilize {
                member: trigger.member,
            },
        );
        transformation.pending = Some(handle);

        let record = create_record(&id.0, trigger.probe_id, capabilities, now, &mut rng.0);
        let message = match &record.probe_id {
            Some(probe_id) => format!(
                "Node {} transformed in response to probe {}, generated {} art",
                id.0, probe_id, record.art_type
            ),
            None => format!(
                "Node {} transformed spontaneously, generated {} art",
                id.0, record.art_type
            ),
        };
        log.record(now, message);
        log.push_transformation(record);

        if config.transformation.propagate_to_peers {
            for peer in graph.neighbors_of(&id.0) {
                log.record(now, format!("Node {} learning from {}'s transformation", peer, id.0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use murmuration_events::{ArtType, MemberKind};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn test_world(duration: u64) -> World {
        let mut config = SimulationConfig::default();
        config.transformation.duration_ticks = duration;

        let mut world = World::new();
        world.insert_resource(EventLog::new(config.log.capacity));
        world.insert_resource(config);
        world.insert_resource(SimulationClock::new());
        world.insert_resource(TransformationQueue::new());
        world.insert_resource(ActiveProbes::new());
        world.insert_resource(ConnectionGraph::new(2, 4));
        world.insert_resource(SimRng(SmallRng::seed_from_u64(42)));
        world
    }

    fn spawn_member(world: &mut World, id: &str, position: Vec2) -> Entity {
        let mut rng = SmallRng::seed_from_u64(1);
        world
            .spawn((
                MemberId(id.to_string()),
                Position(position),
                Capabilities::generate(MemberKind::Standard, &mut rng),
                Transformation::default(),
            ))
            .id()
    }

    fn tick_schedule() -> Schedule {
        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                advance_transformations,
                detect_probe_contact,
                process_transformations,
            )
                .chain(),
        );
        schedule
    }

    #[test]
    fn test_signature_shape() {
        let mut rng = SmallRng::seed_from_u64(3);
        let sig = generate_signature(&mut rng);
        assert!(sig.as_str().starts_with("0x"));
        assert_eq!(sig.as_str().len(), 18);
        assert!(sig.as_str()[2..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_record_uses_member_generators() {
        let mut rng = SmallRng::seed_from_u64(11);
        let caps = Capabilities {
            kind: MemberKind::Standard,
            region: murmuration_events::Region::Urban,
            storage: 1.0,
            bandwidth: 10.0,
            compute: 1.0,
            art_generators: vec![ArtType::Glyph],
        };
        for tick in 0..10 {
            let record = create_record("owl", None, &caps, tick, &mut rng);
            assert_eq!(record.art_type, ArtType::Glyph);
            assert_eq!(record.timestamp, tick);
            assert!(record.is_self_triggered());
        }
    }

    #[test]
    fn test_probe_contact_transforms_once() {
        let mut world = test_world(5);
        let near = spawn_member(&mut world, "sparrow", Vec2::new(100.0, 100.0));
        let far = spawn_member(&mut world, "owl", Vec2::new(900.0, 900.0));

        let config = world.resource::<SimulationConfig>().probes.clone();
        world
            .resource_mut::<ActiveProbes>()
            .spawn(Vec2::new(110.0, 100.0), &config);

        let mut schedule = tick_schedule();
        schedule.run(&mut world);
        schedule.run(&mut world);

        let t = world.get::<Transformation>(near).unwrap();
        assert!(t.is_transforming());
        assert_eq!(t.count, 1);
        assert_eq!(t.last_transform, Some(1));
        assert!(!world.get::<Transformation>(far).unwrap().is_transforming());

        let log = world.resource::<EventLog>();
        assert_eq!(log.total_transformations(), 1);
        let record = &log.transformations(1)[0];
        assert_eq!(record.node_id, "sparrow");
        assert_eq!(record.probe_id.as_deref(), Some("probe_000001"));
    }

    #[test]
    fn test_stabilizes_after_duration() {
        let mut world = test_world(5);
        let member = spawn_member(&mut world, "falcon", Vec2::new(100.0, 100.0));
        world.resource_mut::<TransformationQueue>().push(member, None);

        let mut schedule = tick_schedule();
        // Tick 1 processes the trigger
        schedule.run(&mut world);
        assert!(world.get::<Transformation>(member).unwrap().is_transforming());

        for expected_elapsed in 1..5 {
            schedule.run(&mut world);
            let t = world.get::<Transformation>(member).unwrap();
            assert!(t.is_transforming());
            assert_eq!(t.elapsed, expected_elapsed);
        }

        // Fifth tick after entering: back to stable
        schedule.run(&mut world);
        let t = world.get::<Transformation>(member).unwrap();
        assert!(!t.is_transforming());
        assert_eq!(t.elapsed, 0);
        assert!(t.pending.is_none());

        let messages: Vec<String> = world
            .resource::<EventLog>()
            .recent_entries(10)
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert!(messages.contains(&"Node falcon stabilized after transformation".to_string()));
    }

    #[test]
    fn test_duplicate_triggers_in_one_batch() {
        let mut world = test_world(5);
        let member = spawn_member(&mut world, "owl", Vec2::new(100.0, 100.0));
        {
            let mut queue = world.resource_mut::<TransformationQueue>();
            queue.push(member, Some("probe_a".to_string()));
            queue.push(member, Some("probe_b".to_string()));
        }

        tick_schedule().run(&mut world);

        assert_eq!(world.get::<Transformation>(member).unwrap().count, 1);
        assert_eq!(world.resource::<EventLog>().total_transformations(), 1);
        assert_eq!(world.resource::<SimulationClock>().pending(), 1);
    }

    #[test]
    fn test_propagation_logs_each_peer() {
        let mut world = test_world(5);
        let member = spawn_member(&mut world, "raven", Vec2::new(100.0, 100.0));
        {
            let mut rng = SmallRng::seed_from_u64(0);
            let mut graph = world.resource_mut::<ConnectionGraph>();
            graph.join("owl", &mut rng);
            graph.join("raven", &mut rng);
        }
        world.resource_mut::<TransformationQueue>().push(member, None);

        tick_schedule().run(&mut world);

        let messages: Vec<String> = world
            .resource::<EventLog>()
            .recent_entries(10)
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert!(messages.contains(&"Node owl learning from raven's transformation".to_string()));
    }

    #[test]
    fn test_stabilization_for_despawned_member_is_defused() {
        let mut world = test_world(2);
        let member = spawn_member(&mut world, "owl", Vec2::new(100.0, 100.0));
        world.resource_mut::<TransformationQueue>().push(member, None);

        let mut schedule = tick_schedule();
        schedule.run(&mut world);
        world.despawn(member);

        schedule.run(&mut world);
        schedule.run(&mut world);
        assert_eq!(world.resource::<SimulationClock>().pending(), 0);
    }
}
