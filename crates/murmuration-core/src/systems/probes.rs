//! Probe System
//!
//! Ages probes at the end of each tick and purges the expired ones.

use bevy_ecs::prelude::*;

use crate::clock::SimulationClock;
use crate::components::probe::ActiveProbes;

/// System: decay every active probe, dropping those whose life ran out
pub fn decay_probes(clock: Res<SimulationClock>, mut probes: ResMut<ActiveProbes>) {
    for id in probes.decay() {
        tracing::debug!(tick = clock.now(), probe = %id, "probe dissipated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbeConfig;
    use crate::math::Vec2;

    #[test]
    fn test_decay_system_purges_expired_probes() {
        let mut world = World::new();
        world.insert_resource(SimulationClock::new());
        let mut probes = ActiveProbes::new();
        let config = ProbeConfig {
            initial_life: 4.0,
            ..ProbeConfig::default()
        };
        probes.spawn(Vec2::new(1.0, 1.0), &config);
        world.insert_resource(probes);

        let mut schedule = Schedule::default();
        schedule.add_systems(decay_probes);

        schedule.run(&mut world);
        assert_eq!(world.resource::<ActiveProbes>().len(), 1);
        schedule.run(&mut world);
        assert!(world.resource::<ActiveProbes>().is_empty());
    }
}
