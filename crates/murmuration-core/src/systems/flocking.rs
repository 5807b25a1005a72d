//! Flocking System
//!
//! Separation, alignment and cohesion over spatial neighbours, plus probe
//! avoidance. Forces for the whole flock are computed from a snapshot taken
//! before anyone moves, then committed in a separate pass.

use bevy_ecs::prelude::*;

use crate::components::member::{Kinematics, Position, Steering, Velocity};
use crate::components::probe::{ActiveProbes, Probe};
use crate::config::{FlockingConfig, ProbeConfig, SimulationConfig, WorldConfig};
use crate::math::Vec2;

/// Start-of-tick state of one member
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boid {
    pub entity: Entity,
    pub position: Vec2,
    pub velocity: Vec2,
    pub max_speed: f32,
    pub max_force: f32,
}

impl Boid {
    /// Classic steering: desired velocity at full speed, minus current velocity, clamped
    fn steer_towards(&self, direction: Vec2) -> Vec2 {
        (direction.with_magnitude(self.max_speed) - self.velocity).limit(self.max_force)
    }

    fn seek(&self, target: Vec2) -> Vec2 {
        self.steer_towards(target - self.position)
    }
}

/// Other boids strictly inside `radius`, skipping self and exact overlaps
fn neighbours<'a>(
    boid: &'a Boid,
    flock: &'a [Boid],
    radius: f32,
) -> impl Iterator<Item = (&'a Boid, f32)> + 'a {
    flock.iter().filter_map(move |other| {
        if other.entity == boid.entity {
            return None;
        }
        let d = boid.position.distance(other.position);
        (d > 0.0 && d < radius).then_some((other, d))
    })
}

pub fn separation(boid: &Boid, flock: &[Boid], desired_separation: f32) -> Vec2 {
    let mut steer = Vec2::ZERO;
    let mut count = 0;
    for (other, d) in neighbours(boid, flock, desired_separation) {
        steer += (boid.position - other.position).normalize() / d;
        count += 1;
    }

    if count == 0 {
        return Vec2::ZERO;
    }
    boid.steer_towards(steer / count as f32)
}

pub fn alignment(boid: &Boid, flock: &[Boid], neighbor_distance: f32) -> Vec2 {
    let mut sum = Vec2::ZERO;
    let mut count = 0;
    for (other, _) in neighbours(boid, flock, neighbor_distance) {
        sum += other.velocity;
        count += 1;
    }

    if count == 0 {
        return Vec2::ZERO;
    }
    boid.steer_towards(sum / count as f32)
}

pub fn cohesion(boid: &Boid, flock: &[Boid], neighbor_distance: f32) -> Vec2 {
    let mut sum = Vec2::ZERO;
    let mut count = 0;
    for (other, _) in neighbours(boid, flock, neighbor_distance) {
        sum += other.position;
        count += 1;
    }

    if count == 0 {
        return Vec2::ZERO;
    }
    boid.seek(sum / count as f32)
}

/// Repulsion from every probe inside the avoidance radius. Not clamped.
pub fn probe_avoidance<'a>(
    boid: &Boid,
    probes: impl IntoIterator<Item = &'a Probe>,
    radius: f32,
    weight: f32,
) -> Vec2 {
    probes
        .into_iter()
        .filter(|probe| boid.position.distance(probe.position) < radius)
        .fold(Vec2::ZERO, |acc, probe| {
            acc + (boid.position - probe.position).normalize() * weight
        })
}

/// Weighted sum of all steering behaviours for one boid
pub fn compute_force<'a>(
    boid: &Boid,
    flock: &[Boid],
    probes: impl IntoIterator<Item = &'a Probe>,
    flocking: &FlockingConfig,
    probe_config: &ProbeConfig,
) -> Vec2 {
    separation(boid, flock, flocking.desired_separation) * flocking.separation_weight
        + alignment(boid, flock, flocking.neighbor_distance) * flocking.alignment_weight
        + cohesion(boid, flock, flocking.neighbor_distance) * flocking.cohesion_weight
        + probe_avoidance(
            boid,
            probes,
            probe_config.avoidance_radius,
            probe_config.avoidance_weight,
        )
}

/// Applies a force, clamps speed, moves, and bounces off the world edges.
///
/// Returns the new `(position, velocity)`.
pub fn integrate(
    position: Vec2,
    velocity: Vec2,
    force: Vec2,
    max_speed: f32,
    bounds: &WorldConfig,
) -> (Vec2, Vec2) {
    let mut velocity = (velocity + force).limit(max_speed);
    let position = position + velocity;

    if position.x < 0.0 || position.x > bounds.width {
        velocity.x = -velocity.x;
    }
    if position.y < 0.0 || position.y > bounds.height {
        velocity.y = -velocity.y;
    }

    (position, velocity)
}

/// Reads every member's motion state into a snapshot
pub fn snapshot_flock(
    query: &Query<(Entity, &Position, &Velocity, &Kinematics)>,
) -> Vec<Boid> {
    query
        .iter()
        .map(|(entity, position, velocity, kinematics)| Boid {
            entity,
            position: position.0,
            velocity: velocity.0,
            max_speed: kinematics.max_speed,
            max_force: kinematics.max_force,
        })
        .collect()
}

/// System: compute each member's steering force from the start-of-tick snapshot
pub fn compute_steering(
    config: Res<SimulationConfig>,
    probes: Res<ActiveProbes>,
    flock: Query<(Entity, &Position, &Velocity, &Kinematics)>,
    mut steering: Query<&mut Steering>,
) {
    let snapshot = snapshot_flock(&flock);

    for boid in &snapshot {
        let force = compute_force(boid, &snapshot, probes.iter(), &config.flocking, &config.probes);
        if let Ok(mut steer) = steering.get_mut(boid.entity) {
            steer.0 = force;
        }
    }
}

/// System: commit steering forces to velocity and position
pub fn integrate_motion(
    config: Res<SimulationConfig>,
    mut query: Query<(&Steering, &Kinematics, &mut Position, &mut Velocity)>,
) {
    for (steering, kinematics, mut position, mut velocity) in query.iter_mut() {
        let (new_position, new_velocity) = integrate(
            position.0,
            velocity.0,
            steering.0,
            kinematics.max_speed,
            &config.world,
        );
        position.0 = new_position;
        velocity.0 = new_velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn boid(raw: u32, x: f32, y: f32, vx: f32, vy: f32) -> Boid {
        Boid {
            entity: Entity::from_raw(raw),
            position: Vec2::new(x, y),
            velocity: Vec2::new(vx, vy),
            max_speed: 3.0,
            max_force: 0.1,
        }
    }

    #[test]
    fn test_lonely_boid_feels_nothing() {
        let me = boid(0, 100.0, 100.0, 1.0, 0.0);
        let flock = vec![me, boid(1, 800.0, 800.0, 0.0, 1.0)];
        let config = FlockingConfig::default();
        let force = compute_force(&me, &flock, std::iter::empty(), &config, &ProbeConfig::default());
        assert_eq!(force, Vec2::ZERO);
    }

    #[test]
    fn test_separation_pushes_away() {
        let me = boid(0, 100.0, 100.0, 0.0, 0.0);
        let flock = vec![me, boid(1, 110.0, 100.0, 0.0, 0.0)];
        let force = separation(&me, &flock, 40.0);
        assert!(force.x < 0.0);
        assert!(force.y.abs() < EPS);
        assert!(force.length() <= 0.1 + EPS);
    }

    #[test]
    fn test_separation_ignores_overlapping_boid() {
        let me = boid(0, 100.0, 100.0, 0.0, 0.0);
        let flock = vec![me, boid(1, 100.0, 100.0, 0.0, 0.0)];
        assert_eq!(separation(&me, &flock, 40.0), Vec2::ZERO);
    }

    #[test]
    fn test_alignment_matches_heading() {
        let me = boid(0, 100.0, 100.0, 0.0, 0.0);
        let flock = vec![me, boid(1, 150.0, 100.0, 0.0, 2.0)];
        let force = alignment(&me, &flock, 100.0);
        assert!(force.y > 0.0);
        assert!((force.length() - 0.1).abs() < EPS);
    }

    #[test]
    fn test_cohesion_moves_towards_centroid() {
        let me = boid(0, 100.0, 100.0, 0.0, 0.0);
        let flock = vec![
            me,
            boid(1, 160.0, 120.0, 0.0, 0.0),
            boid(2, 160.0, 80.0, 0.0, 0.0),
        ];
        let force = cohesion(&me, &flock, 100.0);
        assert!(force.x > 0.0);
        assert!(force.y.abs() < EPS);
    }

    #[test]
    fn test_probe_avoidance() {
        let me = boid(0, 100.0, 100.0, 0.0, 0.0);
        let config = ProbeConfig::default();
        let near = Probe::new("near", Vec2::new(100.0, 130.0), &config);
        let far = Probe::new("far", Vec2::new(500.0, 500.0), &config);

        let force = probe_avoidance(&me, [&near, &far], 100.0, 0.5);
        assert!(force.x.abs() < EPS);
        assert!((force.y + 0.5).abs() < EPS);
    }

    #[test]
    fn test_integrate_clamps_speed() {
        let bounds = WorldConfig::default();
        let (_, velocity) = integrate(
            Vec2::new(500.0, 500.0),
            Vec2::new(2.9, 0.0),
            Vec2::new(5.0, 5.0),
            3.0,
            &bounds,
        );
        assert!(velocity.length() <= 3.0 + EPS);
    }

    #[test]
    fn test_integrate_bounces_off_edges() {
        let bounds = WorldConfig::default();
        let (position, velocity) = integrate(
            Vec2::new(1.0, 999.5),
            Vec2::new(-2.0, 1.0),
            Vec2::ZERO,
            3.0,
            &bounds,
        );
        assert!(position.x < 0.0 && position.y > 1000.0);
        assert_eq!(velocity, Vec2::new(2.0, -1.0));
    }

    #[test]
    fn test_compute_steering_uses_start_of_tick_snapshot() {
        let mut world = World::new();
        world.insert_resource(SimulationConfig::default());
        world.insert_resource(ActiveProbes::new());

        let kin = Kinematics {
            max_speed: 3.0,
            max_force: 0.1,
        };
        let a = world
            .spawn((Position(Vec2::new(100.0, 100.0)), Velocity(Vec2::ZERO), kin, Steering::default()))
            .id();
        let b = world
            .spawn((Position(Vec2::new(120.0, 100.0)), Velocity(Vec2::ZERO), kin, Steering::default()))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(compute_steering);
        schedule.run(&mut world);

        // Symmetric pair gets mirror-image forces
        let fa = world.get::<Steering>(a).unwrap().0;
        let fb = world.get::<Steering>(b).unwrap().0;
        assert!((fa.x + fb.x).abs() < EPS);
        assert!(fa.x < 0.0);
    }
}
