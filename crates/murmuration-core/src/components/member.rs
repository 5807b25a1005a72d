//! Member Components
//!
//! Components for individual flock members: identity, motion, capabilities
//! and transformation state.

use bevy_ecs::prelude::*;
use murmuration_events::{ArtType, MemberKind, MemberState, Region, Tick};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clock::CancelHandle;
use crate::math::Vec2;

/// Marker component identifying an entity as a flock member
#[derive(Component, Debug, Clone, Default)]
pub struct Member;

/// Unique identifier for a member
#[derive(Component, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(pub String);

#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Position(pub Vec2);

#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity(pub Vec2);

/// Per-member motion limits
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub max_speed: f32,
    pub max_force: f32,
}

/// Steering force computed for the current tick, applied during integration
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Steering(pub Vec2);

/// What a member brings to the murmuration
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    pub kind: MemberKind,
    pub region: Region,
    pub storage: f32,
    pub bandwidth: f32,
    pub compute: f32,
    /// Art types this member can produce when it transforms. Never empty.
    pub art_generators: Vec<ArtType>,
}

impl Capabilities {
    /// Rolls capabilities for a new member.
    ///
    /// Gateways get double storage, 1.5x bandwidth and the holographic generator.
    pub fn generate(kind: MemberKind, rng: &mut impl Rng) -> Self {
        let region = Region::ALL[rng.gen_range(0..Region::ALL.len())];
        let mut caps = Self {
            kind,
            region,
            storage: rng.gen_range(0.0..100.0),
            bandwidth: rng.gen_range(10.0..100.0),
            compute: rng.gen_range(1.0..10.0),
            art_generators: ArtType::BASE_GENERATORS.to_vec(),
        };

        if kind == MemberKind::Gateway {
            caps.storage *= 2.0;
            caps.bandwidth *= 1.5;
            caps.art_generators.push(ArtType::Holographic);
        }

        caps
    }
}

/// Transformation state machine for one member
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Transformation {
    pub state: MemberState,
    /// Ticks spent in the current transformation; 0 while stable
    pub elapsed: u64,
    /// Total transformations this member has gone through
    pub count: u32,
    pub last_transform: Option<Tick>,
    /// Scheduled stabilization, cancelled if the member leaves
    pub pending: Option<CancelHandle>,
}

impl Transformation {
    pub fn is_transforming(&self) -> bool {
        self.state.is_transforming()
    }

    /// Enters the transforming state. Returns false if already transforming.
    pub fn begin(&mut self, now: Tick) -> bool {
        if self.is_transforming() {
            return false;
        }
        self.state = MemberState::Transforming;
        self.elapsed = 0;
        self.count += 1;
        self.last_transform = Some(now);
        true
    }

    /// Counts one tick of an ongoing transformation, saturating at `duration`.
    pub fn advance(&mut self, duration: u64) {
        if self.is_transforming() {
            self.elapsed = (self.elapsed + 1).min(duration);
        }
    }

    /// Returns to stable. Returns false if the member was not transforming.
    pub fn stabilize(&mut self) -> bool {
        if !self.is_transforming() {
            return false;
        }
        self.state = MemberState::Stable;
        self.elapsed = 0;
        self.pending = None;
        true
    }
}

/// Everything spawned for a new member
#[derive(Bundle)]
pub struct MemberBundle {
    pub marker: Member,
    pub id: MemberId,
    pub position: Position,
    pub velocity: Velocity,
    pub kinematics: Kinematics,
    pub steering: Steering,
    pub capabilities: Capabilities,
    pub transformation: Transformation,
}

/// Read-only snapshot of a member for adapters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberView {
    pub id: String,
    pub kind: MemberKind,
    pub region: Region,
    pub position: Vec2,
    pub velocity: Vec2,
    pub state: MemberState,
    pub transform_elapsed: u64,
    pub transformation_count: u32,
    pub last_transform: Option<Tick>,
    pub connections: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_gateway_capabilities() {
        let mut rng = SmallRng::seed_from_u64(42);
        let caps = Capabilities::generate(MemberKind::Gateway, &mut rng);
        assert_eq!(caps.art_generators.len(), 5);
        assert!(caps.art_generators.contains(&ArtType::Holographic));
        assert!(caps.storage < 200.0);
        assert!(caps.bandwidth >= 15.0 && caps.bandwidth < 150.0);
    }

    #[test]
    fn test_standard_capabilities() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..20 {
            let caps = Capabilities::generate(MemberKind::Standard, &mut rng);
            assert_eq!(caps.art_generators, ArtType::BASE_GENERATORS.to_vec());
            assert!(caps.storage >= 0.0 && caps.storage < 100.0);
            assert!(caps.bandwidth >= 10.0 && caps.bandwidth < 100.0);
            assert!(caps.compute >= 1.0 && caps.compute < 10.0);
        }
    }

    #[test]
    fn test_transformation_cycle() {
        let mut t = Transformation::default();
        assert!(!t.is_transforming());

        assert!(t.begin(5));
        assert!(t.is_transforming());
        assert_eq!(t.count, 1);
        assert_eq!(t.last_transform, Some(5));

        // Re-entrancy guard
        assert!(!t.begin(6));
        assert_eq!(t.count, 1);

        for _ in 0..10 {
            t.advance(3);
        }
        assert_eq!(t.elapsed, 3);

        assert!(t.stabilize());
        assert_eq!(t.elapsed, 0);
        assert!(!t.stabilize());
    }

    #[test]
    fn test_advance_ignored_while_stable() {
        let mut t = Transformation::default();
        t.advance(60);
        assert_eq!(t.elapsed, 0);
    }
}
