//! Determinism verification tests
//!
//! The same seed and the same sequence of operations must reproduce the run exactly.

use murmuration_core::{Simulation, SimulationConfig, Vec2};
use murmuration_events::MemberKind;

fn scripted_run(seed: u64) -> Simulation {
    let mut sim = Simulation::new(SimulationConfig::default(), seed).unwrap();
    for i in 0..12 {
        let kind = if i == 0 {
            MemberKind::Gateway
        } else {
            MemberKind::Standard
        };
        sim.add_member(&format!("node_{}", i), kind).unwrap();
    }

    for tick in 0..200u32 {
        if tick % 40 == 0 {
            sim.inject_targeted_probe(Vec2::new(200.0 + tick as f32, 300.0))
                .unwrap();
        }
        if tick == 120 {
            sim.remove_member("node_3");
            sim.send_message("external_probe", "node_5", "scan", true);
        }
        sim.tick();
    }
    sim
}

#[test]
fn test_same_seed_same_run() {
    let a = scripted_run(1234);
    let b = scripted_run(1234);

    assert_eq!(a.members(), b.members());
    assert_eq!(a.recent_transformations(usize::MAX), b.recent_transformations(usize::MAX));
    assert_eq!(a.recent_log(usize::MAX), b.recent_log(usize::MAX));
    assert_eq!(a.recent_messages(usize::MAX), b.recent_messages(usize::MAX));
    assert_eq!(a.health(), b.health());
}

#[test]
fn test_different_seeds_diverge() {
    let a = scripted_run(1);
    let b = scripted_run(2);

    let positions_a: Vec<Vec2> = a.members().into_iter().map(|m| m.position).collect();
    let positions_b: Vec<Vec2> = b.members().into_iter().map(|m| m.position).collect();
    assert_ne!(positions_a, positions_b, "Different seeds should produce different flocks");
}
