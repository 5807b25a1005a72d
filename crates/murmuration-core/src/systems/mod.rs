//! ECS Systems
//!
//! Per-tick systems for flocking, transformations and probe decay.

pub mod flocking;
pub mod probes;
pub mod transformation;

pub use flocking::{compute_force, compute_steering, integrate, integrate_motion, Boid};
pub use probes::decay_probes;
pub use transformation::{
    advance_transformations, create_record, detect_probe_contact, generate_signature,
    process_transformations, TransformationQueue, TransformationTrigger,
};
