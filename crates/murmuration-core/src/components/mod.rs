//! ECS Components
//!
//! Components for flock members and the probe registry.

pub mod member;
pub mod probe;

pub use member::*;
pub use probe::*;
