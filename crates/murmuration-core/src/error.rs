//! Engine error types.
//!
//! Only construction and injection can fail. Ticking never does, and lookups
//! of unknown ids are reported through `bool`/`Option` rather than errors.

use thiserror::Error;

use crate::config::ConfigError;
use crate::math::Vec2;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("member id must not be empty")]
    EmptyMemberId,
    #[error("member '{0}' is already part of the murmuration")]
    DuplicateMember(String),
    #[error("position ({x}, {y}) is outside the {width}x{height} world")]
    OutOfBounds { x: f32, y: f32, width: f32, height: f32 },
    #[error("position {0:?} is not finite")]
    NonFinitePosition(Vec2),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
