//! Member classification enums.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transformation state of a flock member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemberState {
    #[default]
    Stable,
    Transforming,
}

impl MemberState {
    pub fn is_transforming(self) -> bool {
        matches!(self, MemberState::Transforming)
    }
}

impl fmt::Display for MemberState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberState::Stable => write!(f, "stable"),
            MemberState::Transforming => write!(f, "transforming"),
        }
    }
}

/// Kind of member joining the murmuration.
///
/// Gateways carry more storage and bandwidth and can generate holographic art.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    #[default]
    Standard,
    Gateway,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Standard => write!(f, "standard"),
            MemberKind::Gateway => write!(f, "gateway"),
        }
    }
}

/// Error returned when a member kind string is not recognised.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseKindError(pub String);

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown member kind: '{}', expected 'standard' or 'gateway'", self.0)
    }
}

impl std::error::Error for ParseKindError {}

impl FromStr for MemberKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(MemberKind::Standard),
            "gateway" => Ok(MemberKind::Gateway),
            _ => Err(ParseKindError(s.to_string())),
        }
    }
}

/// Landscape a member is deployed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Forest,
    Urban,
    Rural,
    Coastal,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Forest, Region::Urban, Region::Rural, Region::Coastal];
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Forest => write!(f, "forest"),
            Region::Urban => write!(f, "urban"),
            Region::Rural => write!(f, "rural"),
            Region::Coastal => write!(f, "coastal"),
        }
    }
}
