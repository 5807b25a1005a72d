//! Transformation records.
//!
//! A record is produced every time a member enters the transforming state.
//! Records are immutable and accumulate in an append-only log.
//!
//! # Example
//!
//! ```
//! use murmuration_events::{ArtType, Signature, SymbolicState, TransformationRecord};
//!
//! let record = TransformationRecord {
//!     node_id: "sparrow".to_string(),
//!     probe_id: Some("probe_000001".to_string()),
//!     timestamp: 42,
//!     art_type: ArtType::Fractal,
//!     new_state: SymbolicState::Crystalline,
//!     signature: Signature::from_nibbles([0xa; 16]),
//! };
//! assert_eq!(record.signature.as_str(), "0xaaaaaaaaaaaaaaaa");
//! assert!(!record.is_self_triggered());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Tick;

/// Category of artifact a member generates while transforming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtType {
    Particle,
    Wave,
    Fractal,
    Glyph,
    Holographic,
}

impl ArtType {
    /// Generators every member starts with.
    pub const BASE_GENERATORS: [ArtType; 4] = [
        ArtType::Particle,
        ArtType::Wave,
        ArtType::Fractal,
        ArtType::Glyph,
    ];
}

impl fmt::Display for ArtType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtType::Particle => write!(f, "particle"),
            ArtType::Wave => write!(f, "wave"),
            ArtType::Fractal => write!(f, "fractal"),
            ArtType::Glyph => write!(f, "glyph"),
            ArtType::Holographic => write!(f, "holographic"),
        }
    }
}

/// Symbolic state a member reports after transforming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolicState {
    Nebulous,
    Crystalline,
    Fluid,
    Modulated,
    Resonant,
    Holographic,
}

impl SymbolicState {
    pub const ALL: [SymbolicState; 6] = [
        SymbolicState::Nebulous,
        SymbolicState::Crystalline,
        SymbolicState::Fluid,
        SymbolicState::Modulated,
        SymbolicState::Resonant,
        SymbolicState::Holographic,
    ];
}

impl fmt::Display for SymbolicState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolicState::Nebulous => write!(f, "nebulous"),
            SymbolicState::Crystalline => write!(f, "crystalline"),
            SymbolicState::Fluid => write!(f, "fluid"),
            SymbolicState::Modulated => write!(f, "modulated"),
            SymbolicState::Resonant => write!(f, "resonant"),
            SymbolicState::Holographic => write!(f, "holographic"),
        }
    }
}

/// Opaque token stamped on each transformation: `0x` followed by 16 hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    /// Builds a signature from 16 nibbles. Only the low four bits of each are used.
    pub fn from_nibbles(nibbles: [u8; 16]) -> Self {
        let mut token = String::with_capacity(18);
        token.push_str("0x");
        for nibble in nibbles {
            token.push_str(&format!("{:x}", nibble & 0x0f));
        }
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable record of one transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationRecord {
    pub node_id: String,
    /// Probe or probe message that caused the transformation; `None` when self-triggered
    pub probe_id: Option<String>,
    pub timestamp: Tick,
    pub art_type: ArtType,
    pub new_state: SymbolicState,
    pub signature: Signature,
}

impl TransformationRecord {
    pub fn is_self_triggered(&self) -> bool {
        self.probe_id.is_none()
    }
}

/// Compact view of a transformation for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationArt {
    pub node: String,
    pub art: ArtType,
    pub state: SymbolicState,
    pub tick: Tick,
}

impl From<&TransformationRecord> for TransformationArt {
    fn from(record: &TransformationRecord) -> Self {
        Self {
            node: record.node_id.clone(),
            art: record.art_type,
            state: record.new_state,
            tick: record.timestamp,
        }
    }
}
