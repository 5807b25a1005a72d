//! Shared record types for the murmuration engine.
//!
//! This crate contains pure data structures with no simulation logic:
//! transformation records, log entries, health reports and messages. The
//! engine produces them; adapters (renderers, status panels, transports)
//! only read them.

pub mod health;
pub mod log;
pub mod message;
pub mod record;
pub mod state;

/// Discrete simulation time, counted in ticks since the simulation started.
pub type Tick = u64;

pub use health::HealthRecord;
pub use log::LogEntry;
pub use message::Message;
pub use record::{ArtType, Signature, SymbolicState, TransformationArt, TransformationRecord};
pub use state::{MemberKind, MemberState, ParseKindError, Region};
