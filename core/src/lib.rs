// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tacboard Core - Tactical Formation Board Engine
//!
//! This crate provides the editable state of a football formation board:
//! - Normalized pitch geometry
//! - Scenarios and their board states (placements, markers, drawings)
//! - Placement collision avoidance and roster membership
//! - Draft drawings and the temporary-annotation lifecycle
//! - Selection and command dispatch for a view layer
//! - CBOR serialization helpers and snapshot archives

#![deny(unsafe_code)]
#![deny(clippy::all)]

pub mod geometry;
pub mod roster;
pub mod board;
pub mod rules;
pub mod placement;
pub mod drawing;
pub mod expiry;
pub mod scenario;
pub mod selection;
pub mod store;
pub mod cbor;
pub mod archiver;
pub mod config;
pub mod engine;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random id
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Identifies a scenario and, 1:1, its board state
    ScenarioId
);
uuid_id!(
    /// Identifies a player placement on the pitch
    PlacementId
);
uuid_id!(
    /// Identifies a finished drawing
    DrawingId
);
uuid_id!(
    /// Identifies an opponent or neutral marker
    MarkerId
);

/// Roster player identifier, owned by the external roster
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors reported by a board store implementation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing storage cannot be reached
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A single write was rejected
    #[error("Failed to write {what}: {reason}")]
    Write {
        /// What was being written (board state, scenario, ...)
        what: String,
        /// Backend-specific reason
        reason: String,
    },
}

/// Errors raised while encoding or decoding engine state
#[derive(Debug, Error)]
pub enum CodecError {
    /// CBOR encode/decode failure
    #[error("CBOR codec error: {0}")]
    Cbor(#[from] serde_cbor::Error),

    /// Roster file could not be parsed
    #[error("Invalid roster JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be parsed
    #[error("Invalid config: {0}")]
    TomlDecode(#[from] toml::de::Error),

    /// Configuration could not be rendered
    #[error("Failed to render config: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    /// Snapshot was written by an incompatible version
    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    /// Input was empty
    #[error("Empty input")]
    Empty,
}

pub use board::{BoardState, Membership, NeutralMarker, OpponentMarker, OpponentMode, Placement, Zone};
pub use config::EngineConfig;
pub use drawing::{Draft, DraftDrawing, Drawing, DrawingKind};
pub use engine::{SharedEngine, TacticsEngine};
pub use geometry::{NormalizedPoint, SurfaceSize};
pub use roster::{Player, Position, Roster, TacticalRole};
pub use scenario::{Scenario, ScenarioManager, WorkspaceSnapshot};
pub use selection::Selection;
pub use store::{BoardStore, MemoryStore};
