// SPDX-License-Identifier: MIT OR Apache-2.0

//! CBOR serialization helpers for board state
//!
//! The infallible helpers log failures and return empty bytes or `None`;
//! the `try_` variants surface a [`CodecError`] for callers that need it.

use crate::board::BoardState;
use crate::scenario::{Scenario, WorkspaceSnapshot, SNAPSHOT_VERSION};
use crate::CodecError;

/// Serialize a board state to CBOR
pub fn serialize_board_state(board: &BoardState) -> Vec<u8> {
    match serde_cbor::to_vec(board) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!("Failed to serialize board state: {}", err);
            Vec::new()
        }
    }
}

/// Deserialize a board state from CBOR, repairing the opponent line-up
pub fn deserialize_board_state(data: &[u8]) -> Option<BoardState> {
    if data.is_empty() {
        return None;
    }

    match serde_cbor::from_slice::<BoardState>(data) {
        Ok(mut board) => {
            board.ensure_opponent_markers();
            board.normalize_membership();
            Some(board)
        }
        Err(err) => {
            tracing::error!("Failed to deserialize board state: {}", err);
            None
        }
    }
}

/// Serialize scenario metadata to CBOR
pub fn serialize_scenario(scenario: &Scenario) -> Vec<u8> {
    match serde_cbor::to_vec(scenario) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!("Failed to serialize scenario: {}", err);
            Vec::new()
        }
    }
}

/// Deserialize scenario metadata from CBOR
pub fn deserialize_scenario(data: &[u8]) -> Option<Scenario> {
    if data.is_empty() {
        return None;
    }

    match serde_cbor::from_slice(data) {
        Ok(scenario) => Some(scenario),
        Err(err) => {
            tracing::error!("Failed to deserialize scenario: {}", err);
            None
        }
    }
}

pub fn try_serialize_snapshot(snapshot: &WorkspaceSnapshot) -> Result<Vec<u8>, CodecError> {
    Ok(serde_cbor::to_vec(snapshot)?)
}

/// Decode a snapshot, rejecting versions newer than this build understands
pub fn try_deserialize_snapshot(data: &[u8]) -> Result<WorkspaceSnapshot, CodecError> {
    if data.is_empty() {
        return Err(CodecError::Empty);
    }
    let snapshot: WorkspaceSnapshot = serde_cbor::from_slice(data)?;
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(CodecError::UnsupportedVersion(snapshot.version));
    }
    Ok(snapshot)
}
