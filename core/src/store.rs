// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence boundary
//!
//! The engine never performs I/O itself. After each mutation it hands the
//! updated board state and scenario to a [`BoardStore`] supplied by the host.

use crate::board::BoardState;
use crate::scenario::Scenario;
use crate::{ScenarioId, StoreError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Host-provided sink for engine state
pub trait BoardStore: Send {
    /// Persist the board state of one scenario
    fn save_board(&mut self, board: &BoardState) -> Result<(), StoreError>;

    /// Persist scenario metadata
    fn save_scenario(&mut self, scenario: &Scenario) -> Result<(), StoreError>;

    /// Forget a deleted scenario and its board
    fn remove_scenario(&mut self, id: &ScenarioId) -> Result<(), StoreError>;

    /// Externally persisted "last active" scenario, if any
    fn last_active_scenario(&self) -> Option<ScenarioId>;

    /// Remember the scenario the user switched to
    fn remember_active(&mut self, id: &ScenarioId) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    boards: HashMap<ScenarioId, BoardState>,
    scenarios: HashMap<ScenarioId, Scenario>,
    last_active: Option<ScenarioId>,
    writes: usize,
    fail_writes: bool,
}

/// In-memory store; clones share the same contents
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a persisted "last active" id
    pub fn with_last_active(id: ScenarioId) -> Self {
        let store = Self::new();
        store.inner.lock().last_active = Some(id);
        store
    }

    pub fn board(&self, id: &ScenarioId) -> Option<BoardState> {
        self.inner.lock().boards.get(id).cloned()
    }

    pub fn scenario(&self, id: &ScenarioId) -> Option<Scenario> {
        self.inner.lock().scenarios.get(id).cloned()
    }

    pub fn scenario_count(&self) -> usize {
        self.inner.lock().scenarios.len()
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> usize {
        self.inner.lock().writes
    }

    /// Make every following write fail (for exercising error paths)
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }

    fn check(inner: &MemoryStoreInner, what: &str) -> Result<(), StoreError> {
        if inner.fail_writes {
            return Err(StoreError::Write {
                what: what.to_string(),
                reason: "writes disabled".to_string(),
            });
        }
        Ok(())
    }
}

impl BoardStore for MemoryStore {
    fn save_board(&mut self, board: &BoardState) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        Self::check(&inner, "board state")?;
        inner.boards.insert(board.scenario_id, board.clone());
        inner.writes += 1;
        Ok(())
    }

    fn save_scenario(&mut self, scenario: &Scenario) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        Self::check(&inner, "scenario")?;
        inner.scenarios.insert(scenario.id, scenario.clone());
        inner.writes += 1;
        Ok(())
    }

    fn remove_scenario(&mut self, id: &ScenarioId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        Self::check(&inner, "scenario removal")?;
        inner.boards.remove(id);
        inner.scenarios.remove(id);
        if inner.last_active == Some(*id) {
            inner.last_active = None;
        }
        inner.writes += 1;
        Ok(())
    }

    fn last_active_scenario(&self) -> Option<ScenarioId> {
        self.inner.lock().last_active
    }

    fn remember_active(&mut self, id: &ScenarioId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        Self::check(&inner, "active scenario")?;
        inner.last_active = Some(*id);
        Ok(())
    }
}
