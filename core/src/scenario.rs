// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scenarios, their board states and active-scenario resolution

use crate::board::{BoardState, OpponentMode};
use crate::roster::Roster;
use crate::{DrawingId, ScenarioId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// A named tactical setup and its display preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub name: String,
    pub updated_at: DateTime<Utc>,
    pub show_opponent: bool,
    pub show_zones: bool,
    pub show_lines: bool,
    pub drawings_visible: bool,
}

impl Scenario {
    pub fn new(name: &str) -> Self {
        Self {
            id: ScenarioId::new(),
            name: name.to_string(),
            updated_at: Utc::now(),
            show_opponent: false,
            show_zones: false,
            show_lines: true,
            drawings_visible: true,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Display flags that can be toggled on a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioFlag {
    ShowOpponent,
    ShowZones,
    ShowLines,
    DrawingsVisible,
}

/// Serializable picture of every scenario and board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    pub version: u32,
    pub scenarios: Vec<Scenario>,
    pub boards: Vec<BoardState>,
    #[serde(default)]
    pub active: Option<ScenarioId>,
}

/// Owns scenarios and their 1:1 board states
#[derive(Debug, Clone, Default)]
pub struct ScenarioManager {
    scenarios: Vec<Scenario>,
    boards: HashMap<ScenarioId, BoardState>,
    active_id: Option<ScenarioId>,
}

impl ScenarioManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a snapshot, repairing boards on the way in
    pub fn from_snapshot(snapshot: WorkspaceSnapshot, roster: &Roster) -> Self {
        let mut boards: HashMap<ScenarioId, BoardState> = snapshot
            .boards
            .into_iter()
            .map(|board| (board.scenario_id, board))
            .collect();

        // Orphaned boards are dropped, missing boards recreated
        boards.retain(|id, _| snapshot.scenarios.iter().any(|s| &s.id == id));
        for scenario in &snapshot.scenarios {
            boards.entry(scenario.id).or_insert_with(|| {
                tracing::warn!(scenario = %scenario.id, "Scenario without board state, creating empty board");
                BoardState::new(scenario.id, roster)
            });
        }
        for board in boards.values_mut() {
            board.ensure_opponent_markers();
            board.normalize_membership();
        }

        Self {
            scenarios: snapshot.scenarios,
            boards,
            active_id: snapshot.active,
        }
    }

    pub fn to_snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            version: SNAPSHOT_VERSION,
            scenarios: self.scenarios.clone(),
            boards: self
                .scenarios
                .iter()
                .filter_map(|s| self.boards.get(&s.id).cloned())
                .collect(),
            active: self.active_id,
        }
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn scenario(&self, id: &ScenarioId) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| &s.id == id)
    }

    pub fn scenario_mut(&mut self, id: &ScenarioId) -> Option<&mut Scenario> {
        self.scenarios.iter_mut().find(|s| &s.id == id)
    }

    pub fn board(&self, id: &ScenarioId) -> Option<&BoardState> {
        self.boards.get(id)
    }

    pub fn board_mut(&mut self, id: &ScenarioId) -> Option<&mut BoardState> {
        self.boards.get_mut(id)
    }

    pub fn boards_mut(&mut self) -> impl Iterator<Item = &mut BoardState> {
        self.boards.values_mut()
    }

    /// Scenario `id`, or a default inserted in its place if it is gone
    pub fn scenario_or_insert(&mut self, id: &ScenarioId, name: &str, roster: &Roster) -> &Scenario {
        let index = match self.scenarios.iter().position(|s| &s.id == id) {
            Some(index) => index,
            None => {
                let inserted = self.insert(name, roster);
                tracing::warn!(missing = %id, scenario = %inserted, "Scenario vanished, inserted default");
                self.scenarios.len() - 1
            }
        };
        &self.scenarios[index]
    }

    /// Board of scenario `id`, created empty if it is missing
    pub fn board_or_insert(&mut self, id: &ScenarioId, roster: &Roster) -> &BoardState {
        self.boards.entry(*id).or_insert_with(|| {
            tracing::warn!(scenario = %id, "Scenario without board state, creating empty board");
            BoardState::new(*id, roster)
        })
    }

    /// Explicitly tracked active id, without resolution
    pub fn tracked_active(&self) -> Option<ScenarioId> {
        self.active_id
    }

    fn exists(&self, id: &ScenarioId) -> bool {
        self.scenarios.iter().any(|s| &s.id == id)
    }

    /// Create the default scenario if there is none.
    ///
    /// Returns the id of the created scenario.
    pub fn bootstrap_default(&mut self, name: &str, roster: &Roster) -> Option<ScenarioId> {
        if !self.scenarios.is_empty() {
            return None;
        }
        let id = self.insert(name, roster);
        tracing::info!(scenario = %id, name, "Bootstrapped default scenario");
        Some(id)
    }

    fn insert(&mut self, name: &str, roster: &Roster) -> ScenarioId {
        let scenario = Scenario::new(name);
        let id = scenario.id;
        self.boards.insert(id, BoardState::new(id, roster));
        self.scenarios.push(scenario);
        self.active_id = Some(id);
        id
    }

    /// Resolve the active scenario: tracked id, then the persisted last
    /// active id, then the first scenario, then a bootstrapped default.
    ///
    /// Returns the id and whether a scenario had to be bootstrapped.
    pub fn resolve_active(
        &mut self,
        last_active: Option<ScenarioId>,
        default_name: &str,
        roster: &Roster,
    ) -> (ScenarioId, bool) {
        let resolved = self
            .active_id
            .filter(|id| self.exists(id))
            .or_else(|| last_active.filter(|id| self.exists(id)))
            .or_else(|| self.scenarios.first().map(|s| s.id));

        match resolved {
            Some(id) => {
                self.active_id = Some(id);
                (id, false)
            }
            None => {
                let id = self.insert(default_name, roster);
                tracing::info!(scenario = %id, "No scenario available, bootstrapped default");
                (id, true)
            }
        }
    }

    pub fn select(&mut self, id: &ScenarioId) -> bool {
        if !self.exists(id) {
            return false;
        }
        self.active_id = Some(*id);
        true
    }

    /// New scenario with an empty board; becomes active
    pub fn create(&mut self, name: &str, roster: &Roster) -> ScenarioId {
        let id = self.insert(name, roster);
        tracing::info!(scenario = %id, name, "Created scenario");
        id
    }

    /// Deep-copy a scenario and its board; the copy becomes active
    pub fn duplicate(&mut self, id: &ScenarioId) -> Option<ScenarioId> {
        let source = self.scenario(id)?;
        let mut scenario = source.clone();
        scenario.id = ScenarioId::new();
        scenario.touch();

        let mut board = self.boards.get(id)?.clone();
        board.scenario_id = scenario.id;

        let new_id = scenario.id;
        self.boards.insert(new_id, board);
        self.scenarios.push(scenario);
        self.active_id = Some(new_id);
        tracing::info!(source = %id, scenario = %new_id, "Duplicated scenario");
        Some(new_id)
    }

    pub fn rename(&mut self, id: &ScenarioId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        match self.scenario_mut(id) {
            Some(scenario) => {
                scenario.name = name.to_string();
                scenario.touch();
                true
            }
            None => false,
        }
    }

    /// Remove a scenario and its board.
    ///
    /// If it was active, the scenario now at its index (or the one before)
    /// becomes active. Returns the removed board.
    pub fn delete(&mut self, id: &ScenarioId) -> Option<BoardState> {
        let index = self.scenarios.iter().position(|s| &s.id == id)?;
        self.scenarios.remove(index);
        let board = self.boards.remove(id);

        if self.active_id == Some(*id) {
            self.active_id = self
                .scenarios
                .get(index)
                .or_else(|| index.checked_sub(1).and_then(|i| self.scenarios.get(i)))
                .map(|s| s.id);
        }
        tracing::info!(scenario = %id, "Deleted scenario");
        board
    }

    /// Clear the layout of a scenario; metadata stays untouched.
    ///
    /// Returns the ids of removed drawings.
    pub fn reset_layout(&mut self, id: &ScenarioId, roster: &Roster) -> Option<Vec<DrawingId>> {
        let board = self.boards.get_mut(id)?;
        let removed = board.reset_layout(roster);
        tracing::info!(scenario = %id, drawings = removed.len(), "Reset scenario layout");
        Some(removed)
    }

    /// Flip a display flag, keeping the opponent mode consistent
    pub fn toggle_flag(&mut self, id: &ScenarioId, flag: ScenarioFlag) -> bool {
        let Some(scenario) = self.scenarios.iter_mut().find(|s| &s.id == id) else {
            return false;
        };
        match flag {
            ScenarioFlag::ShowOpponent => {
                scenario.show_opponent = !scenario.show_opponent;
                let showing = scenario.show_opponent;
                if let Some(board) = self.boards.get_mut(id) {
                    if !showing {
                        board.opponent_mode = OpponentMode::Hidden;
                    } else if board.opponent_mode == OpponentMode::Hidden {
                        board.opponent_mode = OpponentMode::Markers;
                    }
                }
            }
            ScenarioFlag::ShowZones => scenario.show_zones = !scenario.show_zones,
            ScenarioFlag::ShowLines => scenario.show_lines = !scenario.show_lines,
            ScenarioFlag::DrawingsVisible => scenario.drawings_visible = !scenario.drawings_visible,
        }
        true
    }

    /// Set the opponent mode and derive `show_opponent` from it
    pub fn set_opponent_mode(&mut self, id: &ScenarioId, mode: OpponentMode) -> bool {
        let Some(board) = self.boards.get_mut(id) else {
            return false;
        };
        board.opponent_mode = mode;
        if let Some(scenario) = self.scenarios.iter_mut().find(|s| &s.id == id) {
            scenario.show_opponent = mode != OpponentMode::Hidden;
        }
        true
    }
}
