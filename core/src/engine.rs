// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command dispatch for the view layer
//!
//! [`TacticsEngine`] owns every scenario, the selection, the drawing draft and
//! the expiry timers. Commands run against the active scenario, which always
//! resolves (bootstrapping a default when needed). After a command changes a
//! board, the scenario timestamp is refreshed and both are handed to the
//! injected [`BoardStore`]. Commands that change nothing do not save.
//!
//! Timers need shared access to the engine, so hosts that want automatic
//! expiry wrap it in a [`SharedEngine`].

use crate::board::{BoardState, Membership, OpponentMode, Placement, Zone};
use crate::config::EngineConfig;
use crate::drawing::{Draft, DraftDrawing, Drawing, DrawingKind};
use crate::expiry::{ExpiryScheduler, ExpiryTicket};
use crate::geometry::NormalizedPoint;
use crate::placement::PlacementEngine;
use crate::roster::{Player, Roster};
use crate::scenario::{Scenario, ScenarioFlag, ScenarioManager, WorkspaceSnapshot};
use crate::selection::Selection;
use crate::store::BoardStore;
use crate::{DrawingId, MarkerId, PlayerId, ScenarioId};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// The board state engine
pub struct TacticsEngine {
    manager: ScenarioManager,
    selection: Selection,
    draft: Draft,
    tool: DrawingKind,
    color: String,
    temporary_mode: bool,
    roster: Roster,
    store: Box<dyn BoardStore>,
    config: EngineConfig,
    expiry: ExpiryScheduler,
}

impl TacticsEngine {
    pub fn new(roster: Roster, store: impl BoardStore + 'static, config: EngineConfig) -> Self {
        Self::with_manager(ScenarioManager::new(), roster, Box::new(store), config)
    }

    /// Rebuild an engine from a previously exported snapshot.
    ///
    /// Temporary drawings that outlived their lifetime are swept right away.
    pub fn from_snapshot(
        snapshot: WorkspaceSnapshot,
        roster: Roster,
        store: impl BoardStore + 'static,
        config: EngineConfig,
    ) -> Self {
        let manager = ScenarioManager::from_snapshot(snapshot, &roster);
        let mut engine = Self::with_manager(manager, roster, Box::new(store), config);
        let swept = engine.sweep_expired(Utc::now());
        if swept > 0 {
            tracing::info!(swept, "Removed expired temporary drawings from snapshot");
        }
        engine
    }

    fn with_manager(
        manager: ScenarioManager,
        roster: Roster,
        store: Box<dyn BoardStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            manager,
            selection: Selection::new(),
            draft: Draft::new(),
            tool: config.default_tool,
            color: config.default_drawing_color.clone(),
            temporary_mode: false,
            roster,
            store,
            config,
            expiry: ExpiryScheduler::new(),
        }
    }

    // ----------------------------------------------------------------
    // Queries
    // ----------------------------------------------------------------

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Swap in an updated roster supplied by the host
    pub fn replace_roster(&mut self, roster: Roster) {
        self.roster = roster;
    }

    pub fn scenarios(&self) -> &[Scenario] {
        self.manager.scenarios()
    }

    pub fn scenario(&self, id: &ScenarioId) -> Option<&Scenario> {
        self.manager.scenario(id)
    }

    pub fn board_state(&self, scenario_id: &ScenarioId) -> Option<&BoardState> {
        self.manager.board(scenario_id)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn draft(&self) -> Option<&DraftDrawing> {
        self.draft.current()
    }

    pub fn tool(&self) -> DrawingKind {
        self.tool
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn temporary_mode(&self) -> bool {
        self.temporary_mode
    }

    /// Number of expiry timers still pending
    pub fn pending_expiries(&self) -> usize {
        self.expiry.pending_count()
    }

    /// Id of the active scenario; bootstraps a default if there is none
    pub fn active_scenario_id(&mut self) -> ScenarioId {
        let last_active = self.store.last_active_scenario();
        let (id, bootstrapped) =
            self.manager
                .resolve_active(last_active, &self.config.default_scenario_name, &self.roster);
        if bootstrapped {
            self.persist(id);
            self.remember_active(id);
        }
        id
    }

    pub fn active_scenario(&mut self) -> &Scenario {
        let id = self.active_scenario_id();
        self.manager
            .scenario_or_insert(&id, &self.config.default_scenario_name, &self.roster)
    }

    pub fn active_board(&mut self) -> &BoardState {
        let id = self.active_scenario_id();
        self.manager.board_or_insert(&id, &self.roster)
    }

    pub fn placements(&mut self) -> Vec<Placement> {
        self.active_board().placements.clone()
    }

    /// Bench players in bench order, followed by roster players the board
    /// does not know about yet
    pub fn bench_players(&mut self) -> Vec<Player> {
        let id = self.active_scenario_id();
        let Some(board) = self.manager.board(&id) else {
            return Vec::new();
        };

        let mut players: Vec<Player> = board
            .bench_player_ids
            .iter()
            .filter_map(|pid| self.roster.get(pid).cloned())
            .collect();
        players.extend(
            self.roster
                .iter()
                .filter(|p| board.membership(&p.id) == Membership::Unassigned)
                .cloned(),
        );
        players
    }

    pub fn excluded_players(&mut self) -> Vec<Player> {
        let id = self.active_scenario_id();
        let Some(board) = self.manager.board(&id) else {
            return Vec::new();
        };
        board
            .excluded_player_ids
            .iter()
            .filter_map(|pid| self.roster.get(pid).cloned())
            .collect()
    }

    pub fn snapshot(&self) -> WorkspaceSnapshot {
        self.manager.to_snapshot()
    }

    // ----------------------------------------------------------------
    // Persistence
    // ----------------------------------------------------------------

    fn persist(&mut self, id: ScenarioId) {
        if let Some(board) = self.manager.board(&id) {
            if let Err(err) = self.store.save_board(board) {
                tracing::warn!(scenario = %id, "Failed to save board state: {}", err);
            }
        }
        if let Some(scenario) = self.manager.scenario(&id) {
            if let Err(err) = self.store.save_scenario(scenario) {
                tracing::warn!(scenario = %id, "Failed to save scenario: {}", err);
            }
        }
    }

    /// Refresh the scenario timestamp and persist it with its board
    fn commit(&mut self, id: ScenarioId) {
        if let Some(scenario) = self.manager.scenario_mut(&id) {
            scenario.touch();
        }
        self.persist(id);
    }

    fn remember_active(&mut self, id: ScenarioId) {
        if let Err(err) = self.store.remember_active(&id) {
            tracing::warn!(scenario = %id, "Failed to remember active scenario: {}", err);
        }
    }

    /// Run `edit` on the active board and commit if it reports a change
    fn edit_active<R>(&mut self, edit: impl FnOnce(&mut BoardState, &Roster) -> Option<R>) -> Option<R> {
        let id = self.active_scenario_id();
        let result = {
            let board = self.manager.board_mut(&id)?;
            edit(board, &self.roster)
        };
        if result.is_some() {
            self.commit(id);
        }
        result
    }

    // ----------------------------------------------------------------
    // Placement commands
    // ----------------------------------------------------------------

    /// Drop a player on the pitch; returns where the token landed.
    ///
    /// Players missing from the roster are ignored and `point` comes back
    /// unchanged.
    pub fn drop_player(&mut self, player_id: &PlayerId, point: NormalizedPoint) -> NormalizedPoint {
        let landed = self.edit_active(|board, roster| PlacementEngine::new(board, roster).drop_player(player_id, point));
        landed.unwrap_or(point)
    }

    /// Move a placed player; `None` if the player is not on the pitch
    pub fn move_player(&mut self, player_id: &PlayerId, point: NormalizedPoint) -> Option<NormalizedPoint> {
        self.edit_active(|board, roster| PlacementEngine::new(board, roster).move_player(player_id, point))
    }

    pub fn send_to_bench(&mut self, player_id: &PlayerId) -> bool {
        self.edit_active(|board, roster| PlacementEngine::new(board, roster).send_to_bench(player_id).then_some(()))
            .is_some()
    }

    pub fn remove_from_lineup(&mut self, player_id: &PlayerId) -> bool {
        self.edit_active(|board, roster| {
            PlacementEngine::new(board, roster)
                .remove_from_lineup(player_id)
                .then_some(())
        })
        .is_some()
    }

    pub fn toggle_excluded(&mut self, player_id: &PlayerId) {
        let excluded = self.edit_active(|board, roster| {
            let toggled = PlacementEngine::new(board, roster).toggle_excluded(player_id);
            toggled.then(|| board.membership(player_id) == Membership::Excluded)
        });
        if excluded == Some(true) {
            self.selection.remove_player(player_id);
        }
    }

    pub fn update_role(&mut self, player_id: &PlayerId, role_name: &str) -> bool {
        self.edit_active(|board, roster| {
            PlacementEngine::new(board, roster)
                .update_role(player_id, role_name)
                .then_some(())
        })
        .is_some()
    }

    pub fn update_zone(&mut self, player_id: &PlayerId, zone: Option<Zone>) -> bool {
        self.edit_active(|board, roster| {
            PlacementEngine::new(board, roster)
                .update_zone(player_id, zone)
                .then_some(())
        })
        .is_some()
    }

    // ----------------------------------------------------------------
    // Marker commands
    // ----------------------------------------------------------------

    pub fn move_opponent_marker(&mut self, index: usize, point: NormalizedPoint) -> bool {
        self.edit_active(|board, _| board.move_opponent_marker(index, point).then_some(()))
            .is_some()
    }

    pub fn rename_opponent_marker(&mut self, index: usize, name: &str) -> bool {
        self.edit_active(|board, _| board.rename_opponent_marker(index, name).then_some(()))
            .is_some()
    }

    pub fn reset_opponent_markers(&mut self) {
        self.edit_active(|board, _| {
            board.reset_opponent_markers();
            Some(())
        });
    }

    pub fn add_neutral_marker(&mut self, point: NormalizedPoint, name: &str) -> MarkerId {
        let id = self.edit_active(|board, _| Some(board.add_neutral_marker(point, name)));
        id.unwrap_or_default()
    }

    pub fn move_neutral_marker(&mut self, id: &MarkerId, point: NormalizedPoint) -> bool {
        self.edit_active(|board, _| board.move_neutral_marker(id, point).then_some(()))
            .is_some()
    }

    pub fn rename_neutral_marker(&mut self, id: &MarkerId, name: &str) -> bool {
        self.edit_active(|board, _| board.rename_neutral_marker(id, name).then_some(()))
            .is_some()
    }

    pub fn delete_neutral_marker(&mut self, id: &MarkerId) -> bool {
        self.edit_active(|board, _| board.delete_neutral_marker(id).then_some(()))
            .is_some()
    }

    // ----------------------------------------------------------------
    // Drawing commands
    // ----------------------------------------------------------------

    pub fn set_tool(&mut self, tool: DrawingKind) {
        self.tool = tool;
    }

    pub fn set_color(&mut self, color: &str) {
        let color = color.trim();
        if !color.is_empty() {
            self.color = color.to_string();
        }
    }

    /// Newly finished drawings are temporary while this is on
    pub fn set_temporary_mode(&mut self, enabled: bool) {
        self.temporary_mode = enabled;
    }

    pub fn begin_drawing(&mut self, point: NormalizedPoint) {
        self.draft.begin(self.tool, point);
    }

    pub fn update_drawing(&mut self, point: NormalizedPoint) {
        self.draft.update(point);
    }

    /// Finish the draft and add it to the active board if it is complete
    pub fn finish_drawing(&mut self) -> Option<DrawingId> {
        let drawing = self.draft.finish(&self.color, self.temporary_mode, Utc::now())?;
        Some(self.add_drawing(drawing))
    }

    pub fn cancel_drawing(&mut self) {
        self.draft.cancel();
    }

    /// Append a finished drawing to the active board, scheduling its expiry
    /// if it is temporary
    pub fn add_drawing(&mut self, drawing: Drawing) -> DrawingId {
        let id = drawing.id;
        let temporary = drawing.is_temporary;
        let scenario_id = self.active_scenario_id();
        if let Some(board) = self.manager.board_mut(&scenario_id) {
            board.drawings.push(drawing);
            self.commit(scenario_id);
            if temporary {
                self.expiry.schedule(scenario_id, id, self.lifetime());
            }
            tracing::debug!(drawing = %id, temporary, "Added drawing");
        }
        id
    }

    fn lifetime(&self) -> Duration {
        self.config.temporary_drawing_lifetime()
    }

    /// Time left before a drawing created at `created_at` expires
    fn remaining_lifetime(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
        let elapsed = (now - created_at).to_std().unwrap_or(Duration::ZERO);
        self.lifetime().saturating_sub(elapsed)
    }

    pub fn toggle_temporary(&mut self, drawing_id: &DrawingId) -> bool {
        let scenario_id = self.active_scenario_id();
        let Some(drawing) = self
            .manager
            .board_mut(&scenario_id)
            .and_then(|board| board.drawing_mut(drawing_id))
        else {
            return false;
        };

        drawing.is_temporary = !drawing.is_temporary;
        let now_temporary = drawing.is_temporary;
        if now_temporary {
            drawing.created_at = Utc::now();
            self.expiry.schedule(scenario_id, *drawing_id, self.lifetime());
        } else {
            self.expiry.cancel(&scenario_id, drawing_id);
        }
        self.commit(scenario_id);
        true
    }

    /// Keep a temporary drawing for good
    pub fn persist_temporary_drawing(&mut self, drawing_id: &DrawingId) -> bool {
        let scenario_id = self.active_scenario_id();
        self.expiry.cancel(&scenario_id, drawing_id);
        let changed = self
            .manager
            .board_mut(&scenario_id)
            .and_then(|board| board.drawing_mut(drawing_id))
            .is_some_and(|drawing| std::mem::replace(&mut drawing.is_temporary, false));
        if changed {
            self.commit(scenario_id);
        }
        changed
    }

    pub fn delete_drawing(&mut self, drawing_id: &DrawingId) -> bool {
        let scenario_id = self.active_scenario_id();
        self.expiry.cancel(&scenario_id, drawing_id);
        self.selection.remove_drawing(drawing_id);
        let removed = self
            .manager
            .board_mut(&scenario_id)
            .and_then(|board| board.remove_drawing(drawing_id))
            .is_some();
        if removed {
            self.commit(scenario_id);
        }
        removed
    }

    /// Remove every drawing of the active board; returns how many were removed
    pub fn delete_all_drawings(&mut self) -> usize {
        let scenario_id = self.active_scenario_id();
        let cancelled = self.expiry.cancel_scenario(&scenario_id);
        let Some(board) = self.manager.board_mut(&scenario_id) else {
            return 0;
        };
        let removed: Vec<DrawingId> = board.drawings.drain(..).map(|d| d.id).collect();
        for id in &removed {
            self.selection.remove_drawing(id);
        }
        if !removed.is_empty() {
            self.commit(scenario_id);
        }
        tracing::debug!(removed = removed.len(), cancelled, "Deleted all drawings");
        removed.len()
    }

    /// Called when an expiry timer fires. Re-validates before removing.
    pub fn expire_drawing(&mut self, ticket: ExpiryTicket) -> bool {
        if !self.expiry.complete(ticket) {
            tracing::debug!(drawing = %ticket.drawing_id, "Ignoring stale expiry timer");
            return false;
        }

        let Some(board) = self.manager.board_mut(&ticket.scenario_id) else {
            return false;
        };
        let still_temporary = board
            .drawing(&ticket.drawing_id)
            .is_some_and(|d| d.is_temporary);
        if !still_temporary {
            return false;
        }

        board.remove_drawing(&ticket.drawing_id);
        self.selection.remove_drawing(&ticket.drawing_id);
        tracing::info!(scenario = %ticket.scenario_id, drawing = %ticket.drawing_id, "Temporary drawing expired");
        self.commit(ticket.scenario_id);
        true
    }

    /// Remove every temporary drawing whose lifetime has run out at `now`
    pub fn sweep_expired(&mut self, now: DateTime<Utc>) -> usize {
        let lifetime = self.lifetime();
        let mut expired: Vec<(ScenarioId, DrawingId)> = Vec::new();
        for board in self.manager.boards_mut() {
            let scenario_id = board.scenario_id;
            board.drawings.retain(|d| {
                if d.is_expired(now, lifetime) {
                    expired.push((scenario_id, d.id));
                    false
                } else {
                    true
                }
            });
        }

        let mut touched: Vec<ScenarioId> = Vec::new();
        for (scenario_id, drawing_id) in &expired {
            self.expiry.cancel(scenario_id, drawing_id);
            self.selection.remove_drawing(drawing_id);
            if !touched.contains(scenario_id) {
                touched.push(*scenario_id);
            }
        }
        for scenario_id in touched {
            self.commit(scenario_id);
        }
        expired.len()
    }

    /// Schedule timers for every temporary drawing of a scenario
    fn schedule_temporaries(&mut self, scenario_id: ScenarioId) -> usize {
        let now = Utc::now();
        let pending: Vec<(DrawingId, Duration)> = match self.manager.board(&scenario_id) {
            Some(board) => board
                .drawings
                .iter()
                .filter(|d| d.is_temporary)
                .map(|d| (d.id, self.remaining_lifetime(d.created_at, now)))
                .collect(),
            None => return 0,
        };
        let count = pending.len();
        for (drawing_id, delay) in pending {
            self.expiry.schedule(scenario_id, drawing_id, delay);
        }
        count
    }

    // ----------------------------------------------------------------
    // Scenario commands
    // ----------------------------------------------------------------

    fn activate(&mut self, id: ScenarioId) {
        self.selection.clear();
        self.draft.cancel();
        self.remember_active(id);
    }

    /// Create the default scenario if there is none
    pub fn bootstrap_default(&mut self) -> Option<ScenarioId> {
        let id = self
            .manager
            .bootstrap_default(&self.config.default_scenario_name, &self.roster)?;
        self.persist(id);
        self.activate(id);
        Some(id)
    }

    pub fn create_scenario(&mut self, name: &str) -> ScenarioId {
        let name = match name.trim() {
            "" => self.config.default_scenario_name.clone(),
            trimmed => trimmed.to_string(),
        };
        let id = self.manager.create(&name, &self.roster);
        self.persist(id);
        self.activate(id);
        id
    }

    pub fn duplicate_scenario(&mut self, scenario_id: &ScenarioId) -> Option<ScenarioId> {
        let id = self.manager.duplicate(scenario_id)?;
        self.persist(id);
        self.activate(id);
        self.schedule_temporaries(id);
        Some(id)
    }

    pub fn rename_scenario(&mut self, scenario_id: &ScenarioId, name: &str) -> bool {
        let renamed = self.manager.rename(scenario_id, name);
        if renamed {
            self.persist(*scenario_id);
        }
        renamed
    }

    pub fn delete_scenario(&mut self, scenario_id: &ScenarioId) -> bool {
        let was_active = self.manager.tracked_active() == Some(*scenario_id);
        if self.manager.delete(scenario_id).is_none() {
            return false;
        }
        self.expiry.cancel_scenario(scenario_id);
        if let Err(err) = self.store.remove_scenario(scenario_id) {
            tracing::warn!(scenario = %scenario_id, "Failed to remove scenario from store: {}", err);
        }
        if was_active {
            let next = self.active_scenario_id();
            self.activate(next);
        }
        true
    }

    pub fn reset_layout(&mut self, scenario_id: &ScenarioId) -> bool {
        let Some(removed) = self.manager.reset_layout(scenario_id, &self.roster) else {
            return false;
        };
        for drawing_id in &removed {
            self.expiry.cancel(scenario_id, drawing_id);
        }
        if self.manager.tracked_active() == Some(*scenario_id) {
            self.selection.clear();
        }
        self.commit(*scenario_id);
        true
    }

    pub fn select_scenario(&mut self, scenario_id: &ScenarioId) -> bool {
        if !self.manager.select(scenario_id) {
            return false;
        }
        self.activate(*scenario_id);
        true
    }

    fn toggle(&mut self, flag: ScenarioFlag) -> bool {
        let id = self.active_scenario_id();
        let toggled = self.manager.toggle_flag(&id, flag);
        if toggled {
            self.commit(id);
        }
        toggled
    }

    pub fn toggle_show_opponent(&mut self) -> bool {
        self.toggle(ScenarioFlag::ShowOpponent)
    }

    pub fn toggle_show_zones(&mut self) -> bool {
        self.toggle(ScenarioFlag::ShowZones)
    }

    pub fn toggle_show_lines(&mut self) -> bool {
        self.toggle(ScenarioFlag::ShowLines)
    }

    pub fn toggle_drawings_visible(&mut self) -> bool {
        self.toggle(ScenarioFlag::DrawingsVisible)
    }

    pub fn set_opponent_mode(&mut self, mode: OpponentMode) -> bool {
        let id = self.active_scenario_id();
        let changed = self.manager.set_opponent_mode(&id, mode);
        if changed {
            self.commit(id);
        }
        changed
    }

    // ----------------------------------------------------------------
    // Selection commands
    // ----------------------------------------------------------------

    pub fn select_player(&mut self, player_id: &PlayerId, additive: bool) {
        self.selection.select_player(player_id, additive);
    }

    pub fn select_drawing(&mut self, drawing_id: &DrawingId, additive: bool) {
        self.selection.select_drawing(drawing_id, additive);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Bench every selected player and delete every selected drawing
    pub fn delete_selection(&mut self) {
        let (players, drawings) = self.selection.take();
        if players.is_empty() && drawings.is_empty() {
            return;
        }
        let scenario_id = self.active_scenario_id();
        for drawing_id in &drawings {
            self.expiry.cancel(&scenario_id, drawing_id);
        }

        let Some(board) = self.manager.board_mut(&scenario_id) else {
            return;
        };
        let mut changed = false;
        for drawing_id in &drawings {
            changed |= board.remove_drawing(drawing_id).is_some();
        }
        let mut placement = PlacementEngine::new(board, &self.roster);
        for player_id in &players {
            changed |= placement.send_to_bench(player_id);
        }
        if changed {
            self.commit(scenario_id);
        }
    }
}

/// Thread-safe handle whose expiry timers lock the engine when they fire
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<TacticsEngine>>,
}

impl SharedEngine {
    /// Wire the engine's expiry scheduler and reschedule surviving
    /// temporary drawings. Must be called inside a tokio runtime for timers
    /// to be armed.
    pub fn new(mut engine: TacticsEngine) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<Mutex<TacticsEngine>>| {
            let weak = weak.clone();
            engine.expiry.wire(Arc::new(move |ticket| {
                if let Some(engine) = weak.upgrade() {
                    engine.lock().expire_drawing(ticket);
                }
            }));
            Mutex::new(engine)
        });

        {
            let mut engine = inner.lock();
            let ids: Vec<ScenarioId> = engine.scenarios().iter().map(|s| s.id).collect();
            let scheduled: usize = ids.into_iter().map(|id| engine.schedule_temporaries(id)).sum();
            if scheduled > 0 {
                tracing::info!(scheduled, "Rescheduled temporary drawing expiry");
            }
        }

        Self { inner }
    }

    pub fn lock(&self) -> MutexGuard<'_, TacticsEngine> {
        self.inner.lock()
    }
}
