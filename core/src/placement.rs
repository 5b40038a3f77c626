// SPDX-License-Identifier: MIT OR Apache-2.0

//! Placement engine: dropping players, bench and exclusion handling

use crate::board::{BoardState, Membership, Placement, Transition, Zone};
use crate::geometry::NormalizedPoint;
use crate::roster::{Roster, TacticalRole};
use crate::rules;
use crate::{PlacementId, PlayerId};

/// Applies placement commands to one board
pub struct PlacementEngine<'a> {
    /// The board being edited
    board: &'a mut BoardState,
    /// Roster used to derive default roles
    roster: &'a Roster,
}

impl<'a> PlacementEngine<'a> {
    pub fn new(board: &'a mut BoardState, roster: &'a Roster) -> Self {
        Self { board, roster }
    }

    /// Drop a player onto the pitch, creating or moving its placement.
    ///
    /// Returns the point the token actually landed on, or `None` for a
    /// player the roster does not know.
    pub fn drop_player(&mut self, player_id: &PlayerId, desired: NormalizedPoint) -> Option<NormalizedPoint> {
        let position = self.roster.get(player_id)?.primary_position;
        let point = self.resolve(player_id, desired);

        let placement = match self.board.placement(player_id) {
            Some(existing) => Placement {
                point,
                ..existing.clone()
            },
            None => Placement {
                id: PlacementId::new(),
                player_id: player_id.clone(),
                point,
                zone: None,
                role: TacticalRole::for_position(position),
            },
        };

        self.board.transition(player_id, Transition::Place(placement));
        Some(point)
    }

    /// Move an already placed player. No-op for players off the pitch.
    pub fn move_player(&mut self, player_id: &PlayerId, desired: NormalizedPoint) -> Option<NormalizedPoint> {
        self.board.placement(player_id)?;
        self.drop_player(player_id, desired)
    }

    /// Remove any placement and make sure the player is on the bench
    pub fn send_to_bench(&mut self, player_id: &PlayerId) -> bool {
        if !self.roster.contains(player_id) || self.board.membership(player_id) == Membership::Bench {
            return false;
        }
        self.board.transition(player_id, Transition::Bench);
        true
    }

    /// Same as [`send_to_bench`](Self::send_to_bench)
    pub fn remove_from_lineup(&mut self, player_id: &PlayerId) -> bool {
        self.send_to_bench(player_id)
    }

    /// Excluded players go back to the bench, everyone else becomes excluded.
    ///
    /// Returns false for a player the roster does not know.
    pub fn toggle_excluded(&mut self, player_id: &PlayerId) -> bool {
        if !self.roster.contains(player_id) {
            return false;
        }
        let target = if self.board.membership(player_id) == Membership::Excluded {
            Transition::Bench
        } else {
            Transition::Exclude
        };
        self.board.transition(player_id, target);
        true
    }

    pub fn update_role(&mut self, player_id: &PlayerId, role_name: &str) -> bool {
        let Some(role) = TacticalRole::parse(role_name) else {
            return false;
        };
        match self.board.placement_mut(player_id) {
            Some(placement) => {
                placement.role = role;
                true
            }
            None => false,
        }
    }

    pub fn update_zone(&mut self, player_id: &PlayerId, zone: Option<Zone>) -> bool {
        match self.board.placement_mut(player_id) {
            Some(placement) => {
                placement.zone = zone;
                true
            }
            None => false,
        }
    }

    fn resolve(&self, player_id: &PlayerId, desired: NormalizedPoint) -> NormalizedPoint {
        let others: Vec<NormalizedPoint> = self
            .board
            .placements
            .iter()
            .filter(|p| &p.player_id != player_id)
            .map(|p| p.point)
            .collect();
        rules::resolve_drop_point(desired, &others)
    }
}
