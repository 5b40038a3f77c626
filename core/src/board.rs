// SPDX-License-Identifier: MIT OR Apache-2.0

//! Board state representation and membership bookkeeping

use crate::drawing::Drawing;
use crate::geometry::NormalizedPoint;
use crate::roster::{Roster, TacticalRole};
use crate::{DrawingId, MarkerId, PlacementId, PlayerId, ScenarioId};
use serde::{Deserialize, Serialize};

/// Number of markers in the opposing line-up
pub const OPPONENT_MARKER_COUNT: usize = 11;

/// Coarse pitch zone a placement can be tagged with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Defense,
    Midfield,
    Attack,
}

impl Zone {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "defense" | "defence" => Some(Zone::Defense),
            "midfield" => Some(Zone::Midfield),
            "attack" => Some(Zone::Attack),
            _ => None,
        }
    }
}

/// How the opposing team is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpponentMode {
    #[default]
    Hidden,
    Markers,
    Formation,
}

/// A roster player positioned on the pitch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub id: PlacementId,
    pub player_id: PlayerId,
    pub point: NormalizedPoint,
    #[serde(default)]
    pub zone: Option<Zone>,
    pub role: TacticalRole,
}

/// One marker of the opposing line-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentMarker {
    pub id: MarkerId,
    pub point: NormalizedPoint,
    pub name: String,
}

/// A free neutral marker (zone circle, cone, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeutralMarker {
    pub id: MarkerId,
    pub point: NormalizedPoint,
    pub name: String,
}

/// The single collection a player currently belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Placed,
    Bench,
    Excluded,
    /// In none of the three collections (e.g. joined the roster later)
    Unassigned,
}

/// Target of a membership transition
#[derive(Debug, Clone)]
pub(crate) enum Transition {
    Place(Placement),
    Bench,
    Exclude,
}

/// Canonical 4-4-2 opposing line-up in the upper half of the pitch
pub fn default_opponent_markers() -> Vec<OpponentMarker> {
    const LINE_UP: [(f64, f64); OPPONENT_MARKER_COUNT] = [
        (0.50, 0.05),
        (0.15, 0.18),
        (0.38, 0.16),
        (0.62, 0.16),
        (0.85, 0.18),
        (0.15, 0.32),
        (0.38, 0.30),
        (0.62, 0.30),
        (0.85, 0.32),
        (0.40, 0.44),
        (0.60, 0.44),
    ];

    LINE_UP
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| OpponentMarker {
            id: MarkerId::new(),
            point: NormalizedPoint::new(x, y),
            name: (i + 1).to_string(),
        })
        .collect()
}

/// Full geometric and annotation content of one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardState {
    pub scenario_id: ScenarioId,
    pub placements: Vec<Placement>,
    pub bench_player_ids: Vec<PlayerId>,
    pub excluded_player_ids: Vec<PlayerId>,
    #[serde(default)]
    pub opponent_mode: OpponentMode,
    pub opponent_markers: Vec<OpponentMarker>,
    #[serde(default)]
    pub neutral_markers: Vec<NeutralMarker>,
    #[serde(default)]
    pub drawings: Vec<Drawing>,
}

impl BoardState {
    /// Empty board with the whole roster on the bench
    pub fn new(scenario_id: ScenarioId, roster: &Roster) -> Self {
        Self {
            scenario_id,
            placements: Vec::new(),
            bench_player_ids: roster.ids(),
            excluded_player_ids: Vec::new(),
            opponent_mode: OpponentMode::Hidden,
            opponent_markers: default_opponent_markers(),
            neutral_markers: Vec::new(),
            drawings: Vec::new(),
        }
    }

    pub fn placement(&self, player_id: &PlayerId) -> Option<&Placement> {
        self.placements.iter().find(|p| &p.player_id == player_id)
    }

    pub(crate) fn placement_mut(&mut self, player_id: &PlayerId) -> Option<&mut Placement> {
        self.placements.iter_mut().find(|p| &p.player_id == player_id)
    }

    pub fn membership(&self, player_id: &PlayerId) -> Membership {
        if self.placement(player_id).is_some() {
            Membership::Placed
        } else if self.excluded_player_ids.contains(player_id) {
            Membership::Excluded
        } else if self.bench_player_ids.contains(player_id) {
            Membership::Bench
        } else {
            Membership::Unassigned
        }
    }

    /// Move a player into exactly one collection, evicting it from the others.
    ///
    /// Every membership change goes through here.
    pub(crate) fn transition(&mut self, player_id: &PlayerId, to: Transition) {
        match to {
            Transition::Place(placement) => {
                debug_assert_eq!(&placement.player_id, player_id);
                self.bench_player_ids.retain(|id| id != player_id);
                self.excluded_player_ids.retain(|id| id != player_id);

                let mut kept = false;
                self.placements.retain(|p| {
                    if &p.player_id != player_id {
                        return true;
                    }
                    // Only the first placement of a player survives
                    !std::mem::replace(&mut kept, true)
                });
                match self.placement_mut(player_id) {
                    Some(slot) => *slot = placement,
                    None => self.placements.push(placement),
                }
            }
            Transition::Bench => {
                self.placements.retain(|p| &p.player_id != player_id);
                self.excluded_player_ids.retain(|id| id != player_id);
                if !self.bench_player_ids.contains(player_id) {
                    self.bench_player_ids.push(player_id.clone());
                }
            }
            Transition::Exclude => {
                self.placements.retain(|p| &p.player_id != player_id);
                self.bench_player_ids.retain(|id| id != player_id);
                if !self.excluded_player_ids.contains(player_id) {
                    self.excluded_player_ids.push(player_id.clone());
                }
            }
        }
    }

    /// Repair boards where a player sits in several collections.
    ///
    /// Precedence is placement > excluded > bench. Returns the number of
    /// evicted memberships.
    pub fn normalize_membership(&mut self) -> usize {
        let before =
            self.placements.len() + self.excluded_player_ids.len() + self.bench_player_ids.len();

        let mut seen: Vec<PlayerId> = Vec::new();
        self.placements.retain(|p| {
            if seen.contains(&p.player_id) {
                false
            } else {
                seen.push(p.player_id.clone());
                true
            }
        });
        self.excluded_player_ids.retain(|id| {
            if seen.contains(id) {
                false
            } else {
                seen.push(id.clone());
                true
            }
        });
        self.bench_player_ids.retain(|id| {
            if seen.contains(id) {
                false
            } else {
                seen.push(id.clone());
                true
            }
        });

        let after =
            self.placements.len() + self.excluded_player_ids.len() + self.bench_player_ids.len();
        let evicted = before - after;
        if evicted > 0 {
            tracing::warn!(
                scenario = %self.scenario_id,
                evicted,
                "Repaired overlapping player memberships"
            );
        }
        evicted
    }

    /// Reset the opposing line-up if its length drifted from 11.
    ///
    /// Returns true when a repair happened.
    pub fn ensure_opponent_markers(&mut self) -> bool {
        if self.opponent_markers.len() == OPPONENT_MARKER_COUNT {
            return false;
        }
        tracing::warn!(
            scenario = %self.scenario_id,
            found = self.opponent_markers.len(),
            "Opponent marker count drifted, restoring default line-up"
        );
        self.opponent_markers = default_opponent_markers();
        true
    }

    pub fn move_opponent_marker(&mut self, index: usize, point: NormalizedPoint) -> bool {
        let repaired = self.ensure_opponent_markers();
        match self.opponent_markers.get_mut(index) {
            Some(marker) => {
                marker.point = point;
                true
            }
            None => repaired,
        }
    }

    pub fn rename_opponent_marker(&mut self, index: usize, name: &str) -> bool {
        let repaired = self.ensure_opponent_markers();
        let name = name.trim();
        if name.is_empty() {
            return repaired;
        }
        match self.opponent_markers.get_mut(index) {
            Some(marker) => {
                marker.name = name.to_string();
                true
            }
            None => repaired,
        }
    }

    pub fn reset_opponent_markers(&mut self) {
        self.opponent_markers = default_opponent_markers();
    }

    pub fn add_neutral_marker(&mut self, point: NormalizedPoint, name: &str) -> MarkerId {
        let marker = NeutralMarker {
            id: MarkerId::new(),
            point,
            name: name.trim().to_string(),
        };
        let id = marker.id;
        self.neutral_markers.push(marker);
        id
    }

    pub fn move_neutral_marker(&mut self, id: &MarkerId, point: NormalizedPoint) -> bool {
        match self.neutral_markers.iter_mut().find(|m| &m.id == id) {
            Some(marker) => {
                marker.point = point;
                true
            }
            None => false,
        }
    }

    pub fn rename_neutral_marker(&mut self, id: &MarkerId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        match self.neutral_markers.iter_mut().find(|m| &m.id == id) {
            Some(marker) => {
                marker.name = name.to_string();
                true
            }
            None => false,
        }
    }

    pub fn delete_neutral_marker(&mut self, id: &MarkerId) -> bool {
        let before = self.neutral_markers.len();
        self.neutral_markers.retain(|m| &m.id != id);
        self.neutral_markers.len() != before
    }

    pub fn drawing(&self, id: &DrawingId) -> Option<&Drawing> {
        self.drawings.iter().find(|d| &d.id == id)
    }

    pub(crate) fn drawing_mut(&mut self, id: &DrawingId) -> Option<&mut Drawing> {
        self.drawings.iter_mut().find(|d| &d.id == id)
    }

    pub(crate) fn remove_drawing(&mut self, id: &DrawingId) -> Option<Drawing> {
        let index = self.drawings.iter().position(|d| &d.id == id)?;
        Some(self.drawings.remove(index))
    }

    /// Clear placements, drawings and markers; the whole roster returns to the bench.
    ///
    /// Returns the ids of the drawings that were removed.
    pub(crate) fn reset_layout(&mut self, roster: &Roster) -> Vec<DrawingId> {
        let removed = self.drawings.drain(..).map(|d| d.id).collect();
        self.placements.clear();
        self.excluded_player_ids.clear();
        self.bench_player_ids = roster.ids();
        self.neutral_markers.clear();
        self.opponent_markers = default_opponent_markers();
        removed
    }
}
