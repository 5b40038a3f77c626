// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transient selection of players or drawings

use crate::{DrawingId, PlayerId};
use std::collections::BTreeSet;

/// Selected players and drawings. Only one of the two kinds is ever non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    player_ids: BTreeSet<PlayerId>,
    drawing_ids: BTreeSet<DrawingId>,
}

fn toggle<T: Ord + Clone>(set: &mut BTreeSet<T>, id: &T, additive: bool) {
    if !additive {
        set.clear();
        set.insert(id.clone());
    } else if !set.remove(id) {
        set.insert(id.clone());
    }
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Additive selection toggles membership, otherwise the selection becomes `{id}`
    pub fn select_player(&mut self, id: &PlayerId, additive: bool) {
        self.drawing_ids.clear();
        toggle(&mut self.player_ids, id, additive);
    }

    pub fn select_drawing(&mut self, id: &DrawingId, additive: bool) {
        self.player_ids.clear();
        toggle(&mut self.drawing_ids, id, additive);
    }

    pub fn clear(&mut self) {
        self.player_ids.clear();
        self.drawing_ids.clear();
    }

    pub fn players(&self) -> &BTreeSet<PlayerId> {
        &self.player_ids
    }

    pub fn drawings(&self) -> &BTreeSet<DrawingId> {
        &self.drawing_ids
    }

    pub fn contains_player(&self, id: &PlayerId) -> bool {
        self.player_ids.contains(id)
    }

    pub fn contains_drawing(&self, id: &DrawingId) -> bool {
        self.drawing_ids.contains(id)
    }

    pub fn remove_player(&mut self, id: &PlayerId) -> bool {
        self.player_ids.remove(id)
    }

    pub fn remove_drawing(&mut self, id: &DrawingId) -> bool {
        self.drawing_ids.remove(id)
    }

    pub fn is_empty(&self) -> bool {
        self.player_ids.is_empty() && self.drawing_ids.is_empty()
    }

    /// Empty the selection, returning what was selected
    pub fn take(&mut self) -> (BTreeSet<PlayerId>, BTreeSet<DrawingId>) {
        (
            std::mem::take(&mut self.player_ids),
            std::mem::take(&mut self.drawing_ids),
        )
    }
}
