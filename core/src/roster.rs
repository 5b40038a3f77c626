// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only roster input and tactical role labels

use crate::{CodecError, PlayerId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary playing position as supplied by the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

/// A squad member. The engine never mutates players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub shirt_number: Option<u8>,
    #[serde(default)]
    pub primary_position: Option<Position>,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            shirt_number: None,
            primary_position: None,
        }
    }

    pub fn with_shirt_number(mut self, number: u8) -> Self {
        self.shirt_number = Some(number);
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.primary_position = Some(position);
        self
    }
}

/// Ordered, read-only squad list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    pub fn new(players: Vec<Player>) -> Self {
        Self { players }
    }

    /// Parse a JSON array of players. Later duplicates of an id are dropped.
    pub fn from_json_str(json: &str) -> Result<Self, CodecError> {
        let players: Vec<Player> = serde_json::from_str(json)?;
        let mut roster = Self::default();
        for player in players {
            if roster.contains(&player.id) {
                tracing::warn!(player = %player.id, "Duplicate player id in roster, skipping");
                continue;
            }
            roster.players.push(player);
        }
        Ok(roster)
    }

    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.get(id).is_some()
    }

    pub fn find_by_shirt_number(&self, number: u8) -> Option<&Player> {
        self.players.iter().find(|p| p.shirt_number == Some(number))
    }

    pub fn ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl FromIterator<Player> for Roster {
    fn from_iter<I: IntoIterator<Item = Player>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Curated role labels offered by the role picker
pub const ROLE_PRESETS: [&str; 13] = [
    "TW", "LV", "IV", "RV", "6er", "8er", "10er", "LM", "ZM", "RM", "LA", "RA", "ST",
];

/// Free-form tactical role label ("TW", "6er", ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TacticalRole(String);

impl TacticalRole {
    /// Build a role from user text. Returns `None` when the trimmed text is empty.
    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The empty role given to players without a known position
    pub fn unassigned() -> Self {
        Self(String::new())
    }

    /// Default role for a freshly placed player
    pub fn for_position(position: Option<Position>) -> Self {
        let label = match position {
            Some(Position::Goalkeeper) => "TW",
            Some(Position::Defender) => "IV",
            Some(Position::Midfielder) => "ZM",
            Some(Position::Forward) => "ST",
            None => return Self::unassigned(),
        };
        Self(label.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unassigned(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_preset(&self) -> bool {
        ROLE_PRESETS.contains(&self.0.as_str())
    }
}

impl fmt::Display for TacticalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_from_json() {
        let json = r#"[
            {"id": "a", "name": "Anna", "shirt_number": 7, "primary_position": "midfielder"},
            {"id": "b", "name": "Ben"},
            {"id": "a", "name": "Again"}
        ]"#;
        let roster = Roster::from_json_str(json).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.find_by_shirt_number(7).unwrap().name, "Anna");
        assert_eq!(roster.get(&PlayerId::from("b")).unwrap().primary_position, None);

        assert!(matches!(Roster::from_json_str("{}"), Err(CodecError::Json(_))));
    }

    #[test]
    fn test_role_parse_trims() {
        assert_eq!(TacticalRole::parse("  6er ").unwrap().as_str(), "6er");
        assert!(TacticalRole::parse("   ").is_none());
        assert!(TacticalRole::parse("Libero").is_some_and(|r| !r.is_preset()));
    }

    #[test]
    fn test_default_role_from_position() {
        assert_eq!(TacticalRole::for_position(Some(Position::Goalkeeper)).as_str(), "TW");
        assert_eq!(TacticalRole::for_position(Some(Position::Forward)).as_str(), "ST");
        assert!(TacticalRole::for_position(None).is_unassigned());
    }

    #[test]
    fn test_roster_lookup() {
        let roster: Roster = vec![
            Player::new("p1", "Neuer").with_shirt_number(1),
            Player::new("p2", "Kimmich").with_shirt_number(6),
        ]
        .into_iter()
        .collect();

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.find_by_shirt_number(6).map(|p| p.name.as_str()), Some("Kimmich"));
        assert!(roster.contains(&PlayerId::from("p1")));
        assert!(!roster.contains(&PlayerId::from("p3")));
    }
}
