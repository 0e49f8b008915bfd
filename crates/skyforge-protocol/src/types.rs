//! Core shared types for Skyforge.
//!
//! Everything here is plain data: identities, coordinates, and the
//! messages the arena core asks the host to deliver. None of it carries
//! behaviour beyond parsing and formatting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A stable identifier for a player.
///
/// Membership is keyed by this, never by display name, so a rename (or two
/// players sharing a name across reconnects) cannot collide.
///
/// `#[serde(transparent)]` serializes `PlayerId(42)` as plain `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for an arena (one isolated minigame instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArenaId(pub u64);

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A-{}", self.0)
    }
}

/// The host's name for a level (world), e.g. `"sw-islands"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelId(String);

impl LevelId {
    /// Creates a level id from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the level name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LevelId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for LevelId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A player as the arena sees them: stable id plus the name used in
/// broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: PlayerId,
    pub name: String,
}

impl PlayerRef {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: PlayerId(id),
            name: name.into(),
        }
    }
}

impl fmt::Display for PlayerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

// ---------------------------------------------------------------------------
// World types
// ---------------------------------------------------------------------------

/// A point in a level.
///
/// Arena descriptors store positions as `"x,y,z"` strings; [`FromStr`]
/// and [`Display`](fmt::Display) convert between the two forms.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Position) -> f64 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// The integer block coordinates this position falls in.
    pub fn block(&self) -> (i64, i64, i64) {
        (
            self.x.floor() as i64,
            self.y.floor() as i64,
            self.z.floor() as i64,
        )
    }

    /// Returns `true` if both positions are inside the same block.
    pub fn same_block(&self, other: &Position) -> bool {
        self.block() == other.block()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

impl FromStr for Position {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ProtocolError::InvalidMessage(format!("position {s:?}: {e}")))?;

        match parts.as_slice() {
            [x, y, z] if parts.iter().all(|c| c.is_finite()) => Ok(Self::new(*x, *y, *z)),
            _ => Err(ProtocolError::InvalidMessage(format!(
                "position {s:?}: expected three finite components \"x,y,z\""
            ))),
        }
    }
}

/// A position inside a specific level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub level: LevelId,
    pub position: Position,
}

impl Location {
    pub fn new(level: LevelId, position: Position) -> Self {
        Self { level, position }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.position, self.level)
    }
}

/// A level that the host has materialized and the arena may use.
///
/// Returned by the map-reset collaborator; the arena borrows it for the
/// duration of a round and gets a fresh one on every reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    /// Where players respawn in this level by default.
    pub spawn: Position,
}

impl Level {
    /// The level's default spawn as a full location.
    pub fn spawn_location(&self) -> Location {
        Location::new(self.id.clone(), self.spawn)
    }
}

/// Gameplay mode the host applies to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    Survival,
    Creative,
    /// Non-destructive: players cannot break or place blocks.
    Adventure,
    Spectator,
}

/// A stack of items by numeric item id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    pub id: u16,
    pub count: u8,
}

impl ItemStack {
    pub const fn new(id: u16, count: u8) -> Self {
        Self { id, count }
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// A message the arena asks the host to show a player.
///
/// The variant picks the presentation channel; hosts map each to their
/// own chat line, action-bar tip, popup, or full-screen title.
///
/// Serialized adjacently tagged: `{"kind":"Tip","text":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text")]
pub enum Notice {
    /// Regular chat line.
    Message(String),
    /// Short-lived hint above the hotbar.
    Tip(String),
    /// Popup above the hotbar, replaces the previous one.
    Popup(String),
    /// Full-screen title with an optional subtitle.
    Title { title: String, subtitle: String },
}

impl Notice {
    /// A title without subtitle.
    pub fn title(text: impl Into<String>) -> Self {
        Self::Title {
            title: text.into(),
            subtitle: String::new(),
        }
    }

    /// The primary text regardless of channel.
    pub fn text(&self) -> &str {
        match self {
            Self::Message(t) | Self::Tip(t) | Self::Popup(t) => t,
            Self::Title { title, .. } => title,
        }
    }
}

/// Emitted when a round ends with a sole surviving player.
///
/// External listeners (stats, leaderboards) receive this through the
/// host's win sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinEvent {
    pub arena_id: ArenaId,
    pub level: LevelId,
    pub winner: PlayerId,
    pub winner_name: String,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(42).to_string(), "P-42");
        assert_eq!(ArenaId(3).to_string(), "A-3");
    }

    #[test]
    fn test_position_parse_valid_string() {
        let pos: Position = "10, 64.5,-3".parse().expect("valid position");
        assert_eq!(pos, Position::new(10.0, 64.5, -3.0));
    }

    #[test]
    fn test_position_parse_wrong_arity_fails() {
        assert!("1,2".parse::<Position>().is_err());
        assert!("1,2,3,4".parse::<Position>().is_err());
    }

    #[test]
    fn test_position_parse_non_numeric_fails() {
        let err = "a,b,c".parse::<Position>().unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessage(_)));
    }

    #[test]
    fn test_position_parse_rejects_nan() {
        assert!("NaN,1,1".parse::<Position>().is_err());
    }

    #[test]
    fn test_position_display_parses_back() {
        let pos = Position::new(1.5, 70.0, -8.25);
        let parsed: Position = pos.to_string().parse().expect("parse");
        assert_eq!(parsed, pos);
    }

    #[test]
    fn test_position_distance() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        assert!((a.distance(&b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_position_same_block_floors_components() {
        let sign = Position::new(5.0, 64.0, -2.0);
        assert!(sign.same_block(&Position::new(5.9, 64.2, -1.5)));
        assert!(!sign.same_block(&Position::new(6.0, 64.0, -2.0)));
        assert!(!sign.same_block(&Position::new(5.0, 64.0, -2.1)));
    }

    #[test]
    fn test_notice_text_reads_title() {
        assert_eq!(Notice::title("Game Started!").text(), "Game Started!");
        assert_eq!(Notice::Popup("x".into()).text(), "x");
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_level_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&LevelId::from("world")).expect("encode");
        assert_eq!(json, r#""world""#);
    }
}
