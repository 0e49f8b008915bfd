//! Error types for the arena layer.
//!
//! Three enums, split by who ends up reading them:
//! - [`ConfigError`]: why a descriptor failed validation (operators).
//! - [`JoinError`]: why a join was refused (the joining player).
//! - [`ArenaError`]: everything an arena operation can refuse with.

use skyforge_protocol::{ArenaId, LevelId, Notice, PlayerId};

use crate::ArenaPhase;

/// Reasons an arena descriptor fails validation.
///
/// Any of these puts the arena into setup mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("arena data is empty")]
    Empty,

    #[error("arena level is not set")]
    MissingLevel,

    /// The host has never generated (or can no longer find) the level.
    #[error("level {0} is not generated")]
    LevelNotGenerated(LevelId),

    #[error("slot count must be a positive integer, got {0:?}")]
    InvalidSlots(Option<i64>),

    #[error("no spawns configured")]
    MissingSpawns,

    #[error("expected {expected} spawns, found {found}")]
    SpawnCountMismatch { expected: usize, found: usize },

    #[error("spawn {index} is not a valid position: {value:?}")]
    InvalidSpawn { index: usize, value: String },

    /// The join sign must be exactly `["x,y,z", "level"]`.
    #[error("join sign must be a (position, level) pair")]
    InvalidJoinSign,
}

/// Reasons a join request is refused.
///
/// None of these are fatal; the player just gets told why.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    /// Arena is in setup mode.
    #[error("arena is under setup")]
    ArenaDisabled,

    #[error("arena is full")]
    ArenaFull,

    #[error("player {0} is already in game")]
    AlreadyInArena(PlayerId),

    /// The round has already started (or is restarting).
    #[error("arena is not joinable during {0}")]
    NotJoinable(ArenaPhase),
}

impl JoinError {
    /// The refusal shown to the player who tried to join.
    pub fn notice(&self) -> Notice {
        let text = match self {
            Self::ArenaDisabled => "> Arena is under setup!",
            Self::ArenaFull => "> Arena is full!",
            Self::AlreadyInArena(_) => "> You are already in game!",
            Self::NotJoinable(ArenaPhase::Restart) => "> Arena is restarting!",
            Self::NotJoinable(_) => "> Arena is in-game",
        };
        Notice::Message(text.to_string())
    }
}

/// Errors from arena operations.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    /// The descriptor failed validation; the arena is in setup mode.
    #[error("invalid arena config: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Join(#[from] JoinError),

    /// Gameplay operations are refused while the arena is in setup mode.
    #[error("arena {0} is in setup mode")]
    SetupMode(ArenaId),

    /// Transitions follow Lobby → Game → Restart → Lobby with no skipping.
    #[error("cannot transition from {from} to {to}")]
    InvalidTransition { from: ArenaPhase, to: ArenaPhase },

    /// The map-reset collaborator could not produce the level.
    /// The arena has been put into setup mode.
    #[error("level {0} could not be loaded")]
    LevelUnavailable(LevelId),

    /// The operation is only allowed while in setup mode.
    #[error("arena {0} is live, enter setup mode first")]
    NotInSetup(ArenaId),

    #[error("arena {0} not found")]
    NotFound(ArenaId),

    /// The arena actor's command channel is full or closed.
    #[error("arena {0} is unavailable")]
    Unavailable(ArenaId),
}
