//! Arena descriptor, validation, and the phase state machine.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use skyforge_protocol::{LevelId, Location, Position};

use crate::ConfigError;

// ---------------------------------------------------------------------------
// ArenaData
// ---------------------------------------------------------------------------

/// The raw arena descriptor as operators write it.
///
/// Every field is optional because this is also what a half-configured
/// arena looks like while someone is still setting it up. [`validate`]
/// turns it into an [`ArenaConfig`] or explains what is missing.
///
/// ```json
/// {
///   "level": "sw-islands",
///   "slots": 2,
///   "spawns": ["0,64,0", "20,64,20"],
///   "joinsign": ["5,65,5", "lobby"],
///   "enabled": true
/// }
/// ```
///
/// A field holding the wrong kind of value (`"slots": "2"`, a bare string
/// where a list belongs) decodes as absent, so the descriptor still loads
/// and [`validate`] reports it.
///
/// [`validate`]: ArenaData::validate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaData {
    /// Name of the level the round is played in.
    #[serde(deserialize_with = "lenient")]
    pub level: Option<String>,
    /// Number of player slots. Signed so a negative value in the file is
    /// reported as invalid instead of failing to parse.
    #[serde(deserialize_with = "lenient")]
    pub slots: Option<i64>,
    /// One `"x,y,z"` position per slot, slot 1 first.
    #[serde(deserialize_with = "lenient")]
    pub spawns: Option<Vec<String>>,
    /// `["x,y,z", "level"]` of the sign players click to join.
    #[serde(rename = "joinsign", deserialize_with = "lenient")]
    pub join_sign: Option<Vec<String>>,
    /// Set once the descriptor has passed validation.
    #[serde(deserialize_with = "lenient_flag")]
    pub enabled: bool,
}

/// Decodes a field, turning a value of the wrong type into `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient<T> {
        Typed(Option<T>),
        Malformed(IgnoredAny),
    }

    Ok(match Lenient::<T>::deserialize(deserializer)? {
        Lenient::Typed(value) => value,
        Lenient::Malformed(_) => None,
    })
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(lenient::<D, bool>(deserializer)?.unwrap_or(false))
}

impl ArenaData {
    /// Slot count written into a fresh descriptor.
    pub const DEFAULT_SLOTS: i64 = 12;

    /// The placeholder descriptor for a brand-new arena: no level, the
    /// default slot count, no spawns, no sign, disabled.
    pub fn basic() -> Self {
        Self {
            level: None,
            slots: Some(Self::DEFAULT_SLOTS),
            spawns: Some(Vec::new()),
            join_sign: Some(Vec::new()),
            enabled: false,
        }
    }

    /// `true` if nothing at all has been configured.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Validates the descriptor.
    ///
    /// `is_generated` asks the host whether a level exists; it is the
    /// only outside input, so validation is otherwise pure and can be
    /// repeated freely. Checks run in order and the first failure wins.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] encountered.
    pub fn validate(
        &self,
        is_generated: impl Fn(&LevelId) -> bool,
    ) -> Result<ArenaConfig, ConfigError> {
        if self.is_empty() {
            return Err(ConfigError::Empty);
        }

        let level = match self.level.as_deref() {
            Some(name) if !name.trim().is_empty() => LevelId::from(name),
            _ => return Err(ConfigError::MissingLevel),
        };
        if !is_generated(&level) {
            return Err(ConfigError::LevelNotGenerated(level));
        }

        let slots = match self.slots {
            Some(n) if n > 0 => n as usize,
            other => return Err(ConfigError::InvalidSlots(other)),
        };

        let raw_spawns = self.spawns.as_ref().ok_or(ConfigError::MissingSpawns)?;
        if raw_spawns.len() != slots {
            return Err(ConfigError::SpawnCountMismatch {
                expected: slots,
                found: raw_spawns.len(),
            });
        }
        let spawns = raw_spawns
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                raw.parse::<Position>().map_err(|_| ConfigError::InvalidSpawn {
                    index: i + 1,
                    value: raw.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let join_sign = match self.join_sign.as_deref() {
            Some([pos, sign_level]) => {
                let position = pos
                    .parse::<Position>()
                    .map_err(|_| ConfigError::InvalidJoinSign)?;
                Location::new(LevelId::from(sign_level.as_str()), position)
            }
            _ => return Err(ConfigError::InvalidJoinSign),
        };

        Ok(ArenaConfig {
            level,
            slots,
            spawns,
            join_sign,
        })
    }
}

// ---------------------------------------------------------------------------
// ArenaConfig
// ---------------------------------------------------------------------------

/// A descriptor that passed validation.
///
/// Holding one means the invariants hold: `spawns.len() == slots`,
/// `slots > 0`, and the join sign is a real location.
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaConfig {
    pub level: LevelId,
    pub slots: usize,
    pub spawns: Vec<Position>,
    pub join_sign: Location,
}

impl ArenaConfig {
    /// Spawn position for a 1-based slot index.
    pub fn spawn(&self, slot: usize) -> Option<Position> {
        slot.checked_sub(1).and_then(|i| self.spawns.get(i)).copied()
    }
}

// ---------------------------------------------------------------------------
// ArenaPhase
// ---------------------------------------------------------------------------

/// The coarse lifecycle of an arena.
///
/// Transitions form a cycle and may not skip a phase:
///
/// ```text
/// Lobby → Game → Restart → Lobby
/// ```
///
/// - **Lobby**: accepting joins, players are held on their spawns.
/// - **Game**: the round is running; deaths turn players into spectators.
/// - **Restart**: the round is over and the level is about to be reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ArenaPhase {
    #[default]
    Lobby,
    Game,
    Restart,
}

impl ArenaPhase {
    /// Returns `true` if the arena accepts new players in this phase.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Lobby)
    }

    /// The only phase this one may transition to.
    pub fn next(self) -> Self {
        match self {
            Self::Lobby => Self::Game,
            Self::Game => Self::Restart,
            Self::Restart => Self::Lobby,
        }
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == target
    }
}

impl std::fmt::Display for ArenaPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::Game => write!(f, "Game"),
            Self::Restart => write!(f, "Restart"),
        }
    }
}
