//! Arena lifecycle management for Skyforge.
//!
//! Each arena cycles Lobby → Game → Restart → Lobby, runs as an isolated
//! Tokio task (actor model), and talks to the game server only through
//! the traits in [`host`].
//!
//! # Key types
//!
//! - [`Arena`]: the state machine for a single arena
//! - [`ArenaHost`]: what a host adapter implements
//! - [`ArenaManager`]: creates/destroys arenas, routes players and events
//! - [`ArenaHandle`]: send commands to a running arena actor
//! - [`ArenaClock`]: lobby, round, and restart countdowns
//! - [`ArenaData`]: the operator-facing descriptor

mod actor;
mod arena;
mod clock;
mod config;
mod error;
pub mod host;
mod loot;
mod manager;
pub mod reactor;
mod registry;

pub use actor::{spawn_arena, ArenaHandle, ArenaInfo, ArenaSettings, DEFAULT_CHANNEL_SIZE};
pub use arena::Arena;
pub use clock::{format_clock, ArenaClock, ArenaView, ClockAction, ClockConfig};
pub use config::{ArenaConfig, ArenaData, ArenaPhase};
pub use error::{ArenaError, ConfigError, JoinError};
pub use host::{ArenaHost, MapReset, WinSink, WorldHost};
pub use loot::{ChestContents, LootCategory, LootPool, LootTable, CHEST_SLOTS};
pub use manager::{route_event, ArenaManager};
pub use reactor::{ArenaEvent, BlockKind, Reaction};
pub use registry::{MembershipRegistry, Participant, Role};
