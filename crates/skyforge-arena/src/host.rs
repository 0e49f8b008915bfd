//! The host boundary: everything the arena asks of the game server.
//!
//! The arena core never touches a real world. It calls into three small
//! traits that a host adapter implements:
//!
//! - [`WorldHost`]: player and world primitives (teleport, inventories,
//!   notifications, containers).
//! - [`MapReset`]: materializes a fresh copy of the arena's level.
//! - [`WinSink`]: receives a structured event when a round has a winner.
//!
//! [`ArenaHost`] bundles all three and is implemented automatically for
//! any type that implements them, so adapters only write the three impls.

use skyforge_protocol::{
    GameMode, ItemStack, Level, LevelId, Location, Notice, PlayerId, Position, WinEvent,
};

use crate::ChestContents;

/// Player and world primitives provided by the host game server.
///
/// Methods take `PlayerId`s; the adapter resolves them to live players.
/// Calls for players that are offline should be silently ignored.
pub trait WorldHost: Send + 'static {
    /// Whether the host has a generated level with this name.
    fn is_level_generated(&self, level: &LevelId) -> bool;

    /// Whether the player is currently connected.
    fn is_online(&self, player: PlayerId) -> bool;

    /// The level the player is standing in, `None` if they are offline.
    fn level_of(&self, player: PlayerId) -> Option<LevelId>;

    fn teleport(&mut self, player: PlayerId, to: &Location);

    fn set_game_mode(&mut self, player: PlayerId, mode: GameMode);

    /// The mode players get when they leave an arena.
    fn default_game_mode(&self) -> GameMode;

    /// Sets health and food back to full.
    fn restore_vitals(&mut self, player: PlayerId);

    /// Clears main inventory, armor, and the held/cursor item.
    fn clear_inventories(&mut self, player: PlayerId);

    fn clear_effects(&mut self, player: PlayerId);

    /// Spawn of the host's default level, where departing players go.
    fn default_spawn(&self) -> Location;

    /// Shows a notice to one player.
    fn send(&mut self, player: PlayerId, notice: &Notice);

    /// Sends a chat message to everyone on the server.
    fn broadcast_server(&mut self, message: &str);

    /// Positions of every loot container (chest) in the level.
    fn loot_containers(&self, level: &LevelId) -> Vec<Position>;

    /// Replaces the contents of the container at `at`.
    fn set_container_contents(&mut self, level: &LevelId, at: Position, contents: &ChestContents);

    /// Drops an item entity into the world.
    fn drop_item(&mut self, at: &Location, item: ItemStack);
}

/// Restores the arena's level from its saved snapshot.
pub trait MapReset: Send + 'static {
    /// Loads (or reloads) the level. `None` means the level or its
    /// snapshot could not be found.
    fn load_map(&mut self, level: &LevelId) -> Option<Level>;
}

/// Receives win notifications for stats, leaderboards, and the like.
pub trait WinSink: Send + 'static {
    fn on_win(&mut self, event: &WinEvent);
}

/// Everything an [`Arena`](crate::Arena) needs from its host.
pub trait ArenaHost: WorldHost + MapReset + WinSink {}

impl<T: WorldHost + MapReset + WinSink> ArenaHost for T {}
