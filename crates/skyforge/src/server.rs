//! `Skyforge` builder and the shared engine handle.
//!
//! This is the entry point for a host adapter. It owns the arena manager
//! and the codec used for arena descriptors, and routes the host's player
//! events to every arena.

use std::sync::Arc;

use skyforge_arena::{
    ArenaData, ArenaEvent, ArenaHandle, ArenaHost, ArenaInfo, ArenaManager, ArenaSettings,
    ClockConfig, LootTable, Reaction, route_event,
};
use skyforge_protocol::{ArenaId, Codec, JsonCodec, PlayerId, PlayerRef};
use skyforge_tick::TickConfig;
use tokio::sync::Mutex;

use crate::SkyforgeError;

/// State shared by every clone of a [`Skyforge`].
struct EngineState<C: Codec> {
    arenas: Mutex<ArenaManager>,
    codec: C,
}

/// Builder for configuring a Skyforge engine.
///
/// # Example
///
/// ```rust
/// use skyforge::prelude::*;
///
/// let skyforge = Skyforge::builder()
///     .clock(ClockConfig { lobby_countdown: 20, ..ClockConfig::default() })
///     .tick(TickConfig::with_rate(1))
///     .build();
/// # drop(skyforge);
/// ```
pub struct SkyforgeBuilder {
    settings: ArenaSettings,
}

impl SkyforgeBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            settings: ArenaSettings::default(),
        }
    }

    /// Sets every arena setting at once.
    pub fn settings(mut self, settings: ArenaSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the lobby, round, and restart countdowns.
    pub fn clock(mut self, clock: ClockConfig) -> Self {
        self.settings.clock = clock;
        self
    }

    /// Sets the scheduler cadence. Rates above the scheduler's maximum
    /// are clamped.
    pub fn tick(mut self, tick: TickConfig) -> Self {
        self.settings.tick = tick;
        self
    }

    /// Sets the table used to fill loot containers.
    pub fn loot(mut self, loot: LootTable) -> Self {
        self.settings.loot = loot;
        self
    }

    /// Sets the command channel size of each arena actor.
    pub fn channel_size(mut self, size: usize) -> Self {
        self.settings.channel_size = size;
        self
    }

    /// Builds the engine with the JSON descriptor codec.
    pub fn build(self) -> Skyforge {
        self.build_with_codec(JsonCodec)
    }

    /// Builds the engine with a custom descriptor codec.
    pub fn build_with_codec<C: Codec>(self, codec: C) -> Skyforge<C> {
        tracing::debug!(
            tick_rate_hz = self.settings.tick.tick_rate_hz,
            min_players = self.settings.clock.min_players,
            "skyforge engine built"
        );
        Skyforge {
            state: Arc::new(EngineState {
                arenas: Mutex::new(ArenaManager::new(self.settings)),
                codec,
            }),
        }
    }
}

impl Default for SkyforgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Skyforge engine. Cheap to clone; clones share the arenas.
///
/// Must be used inside a Tokio runtime: every arena is a task.
pub struct Skyforge<C: Codec = JsonCodec> {
    state: Arc<EngineState<C>>,
}

impl<C: Codec> Clone for Skyforge<C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl Skyforge {
    /// Creates a new builder.
    pub fn builder() -> SkyforgeBuilder {
        SkyforgeBuilder::new()
    }
}

impl<C: Codec> Skyforge<C> {
    /// Decodes an arena descriptor and starts an arena from it.
    ///
    /// A descriptor that decodes but fails validation still yields an
    /// arena, in setup mode.
    ///
    /// # Errors
    /// [`SkyforgeError::Protocol`] if the bytes are not a descriptor.
    pub async fn load_arena<H: ArenaHost>(
        &self,
        raw: &[u8],
        host: H,
    ) -> Result<ArenaId, SkyforgeError> {
        let data: ArenaData = self.state.codec.decode(raw)?;
        Ok(self.create_arena(data, host).await)
    }

    /// Encodes a descriptor the same way [`load_arena`](Self::load_arena)
    /// reads it.
    pub fn save_arena(&self, data: &ArenaData) -> Result<Vec<u8>, SkyforgeError> {
        Ok(self.state.codec.encode(data)?)
    }

    /// Starts an arena from an already-decoded descriptor.
    pub async fn create_arena<H: ArenaHost>(&self, data: ArenaData, host: H) -> ArenaId {
        self.state.arenas.lock().await.create_arena(data, host)
    }

    /// Joins a player to an arena, at most one arena per player.
    /// Returns the assigned slot.
    pub async fn join(&self, player: PlayerRef, arena_id: ArenaId) -> Result<usize, SkyforgeError> {
        let arenas = self.state.arenas.lock().await;
        Ok(arenas.join_arena(player, arena_id).await?)
    }

    /// Takes a player out of whatever arena holds them.
    pub async fn leave(&self, player: PlayerId) -> Result<Option<ArenaId>, SkyforgeError> {
        let arenas = self.state.arenas.lock().await;
        Ok(arenas.leave(player).await?)
    }

    /// Routes a host event to the arenas and returns what the host should
    /// do with it.
    ///
    /// The engine lock is held only while the arena handles are collected,
    /// so events for different arenas never wait on each other.
    pub async fn dispatch(&self, event: ArenaEvent) -> Reaction {
        let handles = self.state.arenas.lock().await.handles();
        route_event(&handles, event).await
    }

    /// Arenas that currently accept players.
    pub async fn arenas(&self) -> Vec<ArenaInfo> {
        self.state.arenas.lock().await.list_arenas().await
    }

    pub async fn arena_info(&self, arena_id: ArenaId) -> Result<ArenaInfo, SkyforgeError> {
        let arenas = self.state.arenas.lock().await;
        Ok(arenas.arena_info(arena_id).await?)
    }

    /// A direct handle to one arena, for admin commands.
    pub async fn handle(&self, arena_id: ArenaId) -> Option<ArenaHandle> {
        self.state.arenas.lock().await.handle(arena_id)
    }

    pub async fn destroy_arena(&self, arena_id: ArenaId) -> Result<(), SkyforgeError> {
        let mut arenas = self.state.arenas.lock().await;
        Ok(arenas.destroy_arena(arena_id).await?)
    }

    /// Stops every arena; their players are sent home.
    pub async fn shutdown(&self) {
        tracing::info!("skyforge shutting down");
        self.state.arenas.lock().await.shutdown_all().await;
    }
}
