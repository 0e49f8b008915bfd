//! The arena state machine.
//!
//! An [`Arena`] owns one descriptor, one phase, one membership registry,
//! and the host adapter it drives. Every mutation goes through `&mut self`,
//! so whoever owns the arena (normally the actor in [`crate::actor`])
//! serializes scheduler ticks and player events for free.
//!
//! # Setup mode
//!
//! An arena whose descriptor fails validation, or whose level cannot be
//! loaded, is in setup mode: joins are refused and phase transitions
//! return [`ArenaError::SetupMode`]. Setup mode is represented by the
//! absence of a loaded level, so "live arena without a level" cannot
//! exist.

use rand::Rng;
use skyforge_protocol::{
    ArenaId, GameMode, ItemStack, Level, LevelId, Location, Notice, PlayerId, PlayerRef, Position,
    WinEvent,
};
use tracing::{debug, error, info, warn};

use crate::{
    ArenaConfig, ArenaData, ArenaError, ArenaHost, ArenaPhase, ArenaView, JoinError, LootTable,
    MembershipRegistry, Participant,
};

/// Validated config plus the level the map-reset collaborator produced.
#[derive(Debug)]
struct LiveArena {
    config: ArenaConfig,
    level: Level,
}

impl LiveArena {
    fn spawn_of(&self, slot: usize) -> Location {
        let position = self.config.spawn(slot).unwrap_or(self.level.spawn);
        Location::new(self.level.id.clone(), position)
    }
}

/// One isolated minigame instance.
pub struct Arena<H: ArenaHost> {
    id: ArenaId,
    data: ArenaData,
    /// `None` exactly when the arena is in setup mode.
    live: Option<LiveArena>,
    phase: ArenaPhase,
    registry: MembershipRegistry,
    loot: LootTable,
    host: H,
}

impl<H: ArenaHost> Arena<H> {
    /// Creates an arena and tries to bring it live.
    ///
    /// Validation or level-loading failures are logged and leave the arena
    /// in setup mode; construction itself never fails. A completely empty
    /// descriptor is replaced by [`ArenaData::basic`] so operators have
    /// something to edit.
    pub fn new(id: ArenaId, data: ArenaData, host: H) -> Self {
        let mut arena = Self {
            id,
            data,
            live: None,
            phase: ArenaPhase::Lobby,
            registry: MembershipRegistry::new(0),
            loot: LootTable::default(),
            host,
        };

        if let Err(e) = arena.enable() {
            warn!(arena_id = %id, error = %e, "arena starts in setup mode");
            if arena.data.is_empty() {
                arena.data = ArenaData::basic();
            }
        }
        arena
    }

    /// Replaces the loot table used for container fills.
    pub fn with_loot_table(mut self, loot: LootTable) -> Self {
        self.loot = loot;
        self
    }

    // -----------------------------------------------------------------------
    // Configuration and setup mode
    // -----------------------------------------------------------------------

    /// Re-validates the descriptor and, if it passes, loads the level and
    /// opens the lobby.
    ///
    /// Does nothing on an arena that is already live.
    ///
    /// # Errors
    /// - [`ArenaError::Config`] if validation fails (arena stays in setup).
    /// - [`ArenaError::LevelUnavailable`] if the level cannot be loaded.
    pub fn enable(&mut self) -> Result<(), ArenaError> {
        if self.live.is_some() {
            return Ok(());
        }

        let config = match self.data.validate(|level| self.host.is_level_generated(level)) {
            Ok(config) => config,
            Err(e) => {
                self.enter_setup();
                return Err(e.into());
            }
        };
        self.data.enabled = true;

        let Some(level) = self.host.load_map(&config.level) else {
            error!(
                arena_id = %self.id,
                level = %config.level,
                "arena level wasn't found, save the level in setup mode"
            );
            self.enter_setup();
            return Err(ArenaError::LevelUnavailable(config.level));
        };

        info!(
            arena_id = %self.id,
            level = %level.id,
            slots = config.slots,
            "arena loaded"
        );
        self.registry = MembershipRegistry::new(config.slots);
        self.phase = ArenaPhase::Lobby;
        self.live = Some(LiveArena { config, level });
        Ok(())
    }

    /// Takes the arena out of play so it can be reconfigured.
    /// Everyone inside is sent home first.
    pub fn disable(&mut self) {
        self.release_all();
        self.enter_setup();
        info!(arena_id = %self.id, "arena disabled for setup");
    }

    /// Replaces the descriptor and re-validates it.
    ///
    /// # Errors
    /// - [`ArenaError::NotInSetup`] if the arena is live.
    /// - Anything [`enable`](Self::enable) returns.
    pub fn set_data(&mut self, data: ArenaData) -> Result<(), ArenaError> {
        if self.live.is_some() {
            return Err(ArenaError::NotInSetup(self.id));
        }
        self.data = ArenaData {
            enabled: false,
            ..data
        };
        self.enable()
    }

    fn enter_setup(&mut self) {
        self.live = None;
        self.data.enabled = false;
        self.phase = ArenaPhase::Lobby;
        self.registry.clear();
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Admits a player into the lobby.
    ///
    /// On success the player is teleported to their slot's spawn, has
    /// inventories cleared, health and food restored, and is put in
    /// adventure mode. Everyone in the arena is told about the join.
    ///
    /// # Errors
    /// [`JoinError::ArenaDisabled`] in setup mode,
    /// [`JoinError::NotJoinable`] outside the lobby, plus the registry's
    /// [`JoinError::AlreadyInArena`] and [`JoinError::ArenaFull`].
    pub fn join(&mut self, player: PlayerRef) -> Result<usize, JoinError> {
        let Some(live) = &self.live else {
            return Err(JoinError::ArenaDisabled);
        };
        if !self.phase.is_joinable() {
            return Err(JoinError::NotJoinable(self.phase));
        }

        let slot = self.registry.admit(player.clone())?;
        let spawn = live.spawn_of(slot);
        let slots = live.config.slots;

        self.host.teleport(player.id, &spawn);
        self.host.clear_inventories(player.id);
        self.host.set_game_mode(player.id, GameMode::Adventure);
        self.host.restore_vitals(player.id);

        let count = self.registry.active_count();
        info!(
            arena_id = %self.id,
            player_id = %player.id,
            slot,
            players = count,
            "player joined"
        );
        self.broadcast(Notice::Message(format!(
            "> {} joined the game! [{count}/{slots}]",
            player.name
        )));
        Ok(slot)
    }

    /// Removes a player from the arena and sends them home.
    ///
    /// Idempotent. The registry entry (active or spectator) is dropped if
    /// present. The reset is applied to online players who were registered
    /// here or are still standing in this arena's level; players elsewhere,
    /// including those in another arena, are left alone.
    ///
    /// Returns `true` if the player was registered.
    pub fn leave(&mut self, player: PlayerId) -> bool {
        let removed = self.registry.remove(player);
        if let Some(p) = &removed {
            info!(
                arena_id = %self.id,
                player_id = %player,
                was_active = p.is_active(),
                remaining = self.registry.active_count(),
                "player left"
            );
        }
        let present = removed.is_some() || self.is_on_arena_level(player);
        if present && self.host.is_online(player) {
            self.send_home(player);
        }
        removed.is_some()
    }

    /// Removes everyone, with the full per-player reset.
    pub fn release_all(&mut self) {
        for player in self.registry.ids() {
            self.leave(player);
        }
    }

    /// Records the death of an active participant.
    ///
    /// Their drops are placed in the world at `at` rather than kept, the
    /// role becomes spectator, and the arena is told how many remain.
    /// `death_message` is the host's already-translated message, if any.
    ///
    /// Returns `false` and does nothing if the player was not active.
    pub fn mark_death(
        &mut self,
        player: PlayerId,
        at: &Location,
        drops: Vec<ItemStack>,
        death_message: Option<String>,
    ) -> bool {
        let name = match self.registry.get(player) {
            Some(p) if p.is_active() => p.player.name.clone(),
            _ => return false,
        };

        for item in drops {
            self.host.drop_item(at, item);
        }
        self.registry.mark_spectator(player);

        let remaining = self.registry.active_count();
        info!(arena_id = %self.id, player_id = %player, remaining, "player died");

        let headline = death_message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("{name} died."));
        self.broadcast(Notice::Message(format!(
            "> {headline} [{remaining}/{}]",
            self.registry.slot_count()
        )));
        true
    }

    /// Snaps a lobby player back to their spawn if they moved more than
    /// one block away from it. Returns `true` if a teleport happened.
    pub fn hold_on_spawn(&mut self, player: PlayerId, at: &Position) -> bool {
        if self.phase != ArenaPhase::Lobby {
            return false;
        }
        let (Some(live), Some(slot)) = (&self.live, self.registry.slot_of(player)) else {
            return false;
        };
        let spawn = live.spawn_of(slot);
        if at.distance(&spawn.position) <= 1.0 {
            return false;
        }
        debug!(arena_id = %self.id, player_id = %player, "holding player on spawn");
        self.host.teleport(player, &spawn);
        true
    }

    fn is_on_arena_level(&self, player: PlayerId) -> bool {
        self.level_id()
            .is_some_and(|level| self.host.level_of(player).as_ref() == Some(level))
    }

    /// Clears the player's state and puts them at the host's default spawn.
    fn send_home(&mut self, player: PlayerId) {
        let mode = self.host.default_game_mode();
        let home = self.host.default_spawn();
        self.host.clear_effects(player);
        self.host.set_game_mode(player, mode);
        self.host.restore_vitals(player);
        self.host.clear_inventories(player);
        self.host.teleport(player, &home);
    }

    /// Sends every participant home without touching the registry.
    ///
    /// Run right before [`reload`](Self::reload) so nobody is inside the
    /// level when it is restored.
    pub fn evacuate(&mut self) {
        for player in self.registry.ids() {
            if self.host.is_online(player) {
                self.send_home(player);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Phase transitions
    // -----------------------------------------------------------------------

    fn ensure_transition(&self, to: ArenaPhase) -> Result<(), ArenaError> {
        if self.live.is_none() {
            return Err(ArenaError::SetupMode(self.id));
        }
        if !self.phase.can_transition_to(to) {
            return Err(ArenaError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        Ok(())
    }

    /// Lobby → Game.
    ///
    /// Active players switch to survival with empty inventories, every
    /// loot container in the level is filled, and a title announces the
    /// start.
    ///
    /// # Errors
    /// [`ArenaError::SetupMode`] or [`ArenaError::InvalidTransition`].
    pub fn start_game(&mut self) -> Result<(), ArenaError> {
        self.ensure_transition(ArenaPhase::Game)?;

        let active: Vec<PlayerId> = self.registry.active().map(|p| p.player.id).collect();
        for player in &active {
            self.host.set_game_mode(*player, GameMode::Survival);
            self.host.clear_inventories(*player);
        }

        self.phase = ArenaPhase::Game;
        let chests = self.fill_loot(&mut rand::rng());
        info!(
            arena_id = %self.id,
            players = active.len(),
            chests,
            "game started"
        );
        self.broadcast(Notice::title("Game Started!"));
        Ok(())
    }

    /// Refills every loot container mid-round. Returns how many were filled.
    ///
    /// # Errors
    /// [`ArenaError::SetupMode`], or [`ArenaError::InvalidTransition`] when
    /// not in the Game phase.
    pub fn refill_loot(&mut self) -> Result<usize, ArenaError> {
        if self.live.is_none() {
            return Err(ArenaError::SetupMode(self.id));
        }
        if self.phase != ArenaPhase::Game {
            return Err(ArenaError::InvalidTransition {
                from: self.phase,
                to: ArenaPhase::Game,
            });
        }
        let chests = self.fill_loot(&mut rand::rng());
        info!(arena_id = %self.id, chests, "loot refilled");
        Ok(chests)
    }

    fn fill_loot<R: Rng>(&mut self, rng: &mut R) -> usize {
        let Some(live) = &self.live else {
            return 0;
        };
        let level = &live.level.id;
        let containers = self.host.loot_containers(level);
        for at in &containers {
            let contents = self.loot.fill(rng);
            self.host.set_container_contents(level, *at, &contents);
        }
        containers.len()
    }

    /// Game → Restart.
    ///
    /// If exactly one active participant remains and is online they are
    /// the winner: they get a victory title, the win sink gets a
    /// [`WinEvent`], and the whole server hears about it. Any other
    /// outcome is a round without a winner. Either way the arena enters
    /// Restart.
    ///
    /// Returns the winner, if any.
    ///
    /// # Errors
    /// [`ArenaError::SetupMode`] or [`ArenaError::InvalidTransition`].
    pub fn start_restart(&mut self) -> Result<Option<PlayerRef>, ArenaError> {
        self.ensure_transition(ArenaPhase::Restart)?;

        let mut active = self.registry.active();
        let sole = match (active.next(), active.next()) {
            (Some(p), None) => Some(p.player.clone()),
            _ => None,
        };
        let winner = sole.filter(|p| self.host.is_online(p.id));

        self.phase = ArenaPhase::Restart;

        let Some(winner) = winner else {
            info!(arena_id = %self.id, "round ended without a winner");
            return Ok(None);
        };

        let level = self.level_id().cloned().unwrap_or_else(|| LevelId::from("?"));
        self.host.send(winner.id, &Notice::title("YOU WON!"));
        self.host.on_win(&WinEvent {
            arena_id: self.id,
            level: level.clone(),
            winner: winner.id,
            winner_name: winner.name.clone(),
        });
        self.host.broadcast_server(&format!(
            "Player {} has won the game at {level}!",
            winner.name
        ));
        info!(arena_id = %self.id, player_id = %winner.id, "round won");
        Ok(Some(winner))
    }

    /// Restart → Lobby.
    ///
    /// Restores the level through the map-reset collaborator and empties
    /// the registry in one go (no per-player reset; see
    /// [`evacuate`](Self::evacuate)). If the level cannot be restored the
    /// arena drops into setup mode.
    ///
    /// # Errors
    /// [`ArenaError::SetupMode`], [`ArenaError::InvalidTransition`], or
    /// [`ArenaError::LevelUnavailable`].
    pub fn reload(&mut self) -> Result<(), ArenaError> {
        self.ensure_transition(ArenaPhase::Lobby)?;

        self.registry.clear();
        self.phase = ArenaPhase::Lobby;

        let Some(level_id) = self.live.as_ref().map(|l| l.config.level.clone()) else {
            return Err(ArenaError::SetupMode(self.id));
        };
        match self.host.load_map(&level_id) {
            Some(level) => {
                if let Some(live) = self.live.as_mut() {
                    live.level = level;
                }
                info!(arena_id = %self.id, level = %level_id, "arena reloaded");
                Ok(())
            }
            None => {
                error!(
                    arena_id = %self.id,
                    level = %level_id,
                    "arena level wasn't found on reload, entering setup mode"
                );
                self.enter_setup();
                Err(ArenaError::LevelUnavailable(level_id))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn id(&self) -> ArenaId {
        self.id
    }

    pub fn phase(&self) -> ArenaPhase {
        self.phase
    }

    pub fn is_setup(&self) -> bool {
        self.live.is_none()
    }

    pub fn data(&self) -> &ArenaData {
        &self.data
    }

    /// The validated config, `None` in setup mode.
    pub fn config(&self) -> Option<&ArenaConfig> {
        self.live.as_ref().map(|l| &l.config)
    }

    /// The currently loaded level, `None` in setup mode.
    pub fn level(&self) -> Option<&Level> {
        self.live.as_ref().map(|l| &l.level)
    }

    fn level_id(&self) -> Option<&LevelId> {
        self.level().map(|l| &l.id)
    }

    pub fn registry(&self) -> &MembershipRegistry {
        &self.registry
    }

    pub fn is_active(&self, player: PlayerId) -> bool {
        self.registry.is_active(player)
    }

    pub fn is_spectator(&self, player: PlayerId) -> bool {
        self.registry.is_spectator(player)
    }

    pub fn is_in_arena(&self, player: PlayerId) -> bool {
        self.registry.is_in_arena(player)
    }

    /// Active participants and spectators together.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.registry.all()
    }

    /// The round is over once at most one active participant is left.
    pub fn check_end(&self) -> bool {
        self.registry.active_count() <= 1
    }

    /// `true` if `at` is this arena's join sign.
    pub fn is_join_sign(&self, at: &Location) -> bool {
        self.live.as_ref().is_some_and(|live| {
            let sign = &live.config.join_sign;
            sign.level == at.level && sign.position.same_block(&at.position)
        })
    }

    /// Where spectators respawn: the arena level's own spawn.
    pub fn spectator_spawn(&self) -> Option<Location> {
        self.level().map(Level::spawn_location)
    }

    /// What the arena clock needs to decide on its next action.
    pub fn view(&self) -> ArenaView {
        ArenaView {
            phase: self.phase,
            setup: self.is_setup(),
            active: self.registry.active_count(),
            check_end: self.check_end(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    // -----------------------------------------------------------------------
    // Messaging
    // -----------------------------------------------------------------------

    /// Shows a notice to every participant, active or spectating.
    pub fn broadcast(&mut self, notice: Notice) {
        for player in self.registry.all() {
            self.host.send(player.player.id, &notice);
        }
    }

    /// Shows a notice to a single player.
    pub fn notify(&mut self, player: PlayerId, notice: Notice) {
        self.host.send(player, &notice);
    }
}
