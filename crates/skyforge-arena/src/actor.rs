//! Arena actor: an isolated Tokio task that owns one [`Arena`].
//!
//! Each arena runs in its own task, communicating with the outside world
//! through an mpsc channel. Scheduler ticks and player events are both
//! handled inside the same `select!` loop, so they never interleave in
//! the middle of a mutation.

use serde::{Deserialize, Serialize};
use skyforge_protocol::{ArenaId, LevelId, PlayerId, PlayerRef};
use skyforge_tick::{TickConfig, TickScheduler};
use tokio::sync::{mpsc, oneshot};

use crate::reactor::{self, ArenaEvent, Reaction};
use crate::{
    Arena, ArenaClock, ArenaData, ArenaError, ArenaHost, ArenaPhase, ClockAction, ClockConfig,
    JoinError, LootTable, Role,
};

/// Default command channel size for arena actors.
pub const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Everything an arena actor is configured with besides its descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    pub clock: ClockConfig,
    pub tick: TickConfig,
    pub loot: LootTable,
    /// Bounded command channel capacity; senders wait when it is full.
    pub channel_size: usize,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            clock: ClockConfig::default(),
            tick: TickConfig::default(),
            loot: LootTable::default(),
            channel_size: DEFAULT_CHANNEL_SIZE,
        }
    }
}

/// A phase transition requested from outside the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    StartGame,
    StartRestart,
    Reload,
}

/// Commands sent to an arena actor through its channel.
///
/// The `oneshot::Sender` in each variant is the reply channel: the caller
/// sends a command and waits for the response on it.
pub(crate) enum ArenaCommand {
    Join {
        player: PlayerRef,
        reply: oneshot::Sender<Result<usize, JoinError>>,
    },
    Leave {
        player: PlayerId,
        reply: oneshot::Sender<bool>,
    },
    Event {
        event: ArenaEvent,
        reply: oneshot::Sender<Reaction>,
    },
    Membership {
        player: PlayerId,
        reply: oneshot::Sender<Option<Role>>,
    },
    Info {
        reply: oneshot::Sender<ArenaInfo>,
    },
    Transition {
        to: Transition,
        reply: oneshot::Sender<Result<(), ArenaError>>,
    },
    Enable {
        reply: oneshot::Sender<Result<(), ArenaError>>,
    },
    Disable {
        reply: oneshot::Sender<()>,
    },
    SetData {
        data: ArenaData,
        reply: oneshot::Sender<Result<(), ArenaError>>,
    },
    /// Advance the clock once, outside the scheduler.
    Tick {
        reply: oneshot::Sender<()>,
    },
    Shutdown,
}

/// A snapshot of arena metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaInfo {
    pub arena_id: ArenaId,
    pub phase: ArenaPhase,
    pub setup: bool,
    /// `None` in setup mode.
    pub level: Option<LevelId>,
    pub active: usize,
    pub spectators: usize,
    pub slots: usize,
    pub check_end: bool,
}

impl ArenaInfo {
    /// Lobby, live, and with a free slot.
    pub fn is_joinable(&self) -> bool {
        !self.setup && self.phase.is_joinable() && self.active < self.slots
    }
}

/// Handle to a running arena actor.
///
/// Cheap to clone; it is just an `mpsc::Sender` wrapper. The
/// [`ArenaManager`](crate::ArenaManager) holds one per arena.
#[derive(Clone)]
pub struct ArenaHandle {
    arena_id: ArenaId,
    sender: mpsc::Sender<ArenaCommand>,
}

impl ArenaHandle {
    pub fn arena_id(&self) -> ArenaId {
        self.arena_id
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> ArenaCommand,
    ) -> Result<T, ArenaError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| ArenaError::Unavailable(self.arena_id))?;
        reply_rx
            .await
            .map_err(|_| ArenaError::Unavailable(self.arena_id))
    }

    /// Admits a player. Returns the assigned slot.
    pub async fn join(&self, player: PlayerRef) -> Result<usize, ArenaError> {
        Ok(self
            .request(|reply| ArenaCommand::Join { player, reply })
            .await??)
    }

    /// Removes a player. Returns `true` if they were registered.
    pub async fn leave(&self, player: PlayerId) -> Result<bool, ArenaError> {
        self.request(|reply| ArenaCommand::Leave { player, reply })
            .await
    }

    /// Routes a host event through the arena's reactor.
    pub async fn dispatch(&self, event: ArenaEvent) -> Result<Reaction, ArenaError> {
        self.request(|reply| ArenaCommand::Event { event, reply })
            .await
    }

    /// The player's role here, `None` if they are not in this arena.
    pub async fn membership(&self, player: PlayerId) -> Result<Option<Role>, ArenaError> {
        self.request(|reply| ArenaCommand::Membership { player, reply })
            .await
    }

    pub async fn info(&self) -> Result<ArenaInfo, ArenaError> {
        self.request(|reply| ArenaCommand::Info { reply }).await
    }

    /// `true` once at most one active participant remains.
    pub async fn check_end(&self) -> Result<bool, ArenaError> {
        Ok(self.info().await?.check_end)
    }

    pub async fn start_game(&self) -> Result<(), ArenaError> {
        self.transition(Transition::StartGame).await
    }

    pub async fn start_restart(&self) -> Result<(), ArenaError> {
        self.transition(Transition::StartRestart).await
    }

    /// Sends everyone home and restores the level.
    pub async fn reload(&self) -> Result<(), ArenaError> {
        self.transition(Transition::Reload).await
    }

    async fn transition(&self, to: Transition) -> Result<(), ArenaError> {
        self.request(|reply| ArenaCommand::Transition { to, reply })
            .await?
    }

    /// Re-validates the descriptor of an arena in setup mode.
    pub async fn enable(&self) -> Result<(), ArenaError> {
        self.request(|reply| ArenaCommand::Enable { reply }).await?
    }

    /// Sends everyone home and puts the arena into setup mode.
    pub async fn disable(&self) -> Result<(), ArenaError> {
        self.request(|reply| ArenaCommand::Disable { reply }).await
    }

    /// Replaces the descriptor of an arena in setup mode.
    pub async fn set_data(&self, data: ArenaData) -> Result<(), ArenaError> {
        self.request(|reply| ArenaCommand::SetData { data, reply })
            .await?
    }

    /// Advances the arena clock by one tick and waits for it to apply.
    pub async fn tick(&self) -> Result<(), ArenaError> {
        self.request(|reply| ArenaCommand::Tick { reply }).await
    }

    /// Tells the arena to release its players and stop.
    pub async fn shutdown(&self) -> Result<(), ArenaError> {
        self.sender
            .send(ArenaCommand::Shutdown)
            .await
            .map_err(|_| ArenaError::Unavailable(self.arena_id))
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct ArenaActor<H: ArenaHost> {
    arena: Arena<H>,
    clock: ArenaClock,
    scheduler: TickScheduler,
    receiver: mpsc::Receiver<ArenaCommand>,
}

impl<H: ArenaHost> ArenaActor<H> {
    /// Runs the actor loop until shutdown or until every handle is gone.
    async fn run(mut self) {
        let arena_id = self.arena.id();
        tracing::info!(%arena_id, setup = self.arena.is_setup(), "arena actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
                _ = self.scheduler.wait_for_tick() => {
                    self.on_tick();
                    self.scheduler.record_tick_end();
                }
            }
        }

        self.arena.release_all();
        tracing::info!(%arena_id, "arena actor stopped");
    }

    /// Returns `false` when the actor should stop.
    fn handle_command(&mut self, cmd: ArenaCommand) -> bool {
        match cmd {
            ArenaCommand::Join { player, reply } => {
                let _ = reply.send(self.arena.join(player));
            }
            ArenaCommand::Leave { player, reply } => {
                let _ = reply.send(self.arena.leave(player));
            }
            ArenaCommand::Event { event, reply } => {
                let _ = reply.send(reactor::dispatch(&mut self.arena, event));
            }
            ArenaCommand::Membership { player, reply } => {
                let _ = reply.send(self.arena.registry().role(player));
            }
            ArenaCommand::Info { reply } => {
                let _ = reply.send(self.info());
            }
            ArenaCommand::Transition { to, reply } => {
                let result = match to {
                    Transition::StartGame => self.arena.start_game(),
                    Transition::StartRestart => self.arena.start_restart().map(|_| ()),
                    Transition::Reload => self.reload(),
                };
                let _ = reply.send(result);
            }
            ArenaCommand::Enable { reply } => {
                let _ = reply.send(self.arena.enable());
            }
            ArenaCommand::Disable { reply } => {
                self.arena.disable();
                let _ = reply.send(());
            }
            ArenaCommand::SetData { data, reply } => {
                let _ = reply.send(self.arena.set_data(data));
            }
            ArenaCommand::Tick { reply } => {
                self.on_tick();
                let _ = reply.send(());
            }
            ArenaCommand::Shutdown => {
                tracing::info!(arena_id = %self.arena.id(), "arena shutting down");
                return false;
            }
        }
        true
    }

    fn on_tick(&mut self) {
        let actions = self.clock.advance(&self.arena.view());
        for action in actions {
            self.apply(action);
        }
    }

    fn apply(&mut self, action: ClockAction) {
        let arena_id = self.arena.id();
        let result = match action {
            ClockAction::Broadcast(notice) => {
                self.arena.broadcast(notice);
                Ok(())
            }
            ClockAction::StartGame => self.arena.start_game(),
            ClockAction::RefillLoot => self.arena.refill_loot().map(|_| ()),
            ClockAction::StartRestart => self.arena.start_restart().map(|_| ()),
            ClockAction::Reload => self.reload(),
        };
        if let Err(e) = result {
            tracing::warn!(%arena_id, error = %e, "clock action failed");
        }
    }

    fn reload(&mut self) -> Result<(), ArenaError> {
        if self.arena.phase() == ArenaPhase::Restart {
            self.arena.evacuate();
        }
        self.arena.reload()
    }

    fn info(&self) -> ArenaInfo {
        let registry = self.arena.registry();
        ArenaInfo {
            arena_id: self.arena.id(),
            phase: self.arena.phase(),
            setup: self.arena.is_setup(),
            level: self.arena.level().map(|l| l.id.clone()),
            active: registry.active_count(),
            spectators: registry.spectator_count(),
            slots: registry.slot_count(),
            check_end: self.arena.check_end(),
        }
    }
}

/// Builds an arena, spawns its actor task, and returns a handle to it.
///
/// The arena is validated and its level loaded before the task starts;
/// failures leave it in setup mode rather than failing the spawn.
pub fn spawn_arena<H: ArenaHost>(
    arena_id: ArenaId,
    data: ArenaData,
    host: H,
    settings: ArenaSettings,
) -> ArenaHandle {
    let (tx, rx) = mpsc::channel(settings.channel_size.max(1));

    let arena = Arena::new(arena_id, data, host).with_loot_table(settings.loot);
    let actor = ArenaActor {
        arena,
        clock: ArenaClock::new(settings.clock),
        scheduler: TickScheduler::new(settings.tick),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    ArenaHandle {
        arena_id,
        sender: tx,
    }
}
