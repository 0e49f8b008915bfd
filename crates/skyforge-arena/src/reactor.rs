//! Event reactor: turns host events into arena mutations.
//!
//! The host adapter forwards every player event it sees; the reactor
//! decides whether the event concerns this arena and answers with a
//! [`Reaction`] the adapter applies to the original event (cancel it,
//! suppress the death screen drops, pick a respawn point).

use skyforge_protocol::{ItemStack, LevelId, Location, PlayerId, PlayerRef, Position};
use tracing::debug;

use crate::{Arena, ArenaHost, ArenaPhase, JoinError};

/// What kind of block a player interacted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// A loot container.
    Chest,
    Sign,
    Other,
}

/// A player event reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum ArenaEvent {
    Move {
        player: PlayerId,
        to: Position,
    },
    /// Hunger or exhaustion ticking down.
    Exhaust {
        player: PlayerId,
    },
    Interact {
        player: PlayerRef,
        block: Location,
        kind: BlockKind,
    },
    Death {
        player: PlayerId,
        at: Location,
        drops: Vec<ItemStack>,
        /// The host's translated death message, if it has one.
        message: Option<String>,
    },
    Respawn {
        player: PlayerId,
    },
    Quit {
        player: PlayerId,
    },
    /// The player is moving to another level.
    LevelChange {
        player: PlayerId,
        to: LevelId,
    },
}

impl ArenaEvent {
    /// The player the event is about.
    pub fn player(&self) -> PlayerId {
        match self {
            Self::Move { player, .. }
            | Self::Exhaust { player }
            | Self::Death { player, .. }
            | Self::Respawn { player }
            | Self::Quit { player }
            | Self::LevelChange { player, .. } => *player,
            Self::Interact { player, .. } => player.id,
        }
    }
}

/// How the host should treat the original event.
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    /// Not ours, or handled with side effects only.
    Pass,
    /// Cancel the event.
    Cancel,
    /// Let the death happen but drop nothing and skip the death message;
    /// the arena already placed the drops and told everyone.
    SuppressDeath,
    /// Respawn the player here instead of the default.
    RespawnAt(Location),
}

/// Routes one event through an arena.
pub fn dispatch<H: ArenaHost>(arena: &mut Arena<H>, event: ArenaEvent) -> Reaction {
    let lobby = arena.phase() == ArenaPhase::Lobby;

    match event {
        ArenaEvent::Move { player, to } => {
            if lobby && arena.is_active(player) {
                arena.hold_on_spawn(player, &to);
            }
            Reaction::Pass
        }

        ArenaEvent::Exhaust { player } => {
            if lobby && arena.is_active(player) {
                Reaction::Cancel
            } else {
                Reaction::Pass
            }
        }

        ArenaEvent::Interact {
            player,
            block,
            kind,
        } => {
            if lobby && kind == BlockKind::Chest && arena.is_active(player.id) {
                return Reaction::Cancel;
            }
            if arena.is_join_sign(&block) {
                on_join_sign(arena, player);
            }
            Reaction::Pass
        }

        ArenaEvent::Death {
            player,
            at,
            drops,
            message,
        } => {
            if arena.mark_death(player, &at, drops, message) {
                Reaction::SuppressDeath
            } else {
                Reaction::Pass
            }
        }

        ArenaEvent::Respawn { player } => match arena.spectator_spawn() {
            Some(spawn) if arena.is_spectator(player) => Reaction::RespawnAt(spawn),
            _ => Reaction::Pass,
        },

        ArenaEvent::Quit { player } => {
            if arena.is_in_arena(player) {
                arena.leave(player);
            }
            Reaction::Pass
        }

        ArenaEvent::LevelChange { player, to } => {
            let into_arena = arena.level().is_some_and(|level| level.id == to);
            if !into_arena && arena.is_in_arena(player) {
                debug!(arena_id = %arena.id(), player_id = %player, level = %to, "player left arena level");
                arena.leave(player);
            }
            Reaction::Pass
        }
    }
}

fn on_join_sign<H: ArenaHost>(arena: &mut Arena<H>, player: PlayerRef) {
    let id = player.id;
    match arena.phase() {
        phase @ (ArenaPhase::Game | ArenaPhase::Restart) => {
            arena.notify(id, JoinError::NotJoinable(phase).notice());
        }
        ArenaPhase::Lobby => {
            if let Err(e) = arena.join(player) {
                debug!(arena_id = %arena.id(), player_id = %id, reason = %e, "sign join refused");
                arena.notify(id, e.notice());
            }
        }
    }
}
