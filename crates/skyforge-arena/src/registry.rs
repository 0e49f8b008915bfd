//! Membership registry: who is in the arena and in what role.
//!
//! Each participant has exactly one [`Role`] stored on their entry, so a
//! player can never be both active and spectating. The "active set" and
//! "spectator set" are views over that single map, not separate
//! collections that have to be kept in sync.

use std::collections::HashMap;

use skyforge_protocol::{PlayerId, PlayerRef};

use crate::JoinError;

/// A participant's role. Absence from the registry is "not in arena".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Competing, holding a 1-based spawn slot.
    Active { slot: usize },
    /// Died this round; watching until the arena resets.
    Spectator,
}

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub player: PlayerRef,
    pub role: Role,
}

impl Participant {
    pub fn is_active(&self) -> bool {
        matches!(self.role, Role::Active { .. })
    }

    /// The held slot, `None` for spectators.
    pub fn slot(&self) -> Option<usize> {
        match self.role {
            Role::Active { slot } => Some(slot),
            Role::Spectator => None,
        }
    }
}

/// Tracks participants of a single arena, keyed by stable player id.
#[derive(Debug, Clone, Default)]
pub struct MembershipRegistry {
    slot_count: usize,
    participants: HashMap<PlayerId, Participant>,
}

impl MembershipRegistry {
    /// Creates an empty registry with `slot_count` spawn slots.
    pub fn new(slot_count: usize) -> Self {
        Self {
            slot_count,
            participants: HashMap::new(),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Admits a player as active and assigns the lowest free slot.
    ///
    /// Slots are scanned `1..=slot_count` in order; the first one not held
    /// by an active participant is taken. Selection and insertion happen
    /// in one `&mut self` call, so two joins can never pick the same slot.
    ///
    /// # Errors
    /// - [`JoinError::AlreadyInArena`] if the player has any role.
    /// - [`JoinError::ArenaFull`] if every slot is held.
    pub fn admit(&mut self, player: PlayerRef) -> Result<usize, JoinError> {
        if self.participants.contains_key(&player.id) {
            return Err(JoinError::AlreadyInArena(player.id));
        }
        if self.active_count() >= self.slot_count {
            return Err(JoinError::ArenaFull);
        }

        let slot = (1..=self.slot_count)
            .find(|slot| !self.is_slot_taken(*slot))
            .ok_or(JoinError::ArenaFull)?;

        self.participants.insert(
            player.id,
            Participant {
                player,
                role: Role::Active { slot },
            },
        );
        Ok(slot)
    }

    /// Removes a participant in any role, releasing their slot.
    /// Returns the removed entry, or `None` if they were not registered.
    pub fn remove(&mut self, player: PlayerId) -> Option<Participant> {
        self.participants.remove(&player)
    }

    /// Turns an active participant into a spectator, releasing the slot.
    ///
    /// Returns the slot that was released, or `None` (and changes nothing)
    /// if the player was not active. There is no way back to active short
    /// of [`clear`](Self::clear).
    pub fn mark_spectator(&mut self, player: PlayerId) -> Option<usize> {
        let participant = self.participants.get_mut(&player)?;
        let slot = participant.slot()?;
        participant.role = Role::Spectator;
        Some(slot)
    }

    /// Drops every participant. Used by the round reset.
    pub fn clear(&mut self) {
        self.participants.clear();
    }

    pub fn get(&self, player: PlayerId) -> Option<&Participant> {
        self.participants.get(&player)
    }

    pub fn role(&self, player: PlayerId) -> Option<Role> {
        self.participants.get(&player).map(|p| p.role)
    }

    pub fn slot_of(&self, player: PlayerId) -> Option<usize> {
        self.participants.get(&player).and_then(Participant::slot)
    }

    pub fn is_active(&self, player: PlayerId) -> bool {
        matches!(self.role(player), Some(Role::Active { .. }))
    }

    pub fn is_spectator(&self, player: PlayerId) -> bool {
        matches!(self.role(player), Some(Role::Spectator))
    }

    pub fn is_in_arena(&self, player: PlayerId) -> bool {
        self.participants.contains_key(&player)
    }

    fn is_slot_taken(&self, slot: usize) -> bool {
        self.participants
            .values()
            .any(|p| p.role == Role::Active { slot })
    }

    /// Active participants, in no particular order.
    pub fn active(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values().filter(|p| p.is_active())
    }

    /// Spectators, in no particular order.
    pub fn spectators(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values().filter(|p| !p.is_active())
    }

    /// Everyone in the arena regardless of role (broadcast fan-out).
    pub fn all(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    /// Ids of everyone in the arena.
    pub fn ids(&self) -> Vec<PlayerId> {
        self.participants.keys().copied().collect()
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn spectator_count(&self) -> usize {
        self.spectators().count()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
