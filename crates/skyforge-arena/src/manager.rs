//! Arena manager: creates, tracks, and routes players and events to arenas.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::future::join_all;
use skyforge_protocol::{ArenaId, PlayerId, PlayerRef};

use crate::actor::spawn_arena;
use crate::reactor::{ArenaEvent, Reaction};
use crate::{ArenaData, ArenaError, ArenaHandle, ArenaHost, ArenaInfo, ArenaSettings, JoinError};

/// Counter for generating unique arena IDs.
static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

/// Owns every arena on the server.
///
/// Membership lives in the arena actors; the manager asks them instead of
/// keeping its own index, so deaths and quits handled inside an arena can
/// never leave it stale. A player is in at most ONE arena at a time.
pub struct ArenaManager {
    arenas: HashMap<ArenaId, ArenaHandle>,
    settings: ArenaSettings,
}

impl ArenaManager {
    pub fn new(settings: ArenaSettings) -> Self {
        Self {
            arenas: HashMap::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &ArenaSettings {
        &self.settings
    }

    /// Creates an arena from a descriptor and starts its actor.
    ///
    /// Always succeeds; an invalid descriptor yields an arena in setup
    /// mode, which [`arena_info`](Self::arena_info) reports.
    pub fn create_arena<H: ArenaHost>(&mut self, data: ArenaData, host: H) -> ArenaId {
        let arena_id = ArenaId(NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed));
        let handle = spawn_arena(arena_id, data, host, self.settings.clone());
        self.arenas.insert(arena_id, handle);
        tracing::info!(%arena_id, "arena created");
        arena_id
    }

    /// Adds a player to an arena.
    ///
    /// Enforces the "one arena at a time" invariant across arenas.
    pub async fn join_arena(
        &self,
        player: PlayerRef,
        arena_id: ArenaId,
    ) -> Result<usize, ArenaError> {
        let handle = self.handle(arena_id).ok_or(ArenaError::NotFound(arena_id))?;

        if let Some(current) = self.find_player(player.id).await {
            tracing::debug!(player_id = %player.id, %current, "join refused, already in an arena");
            return Err(JoinError::AlreadyInArena(player.id).into());
        }
        handle.join(player).await
    }

    /// Removes a player from whichever arena holds them.
    /// Returns the arena they left, if any.
    pub async fn leave(&self, player: PlayerId) -> Result<Option<ArenaId>, ArenaError> {
        let Some(arena_id) = self.find_player(player).await else {
            return Ok(None);
        };
        let handle = self.handle(arena_id).ok_or(ArenaError::NotFound(arena_id))?;
        handle.leave(player).await?;
        Ok(Some(arena_id))
    }

    /// The arena the player is in, any role.
    pub async fn find_player(&self, player: PlayerId) -> Option<ArenaId> {
        locate(&self.handles(), player).await
    }

    /// Routes a host event to the arenas.
    ///
    /// See [`route_event`]; callers that share the manager behind a lock
    /// can take [`handles`](Self::handles) and route without holding it.
    pub async fn dispatch(&self, event: ArenaEvent) -> Reaction {
        route_event(&self.handles(), event).await
    }

    /// Owned handles to every arena, in id order.
    pub fn handles(&self) -> Vec<ArenaHandle> {
        let mut handles: Vec<ArenaHandle> = self.arenas.values().cloned().collect();
        handles.sort_by_key(ArenaHandle::arena_id);
        handles
    }

    pub async fn arena_info(&self, arena_id: ArenaId) -> Result<ArenaInfo, ArenaError> {
        let handle = self.handle(arena_id).ok_or(ArenaError::NotFound(arena_id))?;
        handle.info().await
    }

    /// Lists arenas that currently accept players.
    ///
    /// Arenas that fail to respond (e.g. shutting down) are skipped.
    pub async fn list_arenas(&self) -> Vec<ArenaInfo> {
        let mut infos = Vec::with_capacity(self.arenas.len());
        for handle in self.arenas.values() {
            if let Ok(info) = handle.info().await {
                if info.is_joinable() {
                    infos.push(info);
                }
            }
        }
        infos.sort_by_key(|i| i.arena_id);
        infos
    }

    /// Shuts an arena down. Its players are sent home by the actor.
    pub async fn destroy_arena(&mut self, arena_id: ArenaId) -> Result<(), ArenaError> {
        let handle = self
            .arenas
            .remove(&arena_id)
            .ok_or(ArenaError::NotFound(arena_id))?;
        let _ = handle.shutdown().await;
        tracing::info!(%arena_id, "arena destroyed");
        Ok(())
    }

    /// Shuts every arena down.
    pub async fn shutdown_all(&mut self) {
        for (arena_id, handle) in self.arenas.drain() {
            if handle.shutdown().await.is_err() {
                tracing::debug!(%arena_id, "arena already stopped");
            }
        }
    }

    /// A cloned handle, for callers that want to talk to one arena
    /// without holding on to the manager.
    pub fn handle(&self, arena_id: ArenaId) -> Option<ArenaHandle> {
        self.arenas.get(&arena_id).cloned()
    }

    pub fn arena_count(&self) -> usize {
        self.arenas.len()
    }

    pub fn arena_ids(&self) -> Vec<ArenaId> {
        let mut ids: Vec<ArenaId> = self.arenas.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for ArenaManager {
    fn default() -> Self {
        Self::new(ArenaSettings::default())
    }
}

/// Asks every arena at once whether it holds the player.
async fn locate(handles: &[ArenaHandle], player: PlayerId) -> Option<ArenaId> {
    let replies = join_all(handles.iter().map(|h| h.membership(player))).await;
    handles
        .iter()
        .zip(replies)
        .find_map(|(handle, reply)| matches!(reply, Ok(Some(_))).then(|| handle.arena_id()))
}

/// Routes a host event to the arenas it concerns.
///
/// Events about a member go to that member's arena only. From anyone
/// else only interactions matter (a join sign may belong to any arena),
/// and those go to every arena at once. The first reaction other than
/// [`Reaction::Pass`], in arena id order, is returned.
pub async fn route_event(handles: &[ArenaHandle], event: ArenaEvent) -> Reaction {
    let targets: Vec<&ArenaHandle> = match locate(handles, event.player()).await {
        Some(home) => handles.iter().filter(|h| h.arena_id() == home).collect(),
        None if matches!(event, ArenaEvent::Interact { .. }) => handles.iter().collect(),
        None => return Reaction::Pass,
    };

    let replies = join_all(targets.iter().map(|h| h.dispatch(event.clone()))).await;
    let mut reaction = Reaction::Pass;
    for (handle, reply) in targets.into_iter().zip(replies) {
        match reply {
            Ok(Reaction::Pass) => {}
            Ok(r) if reaction == Reaction::Pass => reaction = r,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(arena_id = %handle.arena_id(), error = %e, "event dispatch failed");
            }
        }
    }
    reaction
}
