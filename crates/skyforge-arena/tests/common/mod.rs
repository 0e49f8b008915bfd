//! A recording in-memory host shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use skyforge_arena::{ArenaData, ChestContents, MapReset, WinSink, WorldHost};
use skyforge_protocol::{
    GameMode, ItemStack, Level, LevelId, Location, Notice, PlayerId, PlayerRef, Position, WinEvent,
};

pub const LEVEL: &str = "sw-islands";
pub const LOBBY: &str = "lobby";

/// Everything the host has been asked to do, plus its world state.
#[derive(Debug, Default)]
pub struct HostState {
    pub generated: HashSet<LevelId>,
    /// Levels whose saved snapshot can be restored.
    pub snapshots: HashSet<LevelId>,
    pub online: HashSet<PlayerId>,
    pub locations: HashMap<PlayerId, Location>,
    pub modes: HashMap<PlayerId, GameMode>,
    pub notices: Vec<(PlayerId, Notice)>,
    pub server_messages: Vec<String>,
    pub wins: Vec<WinEvent>,
    pub containers: Vec<Position>,
    pub fills: Vec<(LevelId, Position, ChestContents)>,
    pub drops: Vec<(Location, ItemStack)>,
    pub inventories_cleared: Vec<PlayerId>,
    pub vitals_restored: Vec<PlayerId>,
    pub effects_cleared: Vec<PlayerId>,
    pub map_loads: usize,
}

/// Cloneable so a test keeps one copy while the arena owns the other.
#[derive(Debug, Clone, Default)]
pub struct MockHost {
    state: Arc<Mutex<HostState>>,
}

impl MockHost {
    /// A host with the arena level generated and restorable, and two
    /// loot chests in it.
    pub fn new() -> Self {
        let host = Self::default();
        {
            let mut s = host.state();
            s.generated.insert(LevelId::from(LEVEL));
            s.snapshots.insert(LevelId::from(LEVEL));
            s.containers = vec![Position::new(3.0, 64.0, 3.0), Position::new(-3.0, 64.0, 7.0)];
        }
        host
    }

    pub fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap()
    }

    /// Brings players online.
    pub fn connect(&self, ids: impl IntoIterator<Item = u64>) {
        self.state().online.extend(ids.into_iter().map(PlayerId));
    }

    pub fn disconnect(&self, id: u64) {
        self.state().online.remove(&PlayerId(id));
    }

    /// Makes the next map reloads fail.
    pub fn lose_snapshot(&self) {
        self.state().snapshots.clear();
    }

    pub fn notices_for(&self, id: u64) -> Vec<Notice> {
        self.state()
            .notices
            .iter()
            .filter(|(p, _)| *p == PlayerId(id))
            .map(|(_, n)| n.clone())
            .collect()
    }

    pub fn messages_for(&self, id: u64) -> Vec<String> {
        self.notices_for(id)
            .into_iter()
            .filter_map(|n| match n {
                Notice::Message(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn location_of(&self, id: u64) -> Option<Location> {
        self.state().locations.get(&PlayerId(id)).cloned()
    }

    pub fn mode_of(&self, id: u64) -> Option<GameMode> {
        self.state().modes.get(&PlayerId(id)).copied()
    }

    pub fn wins(&self) -> Vec<WinEvent> {
        self.state().wins.clone()
    }
}

impl WorldHost for MockHost {
    fn is_level_generated(&self, level: &LevelId) -> bool {
        self.state().generated.contains(level)
    }

    fn is_online(&self, player: PlayerId) -> bool {
        self.state().online.contains(&player)
    }

    fn level_of(&self, player: PlayerId) -> Option<LevelId> {
        let state = self.state();
        if !state.online.contains(&player) {
            return None;
        }
        state.locations.get(&player).map(|at| at.level.clone())
    }

    fn teleport(&mut self, player: PlayerId, to: &Location) {
        self.state().locations.insert(player, to.clone());
    }

    fn set_game_mode(&mut self, player: PlayerId, mode: GameMode) {
        self.state().modes.insert(player, mode);
    }

    fn default_game_mode(&self) -> GameMode {
        GameMode::Survival
    }

    fn restore_vitals(&mut self, player: PlayerId) {
        self.state().vitals_restored.push(player);
    }

    fn clear_inventories(&mut self, player: PlayerId) {
        self.state().inventories_cleared.push(player);
    }

    fn clear_effects(&mut self, player: PlayerId) {
        self.state().effects_cleared.push(player);
    }

    fn default_spawn(&self) -> Location {
        lobby_spawn()
    }

    fn send(&mut self, player: PlayerId, notice: &Notice) {
        self.state().notices.push((player, notice.clone()));
    }

    fn broadcast_server(&mut self, message: &str) {
        self.state().server_messages.push(message.to_string());
    }

    fn loot_containers(&self, _level: &LevelId) -> Vec<Position> {
        self.state().containers.clone()
    }

    fn set_container_contents(&mut self, level: &LevelId, at: Position, contents: &ChestContents) {
        self.state().fills.push((level.clone(), at, contents.clone()));
    }

    fn drop_item(&mut self, at: &Location, item: ItemStack) {
        self.state().drops.push((at.clone(), item));
    }
}

impl MapReset for MockHost {
    fn load_map(&mut self, level: &LevelId) -> Option<Level> {
        let mut s = self.state();
        s.map_loads += 1;
        s.snapshots.contains(level).then(|| Level {
            id: level.clone(),
            spawn: Position::new(0.0, 80.0, 0.0),
        })
    }
}

impl WinSink for MockHost {
    fn on_win(&mut self, event: &WinEvent) {
        self.state().wins.push(event.clone());
    }
}

// =========================================================================
// Fixtures
// =========================================================================

/// A valid descriptor with `slots` spawns at x = 10, 20, 30...
pub fn arena_data(slots: i64) -> ArenaData {
    ArenaData {
        level: Some(LEVEL.into()),
        slots: Some(slots),
        spawns: Some((1..=slots).map(|i| format!("{},64,0", i * 10)).collect()),
        join_sign: Some(vec!["5,65,5".into(), LOBBY.into()]),
        enabled: false,
    }
}

pub fn player(id: u64) -> PlayerRef {
    PlayerRef::new(id, format!("player{id}"))
}

pub fn pid(id: u64) -> PlayerId {
    PlayerId(id)
}

/// The spawn location of a 1-based slot in [`arena_data`].
pub fn slot_spawn(slot: u64) -> Location {
    Location::new(
        LevelId::from(LEVEL),
        Position::new((slot * 10) as f64, 64.0, 0.0),
    )
}

pub fn join_sign() -> Location {
    Location::new(LevelId::from(LOBBY), Position::new(5.4, 65.9, 5.1))
}

pub fn lobby_spawn() -> Location {
    Location::new(LevelId::from(LOBBY), Position::new(0.0, 100.0, 0.0))
}

pub fn in_arena(x: f64, y: f64, z: f64) -> Location {
    Location::new(LevelId::from(LEVEL), Position::new(x, y, z))
}
