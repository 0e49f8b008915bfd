//! Integration tests for the Skyforge engine facade.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use skyforge::prelude::*;

// =========================================================================
// Test host: every level exists, every player is online.
// =========================================================================

#[derive(Clone, Default)]
struct TestHost {
    notices: Arc<Mutex<Vec<(PlayerId, Notice)>>>,
    locations: Arc<Mutex<HashMap<PlayerId, Location>>>,
    wins: Arc<Mutex<Vec<WinEvent>>>,
}

impl WorldHost for TestHost {
    fn is_level_generated(&self, _level: &LevelId) -> bool {
        true
    }
    fn is_online(&self, _player: PlayerId) -> bool {
        true
    }
    fn level_of(&self, player: PlayerId) -> Option<LevelId> {
        let locations = self.locations.lock().unwrap();
        locations.get(&player).map(|at| at.level.clone())
    }
    fn teleport(&mut self, player: PlayerId, to: &Location) {
        self.locations.lock().unwrap().insert(player, to.clone());
    }
    fn set_game_mode(&mut self, _player: PlayerId, _mode: GameMode) {}
    fn default_game_mode(&self) -> GameMode {
        GameMode::Survival
    }
    fn restore_vitals(&mut self, _player: PlayerId) {}
    fn clear_inventories(&mut self, _player: PlayerId) {}
    fn clear_effects(&mut self, _player: PlayerId) {}
    fn default_spawn(&self) -> Location {
        Location::new(LevelId::from("hub"), Position::default())
    }
    fn send(&mut self, player: PlayerId, notice: &Notice) {
        self.notices.lock().unwrap().push((player, notice.clone()));
    }
    fn broadcast_server(&mut self, _message: &str) {}
    fn loot_containers(&self, _level: &LevelId) -> Vec<Position> {
        Vec::new()
    }
    fn set_container_contents(&mut self, _: &LevelId, _: Position, _: &ChestContents) {}
    fn drop_item(&mut self, _at: &Location, _item: ItemStack) {}
}

impl MapReset for TestHost {
    fn load_map(&mut self, level: &LevelId) -> Option<Level> {
        Some(Level {
            id: level.clone(),
            spawn: Position::default(),
        })
    }
}

impl WinSink for TestHost {
    fn on_win(&mut self, event: &WinEvent) {
        self.wins.lock().unwrap().push(event.clone());
    }
}

const DESCRIPTOR: &str = r#"{
    "level": "sw-duel",
    "slots": 2,
    "spawns": ["0,64,0", "30,64,0"],
    "joinsign": ["5,65,5", "hub"]
}"#;

fn engine() -> Skyforge {
    Skyforge::builder().tick(TickConfig::manual()).build()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_load_arena_from_json() {
    let skyforge = engine();
    let arena = skyforge
        .load_arena(DESCRIPTOR.as_bytes(), TestHost::default())
        .await
        .unwrap();

    let info = skyforge.arena_info(arena).await.unwrap();
    assert!(!info.setup);
    assert_eq!(info.slots, 2);
    assert_eq!(info.level, Some(LevelId::from("sw-duel")));
    assert_eq!(skyforge.arenas().await.len(), 1);
}

#[tokio::test]
async fn test_load_arena_rejects_garbage() {
    let skyforge = engine();
    let result = skyforge.load_arena(b"{not json", TestHost::default()).await;
    assert!(matches!(result, Err(SkyforgeError::Protocol(_))));
}

#[tokio::test]
async fn test_invalid_descriptor_loads_in_setup_mode() {
    let skyforge = engine();
    let arena = skyforge
        .load_arena(br#"{"level":"sw-duel","slots":0}"#, TestHost::default())
        .await
        .unwrap();

    assert!(skyforge.arena_info(arena).await.unwrap().setup);
    assert!(skyforge.arenas().await.is_empty());

    let err = skyforge
        .join(PlayerRef::new(1, "Alex"), arena)
        .await
        .unwrap_err();
    assert_eq!(err.as_join_error(), Some(&JoinError::ArenaDisabled));
}

#[tokio::test]
async fn test_wrongly_typed_descriptor_loads_in_setup_mode() {
    let skyforge = engine();
    for raw in [
        r#"{"level":"sw-duel","slots":"2","spawns":["0,64,0","30,64,0"],"joinsign":["5,65,5","hub"]}"#,
        r#"{"level":"sw-duel","slots":2.5,"spawns":["0,64,0","30,64,0"],"joinsign":["5,65,5","hub"]}"#,
        r#"{"level":"sw-duel","slots":2,"spawns":"0,64,0","joinsign":["5,65,5","hub"]}"#,
        r#"{"level":"sw-duel","slots":2,"spawns":["0,64,0","30,64,0"],"joinsign":"5,65,5"}"#,
    ] {
        let arena = skyforge
            .load_arena(raw.as_bytes(), TestHost::default())
            .await
            .unwrap();
        assert!(skyforge.arena_info(arena).await.unwrap().setup, "{raw}");
    }
    assert!(skyforge.arenas().await.is_empty());
}

#[tokio::test]
async fn test_save_arena_round_trips_joinsign_key() {
    let skyforge = engine();
    let data: ArenaData = serde_json::from_str(DESCRIPTOR).unwrap();
    let bytes = skyforge.save_arena(&data).unwrap();

    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("\"joinsign\""));
}

#[tokio::test]
async fn test_round_through_the_facade() {
    let skyforge = engine();
    let host = TestHost::default();
    let arena = skyforge
        .load_arena(DESCRIPTOR.as_bytes(), host.clone())
        .await
        .unwrap();

    assert_eq!(skyforge.join(PlayerRef::new(1, "Alex"), arena).await.unwrap(), 1);
    assert_eq!(skyforge.join(PlayerRef::new(2, "Sam"), arena).await.unwrap(), 2);

    let handle = skyforge.handle(arena).await.unwrap();
    handle.start_game().await.unwrap();

    let reaction = skyforge
        .dispatch(ArenaEvent::Death {
            player: PlayerId(1),
            at: Location::new(LevelId::from("sw-duel"), Position::default()),
            drops: Vec::new(),
            message: None,
        })
        .await;
    assert_eq!(reaction, Reaction::SuppressDeath);

    // Clock sees one survivor and ends the round.
    handle.tick().await.unwrap();
    assert_eq!(
        skyforge.arena_info(arena).await.unwrap().phase,
        ArenaPhase::Restart
    );
    let wins = host.wins.lock().unwrap().clone();
    assert_eq!(wins.len(), 1);
    assert_eq!(wins[0].winner_name, "Sam");
}

#[tokio::test]
async fn test_leave_and_destroy() {
    let skyforge = engine();
    let arena = skyforge
        .load_arena(DESCRIPTOR.as_bytes(), TestHost::default())
        .await
        .unwrap();
    skyforge.join(PlayerRef::new(1, "Alex"), arena).await.unwrap();

    assert_eq!(skyforge.leave(PlayerId(1)).await.unwrap(), Some(arena));
    assert_eq!(skyforge.leave(PlayerId(1)).await.unwrap(), None);

    skyforge.destroy_arena(arena).await.unwrap();
    assert!(matches!(
        skyforge.arena_info(arena).await,
        Err(SkyforgeError::Arena(ArenaError::NotFound(_)))
    ));
}

#[tokio::test]
async fn test_clones_share_arenas() {
    let skyforge = engine();
    let other = skyforge.clone();
    skyforge
        .load_arena(DESCRIPTOR.as_bytes(), TestHost::default())
        .await
        .unwrap();
    assert_eq!(other.arenas().await.len(), 1);

    other.shutdown().await;
    assert!(skyforge.arenas().await.is_empty());
}
