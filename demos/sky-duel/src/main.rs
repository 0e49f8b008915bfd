//! A two-player duel on an in-memory world, compressed into a few seconds.
//!
//! Run with `RUST_LOG=debug cargo run -p sky-duel` to watch every phase.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use skyforge::prelude::*;
use tracing::info;

// ---------------------------------------------------------------------------
// In-memory world
// ---------------------------------------------------------------------------

/// Just enough of a game server to host one arena. Everything it is asked
/// to do is printed.
struct DemoWorld {
    online: HashSet<PlayerId>,
    levels: HashMap<PlayerId, LevelId>,
}

impl WorldHost for DemoWorld {
    fn is_level_generated(&self, level: &LevelId) -> bool {
        level.as_str() == "duel-isle"
    }

    fn is_online(&self, player: PlayerId) -> bool {
        self.online.contains(&player)
    }

    fn level_of(&self, player: PlayerId) -> Option<LevelId> {
        self.levels.get(&player).cloned()
    }

    fn teleport(&mut self, player: PlayerId, to: &Location) {
        info!(%player, %to, "teleport");
        self.levels.insert(player, to.level.clone());
    }

    fn set_game_mode(&mut self, player: PlayerId, mode: GameMode) {
        info!(%player, ?mode, "game mode");
    }

    fn default_game_mode(&self) -> GameMode {
        GameMode::Survival
    }

    fn restore_vitals(&mut self, _player: PlayerId) {}

    fn clear_inventories(&mut self, _player: PlayerId) {}

    fn clear_effects(&mut self, _player: PlayerId) {}

    fn default_spawn(&self) -> Location {
        Location::new(LevelId::from("hub"), Position::new(0.0, 70.0, 0.0))
    }

    fn send(&mut self, player: PlayerId, notice: &Notice) {
        match notice {
            // Tips and popups repeat every tick; keep them out of the way.
            Notice::Tip(_) | Notice::Popup(_) => {
                tracing::debug!(%player, text = notice.text(), "hud")
            }
            _ => info!(%player, text = notice.text(), "notice"),
        }
    }

    fn broadcast_server(&mut self, message: &str) {
        info!(text = message, "server broadcast");
    }

    fn loot_containers(&self, _level: &LevelId) -> Vec<Position> {
        vec![Position::new(4.0, 64.0, 4.0), Position::new(26.0, 64.0, 4.0)]
    }

    fn set_container_contents(&mut self, _level: &LevelId, at: Position, contents: &ChestContents) {
        info!(%at, stacks = contents.filled(), "chest filled");
    }

    fn drop_item(&mut self, at: &Location, item: ItemStack) {
        info!(%at, id = item.id, count = item.count, "item dropped");
    }
}

impl MapReset for DemoWorld {
    fn load_map(&mut self, level: &LevelId) -> Option<Level> {
        info!(%level, "restoring level");
        Some(Level {
            id: level.clone(),
            spawn: Position::new(15.0, 70.0, 15.0),
        })
    }
}

impl WinSink for DemoWorld {
    fn on_win(&mut self, event: &WinEvent) {
        info!(arena = %event.arena_id, winner = %event.winner_name, "win recorded");
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

const DESCRIPTOR: &str = r#"{
    "level": "duel-isle",
    "slots": 2,
    "spawns": ["0,64,0", "30,64,0"],
    "joinsign": ["5,65,5", "hub"]
}"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    skyforge::logging::init();

    let skyforge = Skyforge::builder()
        .clock(ClockConfig {
            lobby_countdown: 5,
            game_time: 30,
            restart_countdown: 3,
            refill_at: Some(20),
            refill_warnings: vec![25],
            ..ClockConfig::default()
        })
        .tick(TickConfig::with_rate(10))
        .build();

    let world = DemoWorld {
        online: [PlayerId(1), PlayerId(2)].into_iter().collect(),
        levels: HashMap::new(),
    };
    let arena = skyforge.load_arena(DESCRIPTOR.as_bytes(), world).await?;

    let sign = Location::new(LevelId::from("hub"), Position::new(5.5, 65.0, 5.5));
    for player in [PlayerRef::new(1, "Alex"), PlayerRef::new(2, "Sam")] {
        let event = ArenaEvent::Interact {
            player,
            block: sign.clone(),
            kind: BlockKind::Sign,
        };
        skyforge.dispatch(event).await;
    }

    // Alex tries to run off before the start and gets put back.
    skyforge
        .dispatch(ArenaEvent::Move {
            player: PlayerId(1),
            to: Position::new(6.0, 64.0, 0.0),
        })
        .await;

    tokio::time::sleep(Duration::from_millis(800)).await;
    let phase = skyforge.arena_info(arena).await?.phase;
    info!(%phase, "lobby countdown done");

    let reaction = skyforge
        .dispatch(ArenaEvent::Death {
            player: PlayerId(1),
            at: Location::new(LevelId::from("duel-isle"), Position::new(15.0, 10.0, 0.0)),
            drops: vec![ItemStack::new(267, 1), ItemStack::new(364, 8)],
            message: Some("Alex fell into the void".into()),
        })
        .await;
    info!(?reaction, "death reported");

    tokio::time::sleep(Duration::from_millis(800)).await;
    let info = skyforge.arena_info(arena).await?;
    info!(phase = %info.phase, active = info.active, "arena back in lobby");

    skyforge.shutdown().await;
    Ok(())
}
