//! Integration tests for arena actors and the arena manager.

mod common;

use std::time::Duration;

use common::*;
use skyforge_arena::{
    spawn_arena, ArenaData, ArenaError, ArenaEvent, ArenaManager, ArenaPhase, ArenaSettings,
    BlockKind, ClockConfig, JoinError, Reaction, Role, route_event,
};
use skyforge_protocol::{ArenaId, ItemStack, Notice, Position};
use skyforge_tick::TickConfig;

/// Short countdowns, no scheduler: tests drive the clock with `tick()`.
fn manual_settings() -> ArenaSettings {
    ArenaSettings {
        clock: ClockConfig {
            min_players: 2,
            lobby_countdown: 2,
            game_time: 5,
            restart_countdown: 2,
            refill_at: None,
            refill_warnings: Vec::new(),
        },
        tick: TickConfig::manual(),
        ..ArenaSettings::default()
    }
}

fn death(id: u64) -> ArenaEvent {
    ArenaEvent::Death {
        player: pid(id),
        at: in_arena(0.0, 60.0, 0.0),
        drops: Vec::new(),
        message: None,
    }
}

// =========================================================================
// ArenaHandle
// =========================================================================

#[tokio::test]
async fn test_handle_join_and_membership() {
    let host = MockHost::new();
    host.connect([1, 2]);
    let handle = spawn_arena(ArenaId(1), arena_data(2), host, manual_settings());

    assert_eq!(handle.join(player(1)).await.unwrap(), 1);
    assert_eq!(handle.join(player(2)).await.unwrap(), 2);
    assert!(matches!(
        handle.join(player(3)).await,
        Err(ArenaError::Join(JoinError::ArenaFull))
    ));

    assert_eq!(
        handle.membership(pid(2)).await.unwrap(),
        Some(Role::Active { slot: 2 })
    );
    assert_eq!(handle.membership(pid(3)).await.unwrap(), None);

    let info = handle.info().await.unwrap();
    assert_eq!(info.arena_id, ArenaId(1));
    assert_eq!(info.phase, ArenaPhase::Lobby);
    assert_eq!(info.active, 2);
    assert_eq!(info.slots, 2);
    assert!(!info.is_joinable());
}

#[tokio::test]
async fn test_handle_leave_twice() {
    let host = MockHost::new();
    host.connect([1]);
    let handle = spawn_arena(ArenaId(1), arena_data(2), host.clone(), manual_settings());

    handle.join(player(1)).await.unwrap();
    assert!(handle.leave(pid(1)).await.unwrap());
    assert!(!handle.leave(pid(1)).await.unwrap());
    assert_eq!(host.location_of(1), Some(lobby_spawn()));
}

#[tokio::test]
async fn test_handle_on_setup_arena() {
    let handle = spawn_arena(ArenaId(1), ArenaData::default(), MockHost::new(), manual_settings());

    let info = handle.info().await.unwrap();
    assert!(info.setup);
    assert_eq!(info.level, None);
    assert!(matches!(
        handle.join(player(1)).await,
        Err(ArenaError::Join(JoinError::ArenaDisabled))
    ));
    assert!(matches!(handle.start_game().await, Err(ArenaError::SetupMode(_))));

    handle.set_data(arena_data(2)).await.unwrap();
    assert!(!handle.info().await.unwrap().setup);
    // Already live: nothing to do.
    handle.enable().await.unwrap();
}

#[tokio::test]
async fn test_handle_disable_then_enable() {
    let host = MockHost::new();
    host.connect([1]);
    let handle = spawn_arena(ArenaId(1), arena_data(2), host.clone(), manual_settings());
    handle.join(player(1)).await.unwrap();

    handle.disable().await.unwrap();
    assert!(handle.info().await.unwrap().setup);
    assert_eq!(host.location_of(1), Some(lobby_spawn()));

    handle.enable().await.unwrap();
    let info = handle.info().await.unwrap();
    assert!(!info.setup);
    assert_eq!(info.active, 0);
}

#[tokio::test]
async fn test_handle_manual_transitions() {
    let host = MockHost::new();
    host.connect([1, 2]);
    let handle = spawn_arena(ArenaId(1), arena_data(2), host.clone(), manual_settings());
    handle.join(player(1)).await.unwrap();
    handle.join(player(2)).await.unwrap();

    assert!(matches!(
        handle.reload().await,
        Err(ArenaError::InvalidTransition { .. })
    ));
    handle.start_game().await.unwrap();
    assert!(!handle.check_end().await.unwrap());
    handle.start_restart().await.unwrap();
    handle.reload().await.unwrap();

    let info = handle.info().await.unwrap();
    assert_eq!(info.phase, ArenaPhase::Lobby);
    assert_eq!(info.active, 0);
    assert_eq!(host.location_of(1), Some(lobby_spawn()));
}

#[tokio::test]
async fn test_clock_drives_a_full_round() {
    let host = MockHost::new();
    host.connect([1, 2]);
    let handle = spawn_arena(ArenaId(1), arena_data(2), host.clone(), manual_settings());
    handle.join(player(1)).await.unwrap();
    handle.join(player(2)).await.unwrap();

    handle.tick().await.unwrap();
    assert!(host.notices_for(1).contains(&Notice::Tip("> Starting in 1 sec.".into())));
    handle.tick().await.unwrap();
    assert_eq!(handle.info().await.unwrap().phase, ArenaPhase::Game);

    let reaction = handle.dispatch(death(1)).await.unwrap();
    assert_eq!(reaction, Reaction::SuppressDeath);
    assert!(handle.check_end().await.unwrap());

    handle.tick().await.unwrap();
    assert_eq!(handle.info().await.unwrap().phase, ArenaPhase::Restart);
    assert_eq!(host.wins().len(), 1);
    assert_eq!(host.wins()[0].winner, pid(2));

    handle.tick().await.unwrap();
    handle.tick().await.unwrap();
    let info = handle.info().await.unwrap();
    assert_eq!(info.phase, ArenaPhase::Lobby);
    assert_eq!(info.active + info.spectators, 0);
    assert_eq!(host.location_of(1), Some(lobby_spawn()));
    assert_eq!(host.location_of(2), Some(lobby_spawn()));
}

#[tokio::test]
async fn test_clock_reload_failure_leaves_setup() {
    let host = MockHost::new();
    host.connect([1, 2]);
    let handle = spawn_arena(ArenaId(1), arena_data(2), host.clone(), manual_settings());
    handle.join(player(1)).await.unwrap();
    handle.join(player(2)).await.unwrap();
    handle.start_game().await.unwrap();
    handle.start_restart().await.unwrap();
    host.lose_snapshot();

    for _ in 0..2 {
        handle.tick().await.unwrap();
    }
    let info = handle.info().await.unwrap();
    assert!(info.setup);
    assert_eq!(info.active, 0);
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_ticks_start_the_game() {
    let host = MockHost::new();
    host.connect([1, 2]);
    let settings = ArenaSettings {
        tick: TickConfig {
            initial_jitter_ms: 0,
            ..TickConfig::with_rate(1)
        },
        ..manual_settings()
    };
    let handle = spawn_arena(ArenaId(1), arena_data(2), host, settings);
    handle.join(player(1)).await.unwrap();
    handle.join(player(2)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert_eq!(handle.info().await.unwrap().phase, ArenaPhase::Game);
}

#[tokio::test]
async fn test_shutdown_makes_handle_unavailable() {
    let handle = spawn_arena(ArenaId(4), arena_data(2), MockHost::new(), manual_settings());
    handle.shutdown().await.unwrap();
    assert!(matches!(
        handle.info().await,
        Err(ArenaError::Unavailable(ArenaId(4)))
    ));
}

// =========================================================================
// ArenaManager
// =========================================================================

#[tokio::test]
async fn test_create_arena_returns_unique_ids() {
    let mut mgr = ArenaManager::new(manual_settings());
    let a1 = mgr.create_arena(arena_data(2), MockHost::new());
    let a2 = mgr.create_arena(arena_data(2), MockHost::new());
    assert_ne!(a1, a2);
    assert_eq!(mgr.arena_count(), 2);
    assert_eq!(mgr.arena_ids().len(), 2);
}

#[tokio::test]
async fn test_join_arena_not_found() {
    let mgr = ArenaManager::new(manual_settings());
    let result = mgr.join_arena(player(1), ArenaId(999)).await;
    assert!(matches!(result, Err(ArenaError::NotFound(ArenaId(999)))));
}

#[tokio::test]
async fn test_join_arena_one_at_a_time() {
    let host = MockHost::new();
    host.connect([1]);
    let mut mgr = ArenaManager::new(manual_settings());
    let a1 = mgr.create_arena(arena_data(2), host.clone());
    let a2 = mgr.create_arena(arena_data(2), host.clone());

    assert_eq!(mgr.join_arena(player(1), a1).await.unwrap(), 1);
    let result = mgr.join_arena(player(1), a2).await;
    assert!(matches!(
        result,
        Err(ArenaError::Join(JoinError::AlreadyInArena(_)))
    ));
    assert_eq!(mgr.find_player(pid(1)).await, Some(a1));
}

#[tokio::test]
async fn test_manager_leave() {
    let host = MockHost::new();
    host.connect([1]);
    let mut mgr = ArenaManager::new(manual_settings());
    let arena = mgr.create_arena(arena_data(2), host.clone());
    mgr.join_arena(player(1), arena).await.unwrap();

    assert_eq!(mgr.leave(pid(1)).await.unwrap(), Some(arena));
    assert_eq!(mgr.leave(pid(1)).await.unwrap(), None);
    assert_eq!(mgr.find_player(pid(1)).await, None);
}

#[tokio::test]
async fn test_list_arenas_skips_setup_and_full() {
    let host = MockHost::new();
    host.connect([1]);
    let mut mgr = ArenaManager::new(manual_settings());
    let open = mgr.create_arena(arena_data(2), host.clone());
    let full = mgr.create_arena(arena_data(1), host.clone());
    mgr.create_arena(ArenaData::default(), host.clone());
    mgr.join_arena(player(1), full).await.unwrap();

    let listed: Vec<ArenaId> = mgr.list_arenas().await.iter().map(|i| i.arena_id).collect();
    assert_eq!(listed, vec![open]);
}

#[tokio::test]
async fn test_dispatch_routes_sign_click_to_its_arena() {
    let host = MockHost::new();
    host.connect([1]);
    let mut mgr = ArenaManager::new(manual_settings());
    let other_sign = ArenaData {
        join_sign: Some(vec!["40,65,40".into(), LOBBY.into()]),
        ..arena_data(2)
    };
    let a1 = mgr.create_arena(other_sign, host.clone());
    let a2 = mgr.create_arena(arena_data(2), host.clone());

    let click = ArenaEvent::Interact {
        player: player(1),
        block: join_sign(),
        kind: BlockKind::Sign,
    };
    assert_eq!(mgr.dispatch(click.clone()).await, Reaction::Pass);
    assert_eq!(mgr.find_player(pid(1)).await, Some(a2));
    assert_eq!(mgr.arena_info(a1).await.unwrap().active, 0);

    // Clicking again while inside only reaches the player's own arena.
    mgr.dispatch(click).await;
    assert_eq!(mgr.arena_info(a2).await.unwrap().active, 1);
}

#[tokio::test]
async fn test_dispatch_returns_first_non_pass() {
    let host = MockHost::new();
    host.connect([1]);
    let mut mgr = ArenaManager::new(manual_settings());
    mgr.create_arena(arena_data(2), host.clone());
    let arena = mgr.create_arena(arena_data(2), host.clone());
    mgr.join_arena(player(1), arena).await.unwrap();

    let reaction = mgr.dispatch(ArenaEvent::Exhaust { player: pid(1) }).await;
    assert_eq!(reaction, Reaction::Cancel);
    let reaction = mgr.dispatch(ArenaEvent::Exhaust { player: pid(2) }).await;
    assert_eq!(reaction, Reaction::Pass);
}

#[tokio::test]
async fn test_route_event_on_handle_snapshot_reaches_home_arena_only() {
    let (host_a, host_b) = (MockHost::new(), MockHost::new());
    host_b.connect([1]);
    let mut mgr = ArenaManager::new(manual_settings());
    mgr.create_arena(arena_data(2), host_a.clone());
    let home = mgr.create_arena(arena_data(2), host_b.clone());
    mgr.join_arena(player(1), home).await.unwrap();

    let handles = mgr.handles();
    drop(mgr);

    let fall = ArenaEvent::Death {
        player: pid(1),
        at: in_arena(0.0, 10.0, 0.0),
        drops: vec![ItemStack::new(364, 4)],
        message: None,
    };
    assert_eq!(route_event(&handles, fall).await, Reaction::SuppressDeath);
    assert_eq!(host_b.state().drops.len(), 1);
    assert!(host_a.state().drops.is_empty());

    let stranger = ArenaEvent::Move {
        player: pid(9),
        to: Position::new(0.0, 64.0, 0.0),
    };
    assert_eq!(route_event(&handles, stranger).await, Reaction::Pass);
}

#[tokio::test(start_paused = true)]
async fn test_destroy_arena_sends_players_home() {
    let host = MockHost::new();
    host.connect([1]);
    let mut mgr = ArenaManager::new(manual_settings());
    let arena = mgr.create_arena(arena_data(2), host.clone());
    mgr.join_arena(player(1), arena).await.unwrap();

    mgr.destroy_arena(arena).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(mgr.arena_count(), 0);
    assert!(matches!(
        mgr.arena_info(arena).await,
        Err(ArenaError::NotFound(_))
    ));
    assert_eq!(host.location_of(1), Some(lobby_spawn()));
    assert!(matches!(
        mgr.destroy_arena(arena).await,
        Err(ArenaError::NotFound(_))
    ));
}
