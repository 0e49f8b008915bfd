//! The arena clock: one step per scheduler tick.
//!
//! The clock owns the three countdowns (lobby, round, restart) and nothing
//! else. It looks at an [`ArenaView`] and answers with the actions the
//! arena should take this tick, so it can be tested without an arena.

use serde::{Deserialize, Serialize};
use skyforge_protocol::Notice;

use crate::ArenaPhase;

/// Countdown lengths, in ticks (seconds at the default tick rate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Active players needed before the lobby countdown runs.
    pub min_players: usize,
    pub lobby_countdown: u32,
    /// Round length.
    pub game_time: u32,
    pub restart_countdown: u32,
    /// Round time left at which loot is refilled. `None` disables refills.
    pub refill_at: Option<u32>,
    /// Round time left at which the upcoming refill is announced.
    pub refill_warnings: Vec<u32>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            lobby_countdown: 40,
            game_time: 20 * 60,
            restart_countdown: 10,
            refill_at: Some(10 * 60),
            refill_warnings: vec![15 * 60, 11 * 60],
        }
    }
}

/// The slice of arena state the clock reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaView {
    pub phase: ArenaPhase,
    pub setup: bool,
    pub active: usize,
    pub check_end: bool,
}

/// Something the arena should do this tick.
#[derive(Debug, Clone, PartialEq)]
pub enum ClockAction {
    Broadcast(Notice),
    StartGame,
    RefillLoot,
    StartRestart,
    /// Send everyone home, then restore the level.
    Reload,
}

/// Per-arena countdown state.
#[derive(Debug, Clone)]
pub struct ArenaClock {
    config: ClockConfig,
    phase: ArenaPhase,
    start_in: u32,
    game_left: u32,
    restart_in: u32,
}

impl ArenaClock {
    pub fn new(config: ClockConfig) -> Self {
        let mut clock = Self {
            phase: ArenaPhase::Lobby,
            start_in: 0,
            game_left: 0,
            restart_in: 0,
            config,
        };
        clock.reset();
        clock
    }

    /// Puts every countdown back to its configured length.
    pub fn reset(&mut self) {
        self.start_in = self.config.lobby_countdown;
        self.game_left = self.config.game_time;
        self.restart_in = self.config.restart_countdown;
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn start_in(&self) -> u32 {
        self.start_in
    }

    pub fn game_left(&self) -> u32 {
        self.game_left
    }

    pub fn restart_in(&self) -> u32 {
        self.restart_in
    }

    /// Advances one tick.
    pub fn advance(&mut self, view: &ArenaView) -> Vec<ClockAction> {
        if view.setup {
            self.phase = ArenaPhase::Lobby;
            self.reset();
            return Vec::new();
        }

        // Phase changes not driven by this clock (manual transitions)
        // still start the new phase's countdown from the top.
        if view.phase != self.phase {
            self.phase = view.phase;
            match view.phase {
                ArenaPhase::Lobby => self.start_in = self.config.lobby_countdown,
                ArenaPhase::Game => self.game_left = self.config.game_time,
                ArenaPhase::Restart => self.restart_in = self.config.restart_countdown,
            }
        }

        match view.phase {
            ArenaPhase::Lobby => self.lobby_tick(view),
            ArenaPhase::Game => self.game_tick(view),
            ArenaPhase::Restart => self.restart_tick(),
        }
    }

    fn lobby_tick(&mut self, view: &ArenaView) -> Vec<ClockAction> {
        if view.active < self.config.min_players {
            self.start_in = self.config.lobby_countdown;
            return vec![ClockAction::Broadcast(Notice::Tip(
                "> You need more players to start a game!".into(),
            ))];
        }

        self.start_in = self.start_in.saturating_sub(1);
        if self.start_in == 0 {
            self.start_in = self.config.lobby_countdown;
            return vec![ClockAction::StartGame];
        }
        vec![ClockAction::Broadcast(Notice::Tip(format!(
            "> Starting in {} sec.",
            self.start_in
        )))]
    }

    fn game_tick(&mut self, view: &ArenaView) -> Vec<ClockAction> {
        if view.check_end {
            return vec![ClockAction::StartRestart];
        }

        self.game_left = self.game_left.saturating_sub(1);
        let mut actions = vec![ClockAction::Broadcast(Notice::Popup(format!(
            "> There are {} players, time to end: {}",
            view.active,
            format_clock(self.game_left)
        )))];

        if let Some(refill_at) = self.config.refill_at {
            if self.config.refill_warnings.contains(&self.game_left) && self.game_left > refill_at {
                actions.push(ClockAction::Broadcast(Notice::Message(format!(
                    "> All chests will be refilled in {}.",
                    format_clock(self.game_left - refill_at)
                ))));
            }
            if self.game_left == refill_at {
                actions.push(ClockAction::RefillLoot);
                actions.push(ClockAction::Broadcast(Notice::Message(
                    "> All chests are refilled.".into(),
                )));
            }
        }

        if self.game_left == 0 {
            actions.push(ClockAction::StartRestart);
        }
        actions
    }

    fn restart_tick(&mut self) -> Vec<ClockAction> {
        self.restart_in = self.restart_in.saturating_sub(1);
        if self.restart_in == 0 {
            self.reset();
            return vec![ClockAction::Reload];
        }
        vec![ClockAction::Broadcast(Notice::Popup(format!(
            "> Restarting in {} sec.",
            self.restart_in
        )))]
    }
}

/// `mm:ss`.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
