//! # Skyforge
//!
//! Round-based arena minigames for game servers.
//!
//! Every arena cycles through a lobby, a round, and a restart: players
//! join through a sign, wait on their spawns while a countdown runs, fight
//! until one is left, and the level is restored for the next round. The
//! game server plugs in by implementing the [`host`](skyforge_arena::host)
//! traits and forwarding its player events.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skyforge::prelude::*;
//!
//! // Implement WorldHost + MapReset + WinSink for your server, then:
//! // skyforge::logging::init();
//! // let skyforge = Skyforge::builder().build();
//! // let arena = skyforge.load_arena(descriptor_json, my_host).await?;
//! // let reaction = skyforge.dispatch(event).await;
//! ```

mod error;
pub mod logging;
mod server;

pub use error::SkyforgeError;
pub use server::{Skyforge, SkyforgeBuilder};

pub use skyforge_arena as arena;
pub use skyforge_protocol as protocol;
pub use skyforge_tick as tick;

pub mod prelude {
    pub use crate::{Skyforge, SkyforgeBuilder, SkyforgeError};
    pub use skyforge_arena::{
        ArenaData, ArenaError, ArenaEvent, ArenaHandle, ArenaHost, ArenaInfo, ArenaPhase,
        ArenaSettings, BlockKind, ChestContents, ClockConfig, JoinError, LootTable, MapReset,
        Reaction, Role, WinSink, WorldHost,
    };
    pub use skyforge_protocol::{
        ArenaId, GameMode, ItemStack, Level, LevelId, Location, Notice, PlayerId, PlayerRef,
        Position, WinEvent,
    };
    pub use skyforge_tick::{TickConfig, TickPolicy};
}
