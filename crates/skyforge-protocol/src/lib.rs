//! Shared vocabulary for Skyforge.
//!
//! This crate defines the types every other layer speaks in:
//!
//! - **Identity** ([`PlayerId`], [`ArenaId`], [`LevelId`], [`PlayerRef`]):
//!   who and where, as stable newtypes instead of display names.
//! - **World** ([`Position`], [`Location`], [`Level`], [`GameMode`],
//!   [`ItemStack`]): the small slice of the host game's world model the
//!   arena core needs to reason about.
//! - **Notifications** ([`Notice`], [`WinEvent`]): what the core asks the
//!   host to show players, and what it reports to external listeners.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how descriptors and
//!   events are converted to/from bytes.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about arenas, phases, or membership.
//! It sits underneath the arena core and the host adapter so both sides
//! agree on the same types.
//!
//! ```text
//! Host adapter (events, world calls) ↔ Arena core ↔ Protocol (shared types)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ArenaId, GameMode, ItemStack, Level, LevelId, Location, Notice, PlayerId,
    PlayerRef, Position, WinEvent,
};
