//! Unified error type for Skyforge.

use skyforge_arena::ArenaError;
use skyforge_protocol::ProtocolError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum SkyforgeError {
    /// A descriptor or event could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An arena refused the operation (setup mode, full, wrong phase...).
    #[error(transparent)]
    Arena(#[from] ArenaError),
}

impl SkyforgeError {
    /// The join refusal, if this is one. Hosts show its notice to the player.
    pub fn as_join_error(&self) -> Option<&skyforge_arena::JoinError> {
        match self {
            Self::Arena(ArenaError::Join(e)) => Some(e),
            _ => None,
        }
    }
}
