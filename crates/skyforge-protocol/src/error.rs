//! Error types for the protocol layer.
//!
//! Each crate in Skyforge defines its own error enum. A `ProtocolError`
//! always means the problem is in turning bytes or strings into values
//! (or back), never in arena rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, or a field
    /// with the wrong type (e.g. `"slots": "twelve"`).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The value parsed but is not meaningful, e.g. a position string
    /// that does not have exactly three numeric components.
    #[error("invalid value: {0}")]
    InvalidMessage(String),
}
