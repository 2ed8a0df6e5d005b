//! Protocol adapter error types.

/// Protocol adapter errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The TA wrapper is enabled but no TA parameters were bound to the
    /// build. This is a configuration error, never a silent downgrade to
    /// the generic shape.
    #[error("TA wrapper is enabled but no TA parameters were bound to this build")]
    TaParametersUnbound,

    /// A bound TA parameter required by the callback protocol is empty.
    #[error("TA parameter '{0}' is required but empty")]
    MissingTaField(&'static str),

    /// JSON serialization/deserialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
