//! Configuration error types.

/// Configuration errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Two registered servers share the same name.
    #[error("Duplicate server name '{0}'")]
    DuplicateServerName(String),

    /// Two job entries share the same name.
    #[error("Duplicate job name '{0}'")]
    DuplicateJobName(String),

    /// I/O operation failed.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    /// TOML deserialization failed.
    #[error(transparent)]
    Deserialization(#[from] toml::de::Error),

    /// TOML serialization failed.
    #[error(transparent)]
    Serialization(#[from] toml::ser::Error),
}
