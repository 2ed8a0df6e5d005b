//! Common types and utilities.

/// Publisher error type.
pub use crate::error::Error;

/// Publisher result type.
pub type Result<T> = core::result::Result<T, Error>;
