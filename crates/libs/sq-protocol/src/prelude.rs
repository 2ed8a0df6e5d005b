//! Common types and utilities.

/// Protocol adapter error type.
pub use crate::error::Error;

/// Protocol adapter result type.
pub type Result<T> = core::result::Result<T, Error>;
