//! Registered TM server endpoints and per-job server selections.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account used to authenticate against a TM server.
///
/// The account must belong to a group allowed to receive automated test
/// results on the TM side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqCredential {
    /// Login on the TM server.
    pub username: String,
    /// Password on the TM server.
    pub password: String,
}

/// A TM server endpoint registered in the global configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqTmServer {
    /// Display name, unique across the registry.
    pub name: String,
    /// Base URL of the TM server API.
    pub url: String,
    /// Account used when posting to this server.
    pub credential: SqCredential,
}

/// A job's reference to a registered TM server, by name.
///
/// Selections may outlive the server they point at. Dangling selections are
/// skipped at posting time rather than treated as fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqSelectedServer {
    /// Name of the registered server to notify.
    pub name: String,
}

impl SqSelectedServer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for SqTmServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}
