//! Configuration management for the TM publisher.
//!
//! Provides the registered TM server entries, per-job publisher settings and
//! the read-only registry used by the posting step.
//!
//! # Usage
//!
//! ```rust
//! use sq_config::{SqServerRegistry, SqUserConfig};
//!
//! let config = SqUserConfig::from_toml(
//!     r#"
//!     [global]
//!     version = "1.0.0"
//!
//!     [[servers]]
//!     name = "tm-production"
//!     url = "https://tm.example.com/squash"
//!     credential = { username = "jenkins", password = "secret" }
//!     "#,
//! )
//! .unwrap();
//!
//! let registry = SqServerRegistry::new(config.servers).unwrap();
//! assert!(registry.resolve("tm-production").is_some());
//! ```

pub mod error;
pub mod prelude;
pub mod sq_config;
pub mod sq_registry;
pub mod sq_server;

pub use sq_config::{SqGlobalConfig, SqJobConfig, SqPostFailurePolicy, SqUserConfig};
pub use sq_registry::SqServerRegistry;
pub use sq_server::{SqCredential, SqSelectedServer, SqTmServer};
