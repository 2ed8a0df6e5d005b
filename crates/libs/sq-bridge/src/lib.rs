//! Parameter bridge for TA-style trigger requests.
//!
//! When the TA wrapper is enabled, an inbound trigger request carrying the
//! six-field TA signature synthesizes the equivalent build parameters and
//! makes them visible to the build the trigger starts. The request pass and
//! the build pass share nothing but a correlation id, so the bridge stages
//! the parameters in an explicit keyed handoff with mandatory expiry and
//! single-claim semantics.

pub mod handoff;

pub use handoff::{SqParameterHandoff, apply_to};
