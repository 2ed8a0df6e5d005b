//! Result posting for the TM publisher.
//!
//! On build completion the publisher flattens the build's result containers,
//! adapts them to the generic TM shape or the TA-compatible shape, and posts
//! the payload to every TM server the job selected. Per-server outcomes are
//! collected and reported in aggregate; whether partial failure fails the
//! build is governed by the job's failure policy.

pub mod error;
pub mod poster;
pub mod prelude;
pub mod publisher;

pub use poster::{SqAcknowledgement, SqPostOutcome, SqPostReport, SqPostStatus, post_all};
pub use publisher::{SqBuildPublication, SqPublisher};
