//! Test outcome model and result extraction for the TM publisher.
//!
//! Build steps that parse test report files attach their results to the
//! build as containers. This crate models those containers as a tree
//! (a leaf holds outcomes, an aggregate holds the containers of sub-builds)
//! and provides the depth-first flattening the publisher runs on build
//! completion.

pub mod container;
pub mod outcome;

pub use container::{SqResultContainer, collect_outcomes};
pub use outcome::{SqTestOutcome, SqTestStatus};
