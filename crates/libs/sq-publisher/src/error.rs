//! Publisher error types.

use sq_protocol::SqTestListReport;

/// Publisher errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Payload adaptation failed, e.g. the TA wrapper is enabled but no TA
    /// parameters were bound. Posting is aborted for the build, but the
    /// known-test listing produced before the failure is carried along so
    /// callers can still publish it.
    #[error("cannot adapt results: {source}")]
    Adaptation {
        source: sq_protocol::error::Error,
        /// Test listing of a wrapped build, written before adaptation.
        test_list: Option<SqTestListReport>,
    },

    /// The job's failure policy fails the build on partial post failure.
    #[error("{failed} of {total} server post(s) failed")]
    PostFailures {
        /// Posts that were not accepted.
        failed: usize,
        /// Posts attempted.
        total: usize,
    },
}
