//! Per-test outcome types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Recorded status of a single test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqTestStatus {
    /// Test ran and passed.
    Pass,
    /// Test ran and failed an assertion.
    Fail,
    /// Test could not run to completion.
    Error,
    /// Test was skipped.
    Skip,
}

/// A single test's recorded status and metadata.
///
/// Produced transiently per build by the extractor; not persisted beyond the
/// posting step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqTestOutcome {
    /// Name of the suite the test belongs to.
    pub suite_name: String,
    /// Name of the test.
    pub test_name: String,
    /// Recorded status.
    pub status: SqTestStatus,
    /// Wall-clock duration of the test run.
    pub duration_millis: u64,
    /// URL of the detailed report for this test, when one was published.
    pub report_url: Option<String>,
}

impl SqTestOutcome {
    pub fn new(
        suite_name: impl Into<String>,
        test_name: impl Into<String>,
        status: SqTestStatus,
        duration_millis: u64,
    ) -> Self {
        Self {
            suite_name: suite_name.into(),
            test_name: test_name.into(),
            status,
            duration_millis,
            report_url: None,
        }
    }
}

impl fmt::Display for SqTestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqTestStatus::Pass => write!(f, "pass"),
            SqTestStatus::Fail => write!(f, "fail"),
            SqTestStatus::Error => write!(f, "error"),
            SqTestStatus::Skip => write!(f, "skip"),
        }
    }
}

impl fmt::Display for SqTestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} [{}] ({} ms)",
            self.suite_name, self.test_name, self.status, self.duration_millis
        )
    }
}
