//! Per-build job snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Read-only snapshot of the job and build being published.
///
/// Assembled once per build so the extraction, adaptation and posting steps
/// do not re-derive these fields at every call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqJobInformation {
    /// Job name.
    pub job_name: String,
    /// Absolute URL of the job.
    pub job_url: String,
    /// Build number within the job.
    pub build_number: u32,
    /// Absolute URL of the build.
    pub build_url: String,
    /// Whether the TA wrapper is enabled for this job.
    pub ta_wrapper_enabled: bool,
}

impl fmt::Display for SqJobInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wrapper = if self.ta_wrapper_enabled {
            "with TA wrapper"
        } else {
            "without TA wrapper"
        };
        write!(f, "{} #{} {}", self.job_name, self.build_number, wrapper)
    }
}
