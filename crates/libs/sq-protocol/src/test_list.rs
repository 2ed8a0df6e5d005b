//! Known-test listing served to the TM server.
//!
//! When the TA wrapper is active, the job exposes a JSON document listing
//! the tests it knows about, written once per build. TM browses it when the
//! user binds an automated test to a test case.

use serde::{Deserialize, Serialize};

use sq_results::SqTestOutcome;

use crate::prelude::*;

/// One known test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqTestListEntry {
    pub suite_name: String,
    pub test_name: String,
}

/// The test-list document for one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqTestListReport {
    pub job_name: String,
    pub build_number: u32,
    pub tests: Vec<SqTestListEntry>,
}

impl SqTestListReport {
    /// Build the listing from a build's flattened outcomes, deduplicated
    /// and in first-seen order.
    pub fn from_outcomes(
        job_name: impl Into<String>,
        build_number: u32,
        outcomes: &[SqTestOutcome],
    ) -> Self {
        let mut tests: Vec<SqTestListEntry> = Vec::new();
        for outcome in outcomes {
            let entry = SqTestListEntry {
                suite_name: outcome.suite_name.clone(),
                test_name: outcome.test_name.clone(),
            };
            if !tests.contains(&entry) {
                tests.push(entry);
            }
        }
        Self {
            job_name: job_name.into(),
            build_number,
            tests,
        }
    }

    /// Serialize the document for the exposed resource.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
