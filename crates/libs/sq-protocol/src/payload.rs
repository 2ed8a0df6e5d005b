//! The two wire payload shapes and the selection rule between them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sq_results::{SqTestOutcome, SqTestStatus};

use crate::{job_info::SqJobInformation, prelude::*, ta_parameters::SqTaParameters};

/// Per-status counts over the flattened outcome sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqTestStatistics {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
}

impl SqTestStatistics {
    pub fn from_outcomes(outcomes: &[SqTestOutcome]) -> Self {
        let mut stats = Self {
            total: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome.status {
                SqTestStatus::Pass => stats.passed += 1,
                SqTestStatus::Fail => stats.failed += 1,
                SqTestStatus::Error => stats.errors += 1,
                SqTestStatus::Skip => stats.skipped += 1,
            }
        }
        stats
    }

    /// Overall status word the TA callback protocol reports.
    pub fn overall_status(&self) -> &'static str {
        if self.errors > 0 {
            "error"
        } else if self.failed > 0 {
            "failure"
        } else {
            "success"
        }
    }
}

/// Generic shape: job identity, notified servers and outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqTmPayload {
    pub job_name: String,
    pub job_url: String,
    pub build_number: u32,
    pub build_url: String,
    /// Names of the servers this notification targets.
    pub notified_servers: Vec<String>,
    pub statistics: SqTestStatistics,
    pub results: Vec<SqTestOutcome>,
    pub completed_at: DateTime<Utc>,
}

/// A test record as the TA callback protocol reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqTaTestRecord {
    /// Slash-joined suite and test name, the TA path convention.
    pub test_path: String,
    pub status: SqTestStatus,
    pub duration_millis: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,
}

/// TA-compatible shape: what an unmodified TM consumer expects from a TA
/// server's result callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqTaPayload {
    pub external_job_id: String,
    pub execution_id: String,
    #[serde(rename = "notificationURL")]
    pub notification_url: String,
    /// Overall status word: `success`, `failure` or `error`.
    pub status: String,
    pub statistics: SqTestStatistics,
    pub tests: Vec<SqTaTestRecord>,
}

/// An adapted payload, ready to post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqPayload {
    Tm(SqTmPayload),
    Ta(SqTaPayload),
}

impl SqPayload {
    /// Server-relative endpoint this payload shape is posted to.
    pub fn endpoint(&self) -> &'static str {
        match self {
            SqPayload::Tm(_) => "result-import",
            SqPayload::Ta(_) => "automated-executions/results",
        }
    }
}

/// Adapt the flattened outcomes to a wire payload.
///
/// Selection rule: the TA-compatible shape is used iff the TA wrapper is
/// enabled for the job and TA parameters were bound to the build. The
/// wrapper being enabled without bound parameters is a configuration error.
pub fn build_payload(
    job: &SqJobInformation,
    outcomes: Vec<SqTestOutcome>,
    notified_servers: Vec<String>,
    ta: Option<&SqTaParameters>,
) -> Result<SqPayload> {
    let statistics = SqTestStatistics::from_outcomes(&outcomes);

    if !job.ta_wrapper_enabled {
        return Ok(SqPayload::Tm(SqTmPayload {
            job_name: job.job_name.clone(),
            job_url: job.job_url.clone(),
            build_number: job.build_number,
            build_url: job.build_url.clone(),
            notified_servers,
            statistics,
            results: outcomes,
            completed_at: Utc::now(),
        }));
    }

    let ta = ta.ok_or(Error::TaParametersUnbound)?;
    if ta.external_job_id.is_empty() {
        return Err(Error::MissingTaField("externalJobId"));
    }
    if ta.notification_url.is_empty() {
        return Err(Error::MissingTaField("notificationURL"));
    }

    let tests = outcomes
        .into_iter()
        .map(|outcome| SqTaTestRecord {
            test_path: format!("{}/{}", outcome.suite_name, outcome.test_name),
            status: outcome.status,
            duration_millis: outcome.duration_millis,
            report_url: outcome.report_url,
        })
        .collect();

    Ok(SqPayload::Ta(SqTaPayload {
        external_job_id: ta.external_job_id.clone(),
        execution_id: ta.execution_id.clone(),
        notification_url: ta.notification_url.clone(),
        status: statistics.overall_status().to_string(),
        statistics,
        tests,
    }))
}
