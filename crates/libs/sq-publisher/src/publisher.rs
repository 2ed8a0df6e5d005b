//! Build-completion entry point: extract, adapt, post.

use tracing::{error, info};

use sq_config::{SqJobConfig, SqPostFailurePolicy, SqServerRegistry};
use sq_protocol::{SqJobInformation, SqTaParameters, SqTestListReport, build_payload};
use sq_results::{SqResultContainer, collect_outcomes};

use crate::{
    poster::{SqPostReport, post_all},
    prelude::*,
};

/// What one build's publication produced.
#[derive(Debug)]
pub struct SqBuildPublication {
    /// Per-server posting outcomes.
    pub report: SqPostReport,
    /// Known-test listing, produced when the TA wrapper is active.
    pub test_list: Option<SqTestListReport>,
}

/// Publishes build results to the servers a job selected.
pub struct SqPublisher {
    registry: SqServerRegistry,
}

impl SqPublisher {
    pub fn new(registry: SqServerRegistry) -> Self {
        Self { registry }
    }

    /// Run the publication pipeline for one completed build.
    ///
    /// The result container may be absent; a build without tests is still
    /// reported. The TA wrapper being enabled without bound parameters is a
    /// configuration error: it is surfaced before any posting happens.
    /// Per-server failures never abort the remaining posts; whether they
    /// fail the build is decided by the job's failure policy.
    pub async fn publish_build(
        &self,
        job: &SqJobInformation,
        config: &SqJobConfig,
        container: Option<&SqResultContainer>,
        ta: Option<&SqTaParameters>,
    ) -> Result<SqBuildPublication> {
        let outcomes = collect_outcomes(container);
        info!("{job}: publishing {} test outcome(s)", outcomes.len());

        let test_list = job.ta_wrapper_enabled.then(|| {
            SqTestListReport::from_outcomes(&job.job_name, job.build_number, &outcomes)
        });

        let notified_servers = config
            .selected_servers
            .iter()
            .map(|s| s.name.clone())
            .collect();

        let payload = match build_payload(job, outcomes, notified_servers, ta) {
            Ok(payload) => payload,
            Err(source) => {
                error!("{job}: cannot adapt results, posting aborted: {source}");
                return Err(Error::Adaptation { source, test_list });
            }
        };

        let report = post_all(&payload, &config.selected_servers, &self.registry).await;
        info!("{job}: {report}");

        if config.on_post_failure == SqPostFailurePolicy::FailBuild && !report.all_accepted() {
            return Err(Error::PostFailures {
                failed: report.failed_count(),
                total: report.outcomes.len(),
            });
        }

        Ok(SqBuildPublication { report, test_list })
    }
}
