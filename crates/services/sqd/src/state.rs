//! Shared service state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::warn;
use uuid::Uuid;

use sq_bridge::SqParameterHandoff;
use sq_config::{SqJobConfig, SqUserConfig};
use sq_protocol::{SqJobInformation, SqTestListReport};
use sq_publisher::SqPublisher;

use crate::prelude::*;

/// A triggered build the completion callback has not reported yet.
///
/// Entries expire: a build whose completion never arrives is swept on the
/// next table access instead of being retained forever.
#[derive(Debug, Clone)]
pub struct PendingBuild {
    pub job_name: String,
    pub build_number: u32,
    started_at: Instant,
}

/// State shared across request handlers.
#[derive(Clone)]
pub struct SqdState {
    pub config: Arc<SqUserConfig>,
    pub publisher: Arc<SqPublisher>,
    pub handoff: Arc<SqParameterHandoff>,
    /// Base URL builds and jobs are addressed under.
    pub public_url: String,
    /// Lifetime of a pending build whose completion never arrives.
    pending_ttl: Duration,
    /// Per-job build counters.
    build_numbers: Arc<Mutex<HashMap<String, u32>>>,
    /// Builds triggered but not yet completed, by correlation id.
    pending: Arc<Mutex<HashMap<Uuid, PendingBuild>>>,
    /// Latest test-list document per job.
    test_lists: Arc<Mutex<HashMap<String, SqTestListReport>>>,
}

impl SqdState {
    pub fn new(config: SqUserConfig, publisher: SqPublisher, public_url: String) -> Self {
        Self {
            config: Arc::new(config),
            publisher: Arc::new(publisher),
            handoff: Arc::new(SqParameterHandoff::default()),
            public_url,
            pending_ttl: SqParameterHandoff::DEFAULT_TTL,
            build_numbers: Arc::new(Mutex::new(HashMap::new())),
            pending: Arc::new(Mutex::new(HashMap::new())),
            test_lists: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Override the pending-build lifetime.
    pub fn with_pending_ttl(mut self, ttl: Duration) -> Self {
        self.pending_ttl = ttl;
        self
    }

    pub fn job(&self, name: &str) -> Result<&SqJobConfig> {
        self.config
            .job(name)
            .ok_or_else(|| Error::UnknownJob(name.to_string()))
    }

    /// Allocate the next build of a job and remember it until completion.
    pub fn start_build(&self, job_name: &str) -> (Uuid, u32) {
        let build_id = Uuid::new_v4();
        let mut numbers = lock(&self.build_numbers);
        let number = numbers
            .entry(job_name.to_string())
            .and_modify(|n| *n += 1)
            .or_insert(1);
        let build_number = *number;
        drop(numbers);

        self.lock_pending().insert(
            build_id,
            PendingBuild {
                job_name: job_name.to_string(),
                build_number,
                started_at: Instant::now(),
            },
        );
        (build_id, build_number)
    }

    /// Take a pending build out of the table. Expired entries were already
    /// swept and report as unknown.
    pub fn finish_build(&self, build_id: Uuid) -> Result<PendingBuild> {
        self.lock_pending()
            .remove(&build_id)
            .ok_or(Error::UnknownBuild(build_id))
    }

    /// Pending builds currently alive, for diagnostics.
    pub fn pending_count(&self) -> usize {
        self.lock_pending().len()
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, PendingBuild>> {
        let mut pending = lock(&self.pending);
        let ttl = self.pending_ttl;
        pending.retain(|build_id, entry| {
            let alive = entry.started_at.elapsed() <= ttl;
            if !alive {
                warn!(
                    "discarding pending build {build_id} ({} #{}), no completion arrived",
                    entry.job_name, entry.build_number
                );
            }
            alive
        });
        pending
    }

    /// Snapshot of the job and build fields the pipeline reads.
    pub fn job_information(&self, job: &SqJobConfig, build_number: u32) -> SqJobInformation {
        let job_url = format!("{}/jobs/{}", self.public_url, job.name);
        SqJobInformation {
            job_name: job.name.clone(),
            build_url: format!("{job_url}/builds/{build_number}"),
            job_url,
            build_number,
            ta_wrapper_enabled: job.ta_wrapper,
        }
    }

    pub fn store_test_list(&self, job_name: &str, report: SqTestListReport) {
        lock(&self.test_lists).insert(job_name.to_string(), report);
    }

    pub fn test_list(&self, job_name: &str) -> Result<SqTestListReport> {
        lock(&self.test_lists)
            .get(job_name)
            .cloned()
            .ok_or_else(|| Error::NoTestList(job_name.to_string()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sq_config::{SqGlobalConfig, SqServerRegistry};

    fn state() -> SqdState {
        let config = SqUserConfig {
            global: SqGlobalConfig {
                version: "1.0.0".into(),
            },
            servers: vec![],
            jobs: vec![SqJobConfig {
                name: "sdl-port".into(),
                selected_servers: vec![],
                ta_wrapper: true,
                on_post_failure: Default::default(),
                parameters: Default::default(),
            }],
        };
        let publisher = SqPublisher::new(SqServerRegistry::new(vec![]).unwrap());
        SqdState::new(config, publisher, "http://127.0.0.1:3000".into())
    }

    #[test]
    fn build_numbers_increment_per_job() {
        let state = state();
        let (id_1, n_1) = state.start_build("sdl-port");
        let (id_2, n_2) = state.start_build("sdl-port");
        assert_eq!((n_1, n_2), (1, 2));
        assert_ne!(id_1, id_2);
    }

    #[test]
    fn finishing_an_unknown_build_is_an_error() {
        let state = state();
        let (build_id, _) = state.start_build("sdl-port");
        assert!(state.finish_build(build_id).is_ok());
        assert!(matches!(
            state.finish_build(build_id),
            Err(Error::UnknownBuild(_))
        ));
    }

    #[test]
    fn stale_pending_builds_are_swept() {
        let state = state().with_pending_ttl(Duration::ZERO);
        let (build_id, _) = state.start_build("sdl-port");
        std::thread::sleep(Duration::from_millis(5));
        assert!(matches!(
            state.finish_build(build_id),
            Err(Error::UnknownBuild(_))
        ));
    }

    #[test]
    fn pending_table_does_not_grow_without_bound() {
        let state = state().with_pending_ttl(Duration::from_millis(1));
        for _ in 0..200 {
            state.start_build("sdl-port");
        }
        std::thread::sleep(Duration::from_millis(10));
        state.start_build("sdl-port");
        assert_eq!(state.pending_count(), 1);
    }

    #[test]
    fn job_information_derives_urls() {
        let state = state();
        let job = state.job("sdl-port").unwrap();
        let info = state.job_information(job, 4);
        assert_eq!(info.job_url, "http://127.0.0.1:3000/jobs/sdl-port");
        assert_eq!(info.build_url, "http://127.0.0.1:3000/jobs/sdl-port/builds/4");
        assert!(info.ta_wrapper_enabled);
    }
}
