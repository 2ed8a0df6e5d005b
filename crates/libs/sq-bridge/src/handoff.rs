//! Keyed, single-claim, expiring parameter staging.
//!
//! The inbound trigger request and the build it starts are processed in two
//! separate passes with no shared object between them. Synthesized TA
//! parameters are therefore staged under the build correlation id by the
//! trigger pass and claimed exactly once by the build-start pass. Claiming
//! never blocks; an entry that is not claimed before its expiry is swept
//! and must never leak into a later, unrelated build.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use uuid::Uuid;

use sq_protocol::SqTaParameters;

struct StagedEntry {
    params: SqTaParameters,
    staged_at: Instant,
}

/// Staging slots for synthesized TA parameters, keyed by build correlation id.
pub struct SqParameterHandoff {
    slots: Mutex<HashMap<Uuid, StagedEntry>>,
    ttl: Duration,
}

impl SqParameterHandoff {
    /// Default lifetime of an unclaimed staged entry.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Compare an inbound trigger's parameters against the TA signature and
    /// stage the synthesized parameters on a full match.
    ///
    /// Returns `true` iff the signature bound. A partial match stages
    /// nothing: the trigger is treated as a normal, non-TA build trigger.
    pub fn observe_trigger(&self, key: Uuid, params: &HashMap<String, String>) -> bool {
        match SqTaParameters::from_params(params) {
            Some(ta) => {
                info!("TA signature matched for build {key}, staging parameters");
                self.stage(key, ta);
                true
            }
            None => {
                debug!("trigger for build {key} does not carry the TA signature");
                false
            }
        }
    }

    /// Stage parameters under a correlation key.
    ///
    /// Overwriting an existing entry means two triggers shared a key, which
    /// the caller should never let happen; the older entry is dropped with
    /// a warning.
    pub fn stage(&self, key: Uuid, params: SqTaParameters) {
        let mut slots = self.lock_and_sweep();
        let entry = StagedEntry {
            params,
            staged_at: Instant::now(),
        };
        if slots.insert(key, entry).is_some() {
            warn!("staged TA parameters for build {key} were overwritten before being claimed");
        }
    }

    /// Claim the staged parameters for a build, exactly once.
    ///
    /// Returns `None` when nothing was staged under the key or the entry
    /// expired; the build then proceeds as a non-TA build.
    pub fn claim(&self, key: Uuid) -> Option<SqTaParameters> {
        let mut slots = self.lock_and_sweep();
        match slots.remove(&key) {
            Some(entry) if entry.staged_at.elapsed() <= self.ttl => Some(entry.params),
            Some(_) => {
                warn!("staged TA parameters for build {key} expired before being claimed");
                None
            }
            None => None,
        }
    }

    /// Staged entries currently alive, for diagnostics.
    pub fn staged_count(&self) -> usize {
        self.lock_and_sweep().len()
    }

    fn lock_and_sweep(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, StagedEntry>> {
        let mut slots = match self.slots.lock() {
            Ok(slots) => slots,
            // Entries are plain data; a poisoned lock is still usable.
            Err(poisoned) => poisoned.into_inner(),
        };
        let ttl = self.ttl;
        slots.retain(|key, entry| {
            let alive = entry.staged_at.elapsed() <= ttl;
            if !alive {
                warn!("discarding unclaimed TA parameters staged for build {key}");
            }
            alive
        });
        slots
    }
}

impl Default for SqParameterHandoff {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}

/// Merge claimed parameters into the job's own parameter set.
///
/// Parameters explicitly present in the job's configuration always override
/// bridge-synthesized ones.
pub fn apply_to(params: &SqTaParameters, job_params: &mut HashMap<String, String>) {
    for (name, value) in params.to_params() {
        job_params.entry(name).or_insert(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sq_protocol::TA_SIGNATURE;

    fn full_params(tag: &str) -> HashMap<String, String> {
        TA_SIGNATURE
            .iter()
            .map(|name| (name.to_string(), format!("{tag}-{name}")))
            .collect()
    }

    #[test]
    fn full_signature_stages_and_claims_once() {
        let handoff = SqParameterHandoff::default();
        let key = Uuid::new_v4();

        assert!(handoff.observe_trigger(key, &full_params("a")));
        let claimed = handoff.claim(key).unwrap();
        assert_eq!(claimed.external_job_id, "a-externalJobId");

        // A second claim must find nothing.
        assert!(handoff.claim(key).is_none());
    }

    #[test]
    fn partial_signature_stays_idle() {
        let handoff = SqParameterHandoff::default();
        let key = Uuid::new_v4();

        let mut params = full_params("a");
        params.remove("executionId");

        assert!(!handoff.observe_trigger(key, &params));
        assert!(handoff.claim(key).is_none());
        assert_eq!(handoff.staged_count(), 0);
    }

    #[test]
    fn concurrent_builds_do_not_cross_contaminate() {
        let handoff = std::sync::Arc::new(SqParameterHandoff::default());
        let key_a = Uuid::new_v4();
        let key_b = Uuid::new_v4();

        let handles: Vec<_> = [(key_a, "a"), (key_b, "b")]
            .into_iter()
            .map(|(key, tag)| {
                let handoff = handoff.clone();
                let tag = tag.to_string();
                std::thread::spawn(move || {
                    assert!(handoff.observe_trigger(key, &full_params(&tag)));
                    let claimed = handoff.claim(key).unwrap();
                    assert_eq!(claimed.external_job_id, format!("{tag}-externalJobId"));
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(handoff.staged_count(), 0);
    }

    #[test]
    fn expired_entries_are_discarded_not_claimed() {
        let handoff = SqParameterHandoff::new(Duration::ZERO);
        let key = Uuid::new_v4();

        assert!(handoff.observe_trigger(key, &full_params("a")));
        std::thread::sleep(Duration::from_millis(5));
        assert!(handoff.claim(key).is_none());
    }

    #[test]
    fn job_configured_parameters_take_precedence() {
        let params = SqTaParameters::from_params(&full_params("bridge")).unwrap();
        let mut job_params = HashMap::from([
            ("operation".to_string(), "job-pinned".to_string()),
            ("branch".to_string(), "main".to_string()),
        ]);

        apply_to(&params, &mut job_params);

        assert_eq!(job_params["operation"], "job-pinned");
        assert_eq!(job_params["executionId"], "bridge-executionId");
        assert_eq!(job_params["branch"], "main");
    }
}
