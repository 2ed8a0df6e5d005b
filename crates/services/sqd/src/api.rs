//! HTTP entry points the host collaborators invoke.
//!
//! Three routes model the host's dispatch passes:
//!
//! - `POST /v1/jobs/{job}/trigger` runs the parameter bridge over an
//!   inbound trigger request and allocates the build it starts.
//! - `POST /v1/builds/{id}/complete` is the build-completion callback that
//!   runs extract → adapt → post.
//! - `GET /v1/jobs/{job}/test-list` serves the known-test listing written
//!   by the last wrapped build.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::info;
use uuid::Uuid;

use sq_bridge::apply_to;
use sq_protocol::{SqTaParameters, SqTestListReport};
use sq_publisher::SqPostReport;
use sq_results::SqResultContainer;

use crate::prelude::*;
use crate::state::SqdState;

/// Response to an inbound trigger request.
#[derive(Debug, Serialize, Deserialize)]
pub struct TriggerResponse {
    /// Correlation id of the build this trigger started.
    pub build_id: Uuid,
    /// Build number within the job.
    pub build_number: u32,
    /// Whether the request carried the full TA signature.
    pub ta_bound: bool,
}

/// Body of the build-completion callback.
#[derive(Debug, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The build's result-container tree, absent when no result parser ran.
    #[serde(default)]
    pub results: Option<SqResultContainer>,
}

/// Response to the build-completion callback.
#[derive(Debug, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub job_name: String,
    pub build_number: u32,
    pub report: SqPostReport,
}

async fn trigger_job(
    State(state): State<SqdState>,
    Path(job_name): Path<String>,
    Json(params): Json<HashMap<String, String>>,
) -> Result<Json<TriggerResponse>> {
    let job = state.job(&job_name)?;
    let (build_id, build_number) = state.start_build(&job.name);

    // Binding is only attempted for wrapped jobs; a TA-shaped request to a
    // plain job is a normal trigger.
    let ta_bound = job.ta_wrapper && state.handoff.observe_trigger(build_id, &params);

    info!(
        "triggered {} #{build_number} (build {build_id}, ta_bound: {ta_bound})",
        job.name
    );
    Ok(Json(TriggerResponse {
        build_id,
        build_number,
        ta_bound,
    }))
}

async fn complete_build(
    State(state): State<SqdState>,
    Path(build_id): Path<Uuid>,
    Json(completion): Json<CompletionRequest>,
) -> Result<Json<CompletionResponse>> {
    let pending = state.finish_build(build_id)?;
    let job = state.job(&pending.job_name)?;
    let info = state.job_information(job, pending.build_number);

    // Claim staged parameters exactly once, then let the job's own pinned
    // parameters take precedence over the synthesized ones.
    let claimed = state.handoff.claim(build_id);
    let mut params = job.parameters.clone();
    if let Some(ta) = &claimed {
        apply_to(ta, &mut params);
    }
    let effective = SqTaParameters::from_params(&params);

    let publication = state
        .publisher
        .publish_build(&info, job, completion.results.as_ref(), effective.as_ref())
        .await
        .map_err(|err| {
            // A wrapped build that failed adaptation still wrote its test
            // listing; keep serving it.
            if let sq_publisher::prelude::Error::Adaptation {
                test_list: Some(test_list),
                ..
            } = &err
            {
                state.store_test_list(&job.name, test_list.clone());
            }
            err
        })?;

    if let Some(test_list) = publication.test_list {
        state.store_test_list(&job.name, test_list);
    }

    Ok(Json(CompletionResponse {
        job_name: pending.job_name,
        build_number: pending.build_number,
        report: publication.report,
    }))
}

async fn job_test_list(
    State(state): State<SqdState>,
    Path(job_name): Path<String>,
) -> Result<Json<SqTestListReport>> {
    state.job(&job_name)?;
    Ok(Json(state.test_list(&job_name)?))
}

fn v1(path: &str) -> String {
    format!("/v1/{path}")
}

pub fn router(state: SqdState) -> Router {
    Router::new()
        .route(&v1("jobs/{job}/trigger"), post(trigger_job))
        .route(&v1("jobs/{job}/test-list"), get(job_test_list))
        .route(&v1("builds/{build_id}/complete"), post(complete_build))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn setup_api(state: SqdState, addr: &str) -> Result<JoinHandle<Result<()>>> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    let handle = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
        Ok(())
    });

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sq_config::{SqGlobalConfig, SqJobConfig, SqServerRegistry, SqUserConfig};
    use sq_protocol::TA_SIGNATURE;
    use sq_publisher::SqPublisher;
    use sq_results::{SqTestOutcome, SqTestStatus};

    /// Serve the API on a random port and return its base URL.
    async fn spawn_api(jobs: Vec<SqJobConfig>) -> String {
        let config = SqUserConfig {
            global: SqGlobalConfig {
                version: "1.0.0".into(),
            },
            servers: vec![],
            jobs,
        };
        let publisher = SqPublisher::new(SqServerRegistry::new(vec![]).unwrap());
        let state = SqdState::new(config, publisher, "http://ci.test".into());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    fn wrapped_job(name: &str) -> SqJobConfig {
        SqJobConfig {
            name: name.into(),
            selected_servers: vec![],
            ta_wrapper: true,
            on_post_failure: Default::default(),
            parameters: Default::default(),
        }
    }

    fn full_params() -> HashMap<String, String> {
        TA_SIGNATURE
            .iter()
            .map(|name| (name.to_string(), format!("value-of-{name}")))
            .collect()
    }

    fn leaf_results() -> serde_json::Value {
        let container = SqResultContainer::Leaf(vec![
            SqTestOutcome::new("smoke", "boots", SqTestStatus::Pass, 5),
            SqTestOutcome::new("smoke", "renders", SqTestStatus::Pass, 9),
        ]);
        serde_json::json!({ "results": container })
    }

    #[tokio::test]
    async fn trigger_complete_and_test_list_roundtrip() {
        let base = spawn_api(vec![wrapped_job("sdl-port")]).await;
        let client = reqwest::Client::new();

        let trigger: TriggerResponse = client
            .post(format!("{base}/jobs/sdl-port/trigger"))
            .json(&full_params())
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(trigger.ta_bound);
        assert_eq!(trigger.build_number, 1);

        let completion: CompletionResponse = client
            .post(format!("{base}/builds/{}/complete", trigger.build_id))
            .json(&leaf_results())
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(completion.job_name, "sdl-port");
        assert!(completion.report.outcomes.is_empty());

        let test_list: SqTestListReport = client
            .get(format!("{base}/jobs/sdl-port/test-list"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(test_list.tests.len(), 2);
    }

    #[tokio::test]
    async fn unknown_job_is_not_found() {
        let base = spawn_api(vec![wrapped_job("sdl-port")]).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base}/jobs/missing/trigger"))
            .json(&HashMap::<String, String>::new())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 404);
    }

    #[tokio::test]
    async fn partial_signature_completes_as_non_ta_and_fails_wrapped_job() {
        let base = spawn_api(vec![wrapped_job("sdl-port")]).await;
        let client = reqwest::Client::new();

        let mut params = full_params();
        params.remove("executionId");
        let trigger: TriggerResponse = client
            .post(format!("{base}/jobs/sdl-port/trigger"))
            .json(&params)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(!trigger.ta_bound);

        // Wrapper enabled, nothing bound: configuration error, not a
        // silent downgrade.
        let response = client
            .post(format!("{base}/builds/{}/complete", trigger.build_id))
            .json(&leaf_results())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 422);

        // The test listing written before the aborted posting is served.
        let test_list: SqTestListReport = client
            .get(format!("{base}/jobs/sdl-port/test-list"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(test_list.tests.len(), 2);
    }

    #[tokio::test]
    async fn completing_twice_is_not_found_the_second_time() {
        let base = spawn_api(vec![wrapped_job("sdl-port")]).await;
        let client = reqwest::Client::new();

        let trigger: TriggerResponse = client
            .post(format!("{base}/jobs/sdl-port/trigger"))
            .json(&full_params())
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let first = client
            .post(format!("{base}/builds/{}/complete", trigger.build_id))
            .json(&leaf_results())
            .send()
            .await
            .unwrap();
        assert!(first.status().is_success());

        let second = client
            .post(format!("{base}/builds/{}/complete", trigger.build_id))
            .json(&leaf_results())
            .send()
            .await
            .unwrap();
        assert_eq!(second.status().as_u16(), 404);
    }
}
