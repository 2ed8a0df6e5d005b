//! Posts an adapted payload to the selected TM servers.
//!
//! Each post is independent: one server failing never prevents posting to
//! the others. Per-server outcomes are collected into a report and handed
//! back to the caller; partial failure is never raised from here.

use std::fmt;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sq_config::{SqSelectedServer, SqServerRegistry, SqTmServer};
use sq_protocol::SqPayload;
use sq_requests::SqApiClient;

/// Acknowledgement fields a TM server answers a post with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqAcknowledgement {
    /// Whether the server accepted the results.
    pub accepted: bool,
    /// Optional server-side detail.
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome of posting to one server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SqPostStatus {
    /// The server acknowledged and accepted the results.
    Accepted {
        #[serde(default)]
        message: Option<String>,
    },
    /// The server acknowledged but declined the results.
    Rejected {
        #[serde(default)]
        message: Option<String>,
    },
    /// The server answered with a non-success HTTP status.
    HttpError { status: u16 },
    /// The request never produced an HTTP response.
    NetworkError { detail: String },
    /// The server answered 2xx but the acknowledgement did not parse.
    MalformedAck { detail: String },
}

impl SqPostStatus {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SqPostStatus::Accepted { .. })
    }
}

/// Per-server post outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqPostOutcome {
    /// Name of the registered server.
    pub server: String,
    pub status: SqPostStatus,
}

/// Everything that happened during one build's posting step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqPostReport {
    /// One outcome per resolved server, in selection order.
    pub outcomes: Vec<SqPostOutcome>,
    /// Selected names that did not resolve to a registered server.
    pub skipped: Vec<String>,
}

impl SqPostReport {
    pub fn all_accepted(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_accepted())
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !o.status.is_accepted())
            .count()
    }
}

impl fmt::Display for SqPostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqPostStatus::Accepted { message: Some(msg) } => write!(f, "accepted ({msg})"),
            SqPostStatus::Accepted { message: None } => write!(f, "accepted"),
            SqPostStatus::Rejected { message: Some(msg) } => write!(f, "rejected ({msg})"),
            SqPostStatus::Rejected { message: None } => write!(f, "rejected"),
            SqPostStatus::HttpError { status } => write!(f, "HTTP error {status}"),
            SqPostStatus::NetworkError { detail } => write!(f, "network error: {detail}"),
            SqPostStatus::MalformedAck { detail } => {
                write!(f, "malformed acknowledgement: {detail}")
            }
        }
    }
}

impl fmt::Display for SqPostReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Posted to {} server(s), {} failure(s):",
            self.outcomes.len(),
            self.failed_count()
        )?;
        for outcome in &self.outcomes {
            writeln!(f, "  {} : {}", outcome.server, outcome.status)?;
        }
        for name in &self.skipped {
            writeln!(f, "  {name} : skipped, not registered")?;
        }
        Ok(())
    }
}

/// Post the payload to every selected server that resolves in the registry.
///
/// Dangling selections are skipped silently. Posts to the resolved servers
/// run concurrently; the servers are independent and only read-only server
/// data is shared.
pub async fn post_all(
    payload: &SqPayload,
    selected: &[SqSelectedServer],
    registry: &SqServerRegistry,
) -> SqPostReport {
    let mut servers: Vec<&SqTmServer> = Vec::new();
    let mut skipped = Vec::new();
    for selection in selected {
        match registry.resolve(&selection.name) {
            Some(server) => servers.push(server),
            None => {
                debug!("selected server '{}' is not registered, skipping", selection.name);
                skipped.push(selection.name.clone());
            }
        }
    }

    let posts = servers.iter().map(|server| async {
        let status = post_one(server, payload).await;
        if !status.is_accepted() {
            warn!("posting to '{}' failed: {status}", server.name);
        }
        SqPostOutcome {
            server: server.name.clone(),
            status,
        }
    });

    SqPostReport {
        outcomes: join_all(posts).await,
        skipped,
    }
}

async fn post_one(server: &SqTmServer, payload: &SqPayload) -> SqPostStatus {
    let client = match SqApiClient::new(&server.url) {
        Ok(client) => client,
        Err(err) => {
            return SqPostStatus::NetworkError {
                detail: err.to_string(),
            };
        }
    };

    let auth = Some((
        server.credential.username.as_str(),
        server.credential.password.as_str(),
    ));

    match client
        .post_json::<_, SqAcknowledgement>(payload.endpoint(), payload, auth)
        .await
    {
        Ok(SqAcknowledgement {
            accepted: true,
            message,
        }) => SqPostStatus::Accepted { message },
        Ok(SqAcknowledgement { message, .. }) => SqPostStatus::Rejected { message },
        Err(sq_requests::error::Error::Status(status)) => SqPostStatus::HttpError { status },
        Err(sq_requests::error::Error::MalformedBody(err)) => SqPostStatus::MalformedAck {
            detail: err.to_string(),
        },
        Err(err) => SqPostStatus::NetworkError {
            detail: err.to_string(),
        },
    }
}
