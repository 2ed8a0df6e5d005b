//! HTTP client error types.

/// HTTP client errors.
///
/// The variants keep network-level failures, HTTP-level failures and
/// undeserializable response bodies distinct so callers can report them as
/// different failure kinds.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP error status {0}")]
    Status(u16),

    /// The server answered 2xx but the body did not deserialize.
    #[error("Malformed response body: {0}")]
    MalformedBody(#[source] serde_json::Error),

    /// The underlying client could not be constructed.
    #[error(transparent)]
    Client(reqwest::Error),
}
