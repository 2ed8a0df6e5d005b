//! HTTP client library for posting to TM servers.
//!
//! This library provides a simplified wrapper around reqwest for making
//! HTTP requests with JSON serialization/deserialization support and
//! optional basic-auth credentials.
//!
//! # Examples
//!
//! ```rust,no_run
//! use serde_json::Value;
//! use sq_requests::SqApiClient;
//!
//! # async fn example() -> sq_requests::prelude::Result<()> {
//! let client = SqApiClient::new("https://tm.example.com/squash")?;
//! let ack: Value = client
//!     .post_json("result-import", &serde_json::json!({}), Some(("jenkins", "secret")))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod prelude;

use reqwest::header;
use serde::{Serialize, de::DeserializeOwned};

use crate::prelude::*;

/// HTTP client for one TM server base URL.
pub struct SqApiClient {
    url: String,
    pub client: reqwest::Client,
}

impl SqApiClient {
    /// Creates a new API client with the given base URL.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "content-type",
            header::HeaderValue::from_static("application/json"),
        );
        let client = reqwest::ClientBuilder::new()
            .default_headers(headers)
            .build()
            .map_err(Error::Client)?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Constructs the full URL path for an endpoint.
    fn path(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.url.trim_end_matches('/'))
    }

    /// Makes a POST request with a JSON body and deserializes the response.
    ///
    /// Failure kinds stay distinct: a request that never produced a
    /// response is [`Error::Network`], a non-2xx status is
    /// [`Error::Status`], and a 2xx body that does not deserialize is
    /// [`Error::MalformedBody`].
    pub async fn post_json<B, T>(
        &self,
        endpoint: &str,
        body: &B,
        basic_auth: Option<(&str, &str)>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.client.post(self.path(endpoint)).json(body);
        if let Some((username, password)) = basic_auth {
            request = request.basic_auth(username, Some(password));
        }

        let response = request.send().await.map_err(Error::Network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        let text = response.text().await.map_err(Error::Network)?;
        serde_json::from_str(&text).map_err(Error::MalformedBody)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_joins_without_doubled_slash() {
        let client = SqApiClient::new("https://tm.example.com/squash/").unwrap();
        assert_eq!(
            client.path("result-import"),
            "https://tm.example.com/squash/result-import"
        );
    }
}
