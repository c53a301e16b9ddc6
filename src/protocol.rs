//! Wire types for the `/ai/query/` endpoint.
//!
//! Shared by the server handler and the widget's HTTP transport so both
//! sides agree on the JSON contract.

use serde::{Deserialize, Serialize};
use url::Url;

/// Path of the query endpoint.
pub const QUERY_PATH: &str = "/ai/query/";

/// Fallback shown when a failure response carries no error text.
pub const GENERIC_ERROR: &str = "Something went wrong";

/// Request body for `POST /ai/query/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// User query text.
    pub query: String,
}

/// Response body for `POST /ai/query/`.
///
/// `response` is set when `success` is true; `error` may be set otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResponse {
    /// Successful answer.
    #[must_use]
    pub fn ok(response: impl Into<String>) -> Self {
        Self {
            success: true,
            response: Some(response.into()),
            error: None,
        }
    }

    /// Application-reported failure.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(error.into()),
        }
    }
}

/// Resolve an absolute route `path` under `base`, keeping any path prefix
/// `base` carries (`http://host/app` + `/ai/query/` is `http://host/app/ai/query/`).
pub fn service_url(base: &str, path: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(base)?;
    if !base.path().ends_with('/') {
        let prefixed = format!("{}/", base.path());
        base.set_path(&prefixed);
    }
    base.join(path.trim_start_matches('/'))
}
