//! Outbound query transport and anti-forgery token sources.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use url::Url;

use crate::protocol::{QUERY_PATH, QueryRequest, QueryResponse, service_url};

/// Default header carrying the anti-forgery token.
pub const DEFAULT_TOKEN_HEADER: &str = "X-CSRFToken";

/// Default name of the hidden field holding the anti-forgery token.
pub const DEFAULT_TOKEN_FIELD: &str = "csrfmiddlewaretoken";

/// The request could not be completed.
///
/// The `Display` text is what the widget shows after `Error: `.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Network or protocol failure while sending or reading.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The body did not follow the `{success, ...}` contract.
    #[error("Unexpected response (status {status}): {reason}")]
    InvalidResponse {
        /// HTTP status code of the response.
        status: u16,
        /// Why decoding failed.
        reason: String,
    },

    /// The host page holds no anti-forgery token.
    #[error("Anti-forgery token not found on the host page")]
    MissingToken,
}

/// Sends one query and returns the decoded reply.
#[async_trait::async_trait]
pub trait QueryTransport: Send + Sync {
    async fn send(&self, query: &str) -> Result<QueryResponse, TransportError>;
}

/// Supplies the anti-forgery token at send time.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// A token known up front.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl TokenSource for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Host page markup; the token is read from its hidden field on every call.
#[derive(Debug)]
pub struct HostPage {
    html: RwLock<String>,
    field_name: String,
}

impl HostPage {
    #[must_use]
    pub fn new(html: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            html: RwLock::new(html.into()),
            field_name: field_name.into(),
        }
    }

    /// Swap in freshly fetched markup.
    pub fn replace(&self, html: impl Into<String>) {
        *self.html.write().unwrap_or_else(PoisonError::into_inner) = html.into();
    }
}

impl TokenSource for HostPage {
    fn token(&self) -> Option<String> {
        let html = self.html.read().unwrap_or_else(PoisonError::into_inner);
        extract_hidden_field(&html, &self.field_name)
    }
}

/// Find the `value` of the `<input>` whose `name` is `field_name`.
#[must_use]
pub fn extract_hidden_field(html: &str, field_name: &str) -> Option<String> {
    let name_attr = format!(r#"name="{field_name}""#);
    html.split('<')
        .filter(|tag| tag.starts_with("input") && tag.contains(&name_attr))
        .find_map(|tag| {
            let start = tag.find(r#"value=""#)? + r#"value=""#.len();
            let len = tag[start..].find('"')?;
            Some(tag[start..start + len].to_string())
        })
        .filter(|value| !value.is_empty())
}

/// JSON-over-HTTP transport posting to `{server}/ai/query/`.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: Url,
    token_header: String,
    tokens: Arc<dyn TokenSource>,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("token_header", &self.token_header)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Create a transport for the server at `server_url`.
    pub fn new(
        server_url: impl AsRef<str>,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, url::ParseError> {
        Self::with_client(server_url, reqwest::Client::new(), tokens)
    }

    /// Create a transport sharing an existing reqwest client (and its cookie store).
    pub fn with_client(
        server_url: impl AsRef<str>,
        http: reqwest::Client,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, url::ParseError> {
        let endpoint = service_url(server_url.as_ref(), QUERY_PATH)?;
        Ok(Self {
            http,
            endpoint,
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
            tokens,
        })
    }

    /// Use a different header name for the token.
    #[must_use]
    pub fn token_header(mut self, name: impl Into<String>) -> Self {
        self.token_header = name.into();
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl QueryTransport for HttpTransport {
    async fn send(&self, query: &str) -> Result<QueryResponse, TransportError> {
        let token = self.tokens.token().ok_or(TransportError::MissingToken)?;

        tracing::debug!(endpoint = %self.endpoint, query_len = query.len(), "Sending query");

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(self.token_header.as_str(), token)
            .json(&QueryRequest {
                query: query.to_string(),
            })
            .send()
            .await?;

        // Only the body decides the outcome; a non-OK status with a
        // conforming body is still a reported result.
        let status = response.status();
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| TransportError::InvalidResponse {
            status: status.as_u16(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[test]
    fn test_extract_hidden_field() {
        let html = r#"<form id="aiForm"><input type="hidden" name="csrfmiddlewaretoken" value="abc123"><input id="aiInput" name="query"></form>"#;
        assert_eq!(
            extract_hidden_field(html, "csrfmiddlewaretoken"),
            Some("abc123".to_string())
        );
        assert_eq!(extract_hidden_field(html, "missing"), None);
    }

    #[test]
    fn test_host_page_reads_current_markup() {
        let page = HostPage::new(r#"<p>no token yet</p>"#, DEFAULT_TOKEN_FIELD);
        assert_eq!(page.token(), None);

        page.replace(r#"<input type="hidden" name="csrfmiddlewaretoken" value="fresh">"#);
        assert_eq!(page.token(), Some("fresh".to_string()));
    }

    #[test]
    fn test_endpoint_joins_query_path() {
        let transport =
            HttpTransport::new("http://127.0.0.1:8000", Arc::new(StaticToken("t".into())))
                .unwrap();
        assert_eq!(transport.endpoint().as_str(), "http://127.0.0.1:8000/ai/query/");
    }

    #[tokio::test]
    async fn test_send_posts_query_with_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/ai/query/")
            .match_header("content-type", "application/json")
            .match_header("x-csrftoken", "tok-1")
            .match_body(Matcher::Json(serde_json::json!({ "query": "check stock" })))
            .with_status(200)
            .with_body(r#"{"success": true, "response": "5 units left"}"#)
            .create_async()
            .await;

        let transport =
            HttpTransport::new(server.url(), Arc::new(StaticToken("tok-1".into()))).unwrap();
        let reply = transport.send("check stock").await.unwrap();

        mock.assert_async().await;
        assert_eq!(reply, QueryResponse::ok("5 units left"));
    }

    #[tokio::test]
    async fn test_send_keeps_server_path_prefix() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/app/ai/query/")
            .with_status(200)
            .with_body(r#"{"success": true, "response": "mounted"}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(
            format!("{}/app", server.url()),
            Arc::new(StaticToken("tok".into())),
        )
        .unwrap();
        let reply = transport.send("sales").await.unwrap();

        mock.assert_async().await;
        assert_eq!(reply, QueryResponse::ok("mounted"));
    }

    #[tokio::test]
    async fn test_non_json_body_is_transport_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/ai/query/")
            .with_status(403)
            .with_body("CSRF verification failed.")
            .create_async()
            .await;

        let transport =
            HttpTransport::new(server.url(), Arc::new(StaticToken("bad".into()))).unwrap();
        let err = transport.send("foo").await.unwrap_err();

        assert!(matches!(
            err,
            TransportError::InvalidResponse { status: 403, .. }
        ));
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_sending() {
        let transport =
            HttpTransport::new("http://127.0.0.1:9", Arc::new(HostPage::new("", "x"))).unwrap();
        let err = transport.send("foo").await.unwrap_err();
        assert!(matches!(err, TransportError::MissingToken));
    }
}
