//! Anti-forgery tokens.
//!
//! Double-submit scheme: pages set a token cookie and embed the same value
//! in a hidden field; unsafe requests must echo it in a header.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use thiserror::Error;
use uuid::Uuid;

use crate::AppState;
use crate::config::SecurityConfig;

/// Why a request failed verification.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CsrfError {
    #[error("CSRF cookie not set")]
    MissingCookie,
    #[error("CSRF token missing")]
    MissingToken,
    #[error("CSRF token incorrect")]
    Mismatch,
}

impl IntoResponse for CsrfError {
    fn into_response(self) -> Response {
        (StatusCode::FORBIDDEN, "CSRF verification failed.").into_response()
    }
}

/// Fresh random token.
#[must_use]
pub fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Return the browser's token, issuing a cookie for a new one if it has none.
#[must_use]
pub fn ensure_token(jar: CookieJar, security: &SecurityConfig) -> (CookieJar, String) {
    if let Some(existing) = jar
        .get(&security.csrf_cookie_name)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
    {
        let token = existing.to_string();
        return (jar, token);
    }

    let token = new_token();
    let cookie = Cookie::build((security.csrf_cookie_name.clone(), token.clone()))
        .path("/")
        .same_site(SameSite::Lax)
        .build();
    (jar.add(cookie), token)
}

/// Check the header token against the cookie token.
pub fn verify(headers: &HeaderMap, security: &SecurityConfig) -> Result<(), CsrfError> {
    let jar = CookieJar::from_headers(headers);
    let cookie = jar
        .get(&security.csrf_cookie_name)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
        .ok_or(CsrfError::MissingCookie)?;
    let supplied = headers
        .get(security.csrf_header_name.as_str())
        .and_then(|h| h.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(CsrfError::MissingToken)?;

    if constant_time_eq(cookie.as_bytes(), supplied.as_bytes()) {
        Ok(())
    } else {
        Err(CsrfError::Mismatch)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Reject unsafe requests that fail [`verify`].
pub async fn csrf_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, CsrfError> {
    if matches!(
        *request.method(),
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    ) {
        return Ok(next.run(request).await);
    }

    if let Err(e) = verify(request.headers(), &state.config.security) {
        tracing::warn!(
            name: "csrf.rejected",
            method = %request.method(),
            path = %request.uri().path(),
            reason = %e,
            "Forbidden"
        );
        return Err(e);
    }
    Ok(next.run(request).await)
}
