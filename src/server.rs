use axum::{
    Form, Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use tracing::info;

use crate::AppState;
use crate::assistant;
use crate::config::AppConfig;
use crate::csrf::{self, csrf_middleware};
use crate::protocol::{QUERY_PATH, QueryRequest, QueryResponse};
use crate::ui::{self, EXCHANGE_PATH, SidebarPage};
use crate::widget::{Role, render_message};

/// Path of the sidebar host page.
pub const SIDEBAR_PATH: &str = "/ai/sidebar/";

/// Largest accepted request body.
const BODY_LIMIT: usize = 64 * 1024;

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let assistant = assistant::from_config(&config.assistant)?;

    info!(
        name: "assistant.config.loaded",
        backend = assistant.name(),
        model = %config.assistant.model,
        "Assistant backend ready"
    );

    let state = AppState {
        assistant,
        config: Arc::clone(&config),
    };
    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .route("/", get(|| async { Redirect::to(SIDEBAR_PATH) }))
        .route(SIDEBAR_PATH, get(sidebar_handler))
        .route(QUERY_PATH, post(query_handler))
        .route(EXCHANGE_PATH, post(exchange_handler))
        .nest_service("/static", ServeDir::new(&state.config.server.static_dir))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            csrf_middleware,
        ))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                match tokio::time::timeout(timeout, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response(),
                }
            },
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /ai/sidebar/ - Host page with a fresh or existing anti-forgery token.
async fn sidebar_handler(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, token) = csrf::ensure_token(jar, &state.config.security);
    let welcome = render_message(state.config.widget.welcome_message.clone(), Role::Assistant);

    let html = ui::sidebar_page(&SidebarPage {
        token: &token,
        security: &state.config.security,
        welcome: &welcome,
        focus_delay_ms: state.config.widget.focus_delay_ms,
    });
    (jar, Html(html)).into_response()
}

/// POST /ai/query/ - Answer one query as `{success, response | error}`.
async fn query_handler(State(state): State<AppState>, body: Bytes) -> Json<QueryResponse> {
    let request: QueryRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(name: "query.invalid_body", error = %e, "Rejected query body");
            return Json(QueryResponse::failure(e.to_string()));
        }
    };

    Json(answer(&state, &request.query).await)
}

/// Form body posted by the sidebar page.
#[derive(Debug, Deserialize)]
struct ExchangeForm {
    #[serde(default)]
    query: String,
}

/// POST /ai/sidebar/exchange - User message plus reply, as HTML fragments.
async fn exchange_handler(State(state): State<AppState>, Form(form): Form<ExchangeForm>) -> Response {
    let query = form.query.trim();
    if query.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }

    let reply = answer(&state, query).await;
    let reply_view = if reply.success {
        render_message(reply.response.unwrap_or_default(), Role::Assistant)
    } else {
        let error = reply
            .error
            .unwrap_or_else(|| crate::protocol::GENERIC_ERROR.to_string());
        render_message(format!("Error: {error}"), Role::AssistantError)
    };

    Html(ui::messages_fragment(&[
        render_message(query, Role::User),
        reply_view,
    ]))
    .into_response()
}

/// Run `query` through the assistant.
async fn answer(state: &AppState, query: &str) -> QueryResponse {
    if query.trim().is_empty() {
        return QueryResponse::failure("Query cannot be empty");
    }

    tracing::info!(
        name: "query.received",
        backend = state.assistant.name(),
        query_len = query.len(),
        "Received assistant query"
    );

    match state.assistant.answer(query).await {
        Ok(text) => QueryResponse::ok(text),
        Err(e) => {
            tracing::error!(name: "query.failed", error = %e, "Assistant failed to answer");
            QueryResponse::failure(e.to_string())
        }
    }
}
