//! Inventory assistant chat sidebar.
//!
//! A collapsible chat sidebar that sends one query at a time to an assistant
//! endpoint and renders the textual reply in a scrolling message list.
//!
//! # Architecture
//!
//! - **Widget**: host-agnostic controller with injected elements and transport
//! - **Server**: Axum app serving the `/ai/query/` JSON endpoint and the HTMX host page
//! - **Assistant**: simulated or Gemini-backed answers
//! - **Terminal host**: runs the widget in a terminal against a live server
//!
//! # Modules
//!
//! - [`widget`]: chat widget, message rendering and HTTP transport
//! - [`assistant`]: assistant backends
//! - [`protocol`]: JSON contract of the query endpoint
//! - [`csrf`]: anti-forgery tokens
//! - [`ui`]: server-rendered HTML
//! - [`terminal`]: terminal host for the widget

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]

pub mod assistant;
pub mod config;
pub mod csrf;
pub mod protocol;
pub mod server;
pub mod terminal;
pub mod ui;
pub mod widget;

use std::sync::Arc;

use crate::assistant::Assistant;
use crate::config::AppConfig;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Backend answering queries.
    pub assistant: Arc<dyn Assistant>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}
