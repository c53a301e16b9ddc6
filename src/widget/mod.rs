//! Chat sidebar widget.
//!
//! [`ChatWidget`] binds the sidebar affordances to a single query/response
//! exchange and the message feed. The host injects the UI elements
//! ([`WidgetElements`]) and the outbound transport ([`QueryTransport`]), so
//! the widget runs the same under a terminal host, a test harness, or any
//! other view.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ai_sidebar::widget::{ChatWidget, SidebarDocument, WidgetSettings};
//! use ai_sidebar::widget::transport::{HttpTransport, StaticToken};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::new("http://127.0.0.1:8000", Arc::new(StaticToken("t".into())))?;
//! let widget = ChatWidget::initialize(SidebarDocument::new(), transport, WidgetSettings::default());
//!
//! widget.with_elements(|doc| doc.set_input("check stock"));
//! widget.submit().await;
//! # Ok(())
//! # }
//! ```

pub mod elements;
pub mod message;
pub mod transport;

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

pub use elements::{SidebarDocument, SubmitIcon, WidgetElements};
pub use message::{MessageViewModel, Role, render_message};
pub use transport::{QueryTransport, TransportError};

use crate::protocol::{GENERIC_ERROR, QueryResponse};

/// Welcome text rendered when the widget starts.
pub const DEFAULT_WELCOME: &str = "Hello! I'm your inventory assistant. How can I help you today?";

/// Delay between opening the panel and focusing the input.
pub const DEFAULT_FOCUS_DELAY: Duration = Duration::from_millis(300);

/// Widget behavior knobs.
#[derive(Debug, Clone)]
pub struct WidgetSettings {
    pub welcome_message: String,
    pub focus_delay: Duration,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            welcome_message: DEFAULT_WELCOME.to_string(),
            focus_delay: DEFAULT_FOCUS_DELAY,
        }
    }
}

/// Exchange state of the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    /// Ready for a submission.
    Idle,
    /// One request is in flight.
    Sending,
}

/// Result of one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The trimmed input was empty; nothing happened.
    Empty,
    /// Another submission is still in flight; nothing happened.
    Busy,
    /// The exchange settled and a message with this role was rendered.
    Rendered(Role),
}

/// The query currently being answered.
#[derive(Debug, Clone)]
struct PendingRequest {
    query: String,
    issued_at: Instant,
}

/// Chat sidebar controller.
#[derive(Debug)]
pub struct ChatWidget<E, T> {
    elements: Mutex<E>,
    transport: T,
    settings: WidgetSettings,
    pending: Mutex<Option<PendingRequest>>,
}

impl<E, T> ChatWidget<E, T>
where
    E: WidgetElements,
    T: QueryTransport,
{
    /// Wire the widget to its elements and render the welcome message.
    pub fn initialize(elements: E, transport: T, settings: WidgetSettings) -> Self {
        let widget = Self {
            elements: Mutex::new(elements),
            transport,
            settings,
            pending: Mutex::new(None),
        };
        widget.add_message(widget.settings.welcome_message.clone(), Role::Assistant);
        tracing::debug!(name: "widget.initialized", "Chat widget initialized");
        widget
    }

    /// Run `f` against the host elements.
    ///
    /// The lock is held only for the duration of `f`.
    pub fn with_elements<R>(&self, f: impl FnOnce(&mut E) -> R) -> R {
        f(&mut self.elements())
    }

    /// Current exchange state.
    pub fn state(&self) -> WidgetState {
        if self.pending().is_some() {
            WidgetState::Sending
        } else {
            WidgetState::Idle
        }
    }

    /// Open the panel, then focus the input once the transition has had time to finish.
    pub async fn open_panel(&self) {
        self.elements().set_panel_open(true);
        tokio::time::sleep(self.settings.focus_delay).await;
        self.elements().focus_input();
    }

    /// Close the panel.
    pub fn close_panel(&self) {
        self.elements().set_panel_open(false);
    }

    /// Submit the current input.
    pub async fn submit(&self) -> SubmitOutcome {
        let raw = self.elements().input_value();
        let query = raw.trim();
        if query.is_empty() {
            return SubmitOutcome::Empty;
        }

        let Some(_in_flight) = self.begin(query) else {
            tracing::debug!(name: "widget.submit.busy", "Submission rejected, request in flight");
            return SubmitOutcome::Busy;
        };

        let role = match self.transport.send(query).await {
            Ok(reply) => self.render_reply(reply),
            Err(e) => {
                tracing::warn!(name: "widget.submit.transport_failed", error = %e, "Query could not be completed");
                self.add_message(format!("Error: {e}"), Role::AssistantError);
                Role::AssistantError
            }
        };

        SubmitOutcome::Rendered(role)
    }

    /// Render `content` and append it to the message list.
    pub fn add_message(&self, content: impl Into<String>, role: Role) {
        let mut elements = self.elements();
        elements.append_message(render_message(content, role));
        elements.scroll_to_end();
    }

    /// Claim the single request slot and put the UI into its sending state.
    fn begin(&self, query: &str) -> Option<InFlight<'_, E, T>> {
        {
            let mut pending = self.pending();
            if pending.is_some() {
                return None;
            }
            *pending = Some(PendingRequest {
                query: query.to_string(),
                issued_at: Instant::now(),
            });
        }
        let guard = InFlight { widget: self };

        let mut elements = self.elements();
        elements.set_controls_enabled(false);
        elements.set_submit_icon(SubmitIcon::Loading);
        elements.append_message(render_message(query, Role::User));
        elements.scroll_to_end();
        elements.clear_input();
        drop(elements);

        tracing::debug!(name: "widget.submit.sending", query_len = query.len(), "Query submitted");
        Some(guard)
    }

    fn render_reply(&self, reply: QueryResponse) -> Role {
        if reply.success {
            self.add_message(reply.response.unwrap_or_default(), Role::Assistant);
            Role::Assistant
        } else {
            let error = reply.error.unwrap_or_else(|| GENERIC_ERROR.to_string());
            tracing::warn!(name: "widget.submit.reported_failure", error = %error, "Query failed");
            self.add_message(format!("Error: {error}"), Role::AssistantError);
            Role::AssistantError
        }
    }

    /// Restore the interactive state. Runs once per submission.
    fn finish(&self) {
        let finished = self.pending().take();

        let mut elements = self.elements();
        elements.set_controls_enabled(true);
        elements.set_submit_icon(SubmitIcon::Send);
        elements.focus_input();
        drop(elements);

        if let Some(request) = finished {
            tracing::debug!(
                name: "widget.submit.settled",
                query_len = request.query.len(),
                elapsed_ms = request.issued_at.elapsed().as_millis() as u64,
                "Exchange settled"
            );
        }
    }

    fn elements(&self) -> MutexGuard<'_, E> {
        self.elements.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pending(&self) -> MutexGuard<'_, Option<PendingRequest>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Finalizes a submission when dropped, on every path out of [`ChatWidget::submit`].
struct InFlight<'a, E, T>
where
    E: WidgetElements,
    T: QueryTransport,
{
    widget: &'a ChatWidget<E, T>,
}

impl<E, T> Drop for InFlight<'_, E, T>
where
    E: WidgetElements,
    T: QueryTransport,
{
    fn drop(&mut self) {
        self.widget.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Transport replying with a canned result and counting calls.
    struct ScriptedTransport {
        reply: fn() -> Result<QueryResponse, TransportError>,
        calls: AtomicUsize,
        last_query: Mutex<Option<String>>,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedTransport {
        fn new(reply: fn() -> Result<QueryResponse, TransportError>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                last_query: Mutex::new(None),
                gate: None,
            }
        }

        fn gated(reply: fn() -> Result<QueryResponse, TransportError>, gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new(reply)
            }
        }
    }

    #[async_trait::async_trait]
    impl QueryTransport for ScriptedTransport {
        async fn send(&self, query: &str) -> Result<QueryResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_query.lock().unwrap() = Some(query.to_string());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            (self.reply)()
        }
    }

    fn widget(
        reply: fn() -> Result<QueryResponse, TransportError>,
    ) -> ChatWidget<SidebarDocument, ScriptedTransport> {
        ChatWidget::initialize(
            SidebarDocument::new(),
            ScriptedTransport::new(reply),
            WidgetSettings::default(),
        )
    }

    fn messages<T: QueryTransport>(w: &ChatWidget<SidebarDocument, T>) -> Vec<(Role, String)> {
        w.with_elements(|doc| {
            doc.messages()
                .iter()
                .map(|m| (m.role(), m.content().to_string()))
                .collect()
        })
    }

    fn assert_interactive<T: QueryTransport>(w: &ChatWidget<SidebarDocument, T>) {
        w.with_elements(|doc| {
            assert!(doc.controls_enabled());
            assert_eq!(doc.submit_icon(), SubmitIcon::Send);
            assert!(doc.is_input_focused());
            assert!(doc.is_scrolled_to_end());
        });
        assert_eq!(w.state(), WidgetState::Idle);
    }

    #[test]
    fn test_initialize_renders_welcome() {
        let w = widget(|| Ok(QueryResponse::ok("unused")));
        assert_eq!(
            messages(&w),
            vec![(Role::Assistant, DEFAULT_WELCOME.to_string())]
        );
        assert_eq!(w.state(), WidgetState::Idle);
    }

    #[tokio::test]
    async fn test_empty_query_is_ignored() {
        let w = widget(|| Ok(QueryResponse::ok("unused")));
        for input in ["", "   ", "\n\t "] {
            w.with_elements(|doc| doc.set_input(input));
            assert_eq!(w.submit().await, SubmitOutcome::Empty);
        }
        assert_eq!(messages(&w).len(), 1);
        assert_eq!(w.transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_renders_trimmed_query_and_answer() {
        let w = widget(|| Ok(QueryResponse::ok("5 units left")));
        w.with_elements(|doc| doc.set_input("  check stock  "));

        assert_eq!(w.submit().await, SubmitOutcome::Rendered(Role::Assistant));

        let msgs = messages(&w);
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[1], (Role::User, "check stock".to_string()));
        assert_eq!(msgs[2], (Role::Assistant, "5 units left".to_string()));
        assert_eq!(
            w.transport.last_query.lock().unwrap().as_deref(),
            Some("check stock")
        );
        w.with_elements(|doc| assert_eq!(doc.input_value(), ""));
        assert_interactive(&w);
    }

    #[tokio::test]
    async fn test_reported_failure_uses_error_text() {
        let w = widget(|| Ok(QueryResponse::failure("Query cannot be empty")));
        w.with_elements(|doc| doc.set_input("foo"));

        assert_eq!(
            w.submit().await,
            SubmitOutcome::Rendered(Role::AssistantError)
        );
        assert_eq!(
            messages(&w)[2],
            (Role::AssistantError, "Error: Query cannot be empty".to_string())
        );
        assert_interactive(&w);
    }

    #[tokio::test]
    async fn test_reported_failure_without_text_uses_fallback() {
        let w = widget(|| {
            Ok(QueryResponse {
                success: false,
                response: None,
                error: None,
            })
        });
        w.with_elements(|doc| doc.set_input("foo"));
        w.submit().await;

        assert_eq!(
            messages(&w)[2],
            (
                Role::AssistantError,
                "Error: Something went wrong".to_string()
            )
        );
        assert_interactive(&w);
    }

    #[tokio::test]
    async fn test_transport_failure_renders_description() {
        let w = widget(|| {
            Err(TransportError::InvalidResponse {
                status: 502,
                reason: "expected value at line 1 column 1".to_string(),
            })
        });
        w.with_elements(|doc| doc.set_input("foo"));

        assert_eq!(
            w.submit().await,
            SubmitOutcome::Rendered(Role::AssistantError)
        );
        assert_eq!(
            messages(&w)[2],
            (
                Role::AssistantError,
                "Error: Unexpected response (status 502): expected value at line 1 column 1"
                    .to_string()
            )
        );
        assert_interactive(&w);
    }

    #[tokio::test]
    async fn test_user_message_rendered_before_reply_and_second_submit_is_busy() {
        let gate = Arc::new(Notify::new());
        let w = Arc::new(ChatWidget::initialize(
            SidebarDocument::new(),
            ScriptedTransport::gated(|| Ok(QueryResponse::ok("done")), Arc::clone(&gate)),
            WidgetSettings::default(),
        ));
        w.with_elements(|doc| doc.set_input("first"));

        let task = {
            let w = Arc::clone(&w);
            tokio::spawn(async move { w.submit().await })
        };
        while w.transport.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        assert_eq!(w.state(), WidgetState::Sending);
        assert_eq!(messages(&w).last().unwrap(), &(Role::User, "first".to_string()));
        w.with_elements(|doc| {
            assert!(!doc.controls_enabled());
            assert_eq!(doc.submit_icon(), SubmitIcon::Loading);
            doc.set_input("second");
        });

        assert_eq!(w.submit().await, SubmitOutcome::Busy);
        assert_eq!(messages(&w).len(), 2);

        gate.notify_one();
        assert_eq!(
            task.await.unwrap(),
            SubmitOutcome::Rendered(Role::Assistant)
        );
        assert_eq!(w.transport.calls.load(Ordering::SeqCst), 1);
        assert_interactive(&w);
    }

    #[tokio::test]
    async fn test_dropped_submission_still_finalizes() {
        let gate = Arc::new(Notify::new());
        let w = ChatWidget::initialize(
            SidebarDocument::new(),
            ScriptedTransport::gated(|| Ok(QueryResponse::ok("never")), gate),
            WidgetSettings::default(),
        );
        w.with_elements(|doc| doc.set_input("abandoned"));

        let result = tokio::time::timeout(Duration::from_millis(10), w.submit()).await;
        assert!(result.is_err());

        assert_interactive(&w);
        assert_eq!(messages(&w).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_panel_focuses_after_delay() {
        let w = Arc::new(widget(|| Ok(QueryResponse::ok("unused"))));

        let opening = {
            let w = Arc::clone(&w);
            tokio::spawn(async move { w.open_panel().await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        w.with_elements(|doc| {
            assert!(doc.is_panel_open());
            assert!(!doc.is_input_focused());
        });

        opening.await.unwrap();
        w.with_elements(|doc| assert!(doc.is_input_focused()));

        w.close_panel();
        w.with_elements(|doc| assert!(!doc.is_panel_open()));
    }
}
