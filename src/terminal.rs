//! Terminal host for the chat widget.
//!
//! Fetches the sidebar host page from a running server, reads the
//! anti-forgery token from its hidden field and drives a [`ChatWidget`] from
//! stdin.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::AppConfig;
use crate::protocol::service_url;
use crate::server::SIDEBAR_PATH;
use crate::widget::transport::{HostPage, HttpTransport};
use crate::widget::{
    ChatWidget, MessageViewModel, Role, SidebarDocument, SubmitIcon, WidgetElements,
};

/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    Open,
    Close,
    Quit,
    /// Anything else is typed into the input field and submitted.
    Submit(String),
}

impl TerminalCommand {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "/open" => Self::Open,
            "/close" => Self::Close,
            "/quit" | "/exit" => Self::Quit,
            _ => Self::Submit(line.to_string()),
        }
    }
}

/// Sidebar elements echoed to a terminal.
#[derive(Debug)]
pub struct TerminalView<W> {
    doc: SidebarDocument,
    out: W,
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            doc: SidebarDocument::new(),
            out,
        }
    }

    /// Type into the input field.
    pub fn set_input(&mut self, value: impl Into<String>) {
        self.doc.set_input(value);
    }

    #[must_use]
    pub fn document(&self) -> &SidebarDocument {
        &self.doc
    }

    #[must_use]
    pub fn output(&self) -> &W {
        &self.out
    }

    fn print(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "Failed to write to terminal");
        }
    }
}

impl<W: Write + Send> WidgetElements for TerminalView<W> {
    fn set_panel_open(&mut self, open: bool) {
        if open != self.doc.is_panel_open() {
            self.print(if open { "-- assistant opened --" } else { "-- assistant closed --" });
        }
        self.doc.set_panel_open(open);
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        self.doc.set_controls_enabled(enabled);
    }

    fn set_submit_icon(&mut self, icon: SubmitIcon) {
        if icon == SubmitIcon::Loading {
            self.print("...");
        }
        self.doc.set_submit_icon(icon);
    }

    fn input_value(&self) -> String {
        self.doc.input_value()
    }

    fn clear_input(&mut self) {
        self.doc.clear_input();
    }

    fn focus_input(&mut self) {
        self.doc.focus_input();
    }

    fn append_message(&mut self, message: MessageViewModel) {
        let label = match message.role() {
            Role::User => "you",
            Role::Assistant => "assistant",
            Role::AssistantError => "error",
        };
        self.print(&format!("[{label}] {}", message.content()));
        self.doc.append_message(message);
    }

    fn scroll_to_end(&mut self) {
        self.doc.scroll_to_end();
    }
}

/// Run the terminal chat until stdin closes or `/quit`.
pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let http = reqwest::Client::builder().cookie_store(true).build()?;
    let page_url = service_url(&config.widget.server_url, SIDEBAR_PATH)?;

    tracing::info!(name: "terminal.connecting", url = %page_url, "Fetching host page");
    let html = http
        .get(page_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let page = Arc::new(HostPage::new(html, config.security.csrf_field_name.as_str()));
    let transport = HttpTransport::with_client(&config.widget.server_url, http, page)?
        .token_header(config.security.csrf_header_name.as_str());

    let widget = ChatWidget::initialize(
        TerminalView::new(std::io::stdout()),
        transport,
        config.widget.settings(),
    );
    widget.open_panel().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match TerminalCommand::parse(&line) {
            TerminalCommand::Open => widget.open_panel().await,
            TerminalCommand::Close => widget.close_panel(),
            TerminalCommand::Quit => break,
            TerminalCommand::Submit(text) => {
                widget.with_elements(|view| view.set_input(text));
                widget.submit().await;
            }
        }
    }

    Ok(())
}
