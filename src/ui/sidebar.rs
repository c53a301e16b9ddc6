//! Sidebar host page and exchange fragments.

use crate::config::SecurityConfig;
use crate::widget::message::escape_html;
use crate::widget::{MessageViewModel, SubmitIcon};

use super::icons::{sparkles_icon, submit_icon, x_icon};

/// Endpoint the sidebar form posts to.
pub const EXCHANGE_PATH: &str = "/ai/sidebar/exchange";

/// Values baked into the host page.
#[derive(Debug, Clone, Copy)]
pub struct SidebarPage<'a> {
    /// Anti-forgery token for this browser.
    pub token: &'a str,
    /// Cookie/header/field names.
    pub security: &'a SecurityConfig,
    /// Already-rendered welcome message.
    pub welcome: &'a MessageViewModel,
    /// Milliseconds between opening the panel and focusing the input.
    pub focus_delay_ms: u64,
}

/// Wrap page content in the HTML document shell.
#[must_use]
pub fn html_shell(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} - Inventory Assistant</title>
    <script src="https://unpkg.com/htmx.org@2.0.8/dist/htmx.min.js"></script>
    <link rel="stylesheet" href="/static/app.css">
    <style>
        .ai-sidebar {{ transform: translateX(100%); transition: transform 0.3s ease; }}
        .ai-sidebar.open {{ transform: translateX(0); }}
        #aiSubmit .htmx-indicator {{ display: none; }}
        #aiSubmit.htmx-request .htmx-indicator {{ display: inline; }}
        #aiSubmit.htmx-request .ai-icon-send {{ display: none; }}
    </style>
</head>
<body>
{content}
</body>
</html>"#,
        title = escape_html(title),
    )
}

/// Sidebar markup with the stable element ids the widget binds to.
#[must_use]
pub fn sidebar_markup(page: &SidebarPage<'_>) -> String {
    let token = escape_html(page.token);
    let field = escape_html(&page.security.csrf_field_name);
    let header = escape_html(&page.security.csrf_header_name);
    let delay = page.focus_delay_ms;

    format!(
        r##"<button id="aiToggleButton" type="button" class="ai-toggle" aria-controls="aiSidebar"
        onclick="document.getElementById('aiSidebar').classList.add('open'); setTimeout(() => document.getElementById('aiInput').focus(), {delay});">
    {toggle_icon}
</button>
<aside id="aiSidebar" class="ai-sidebar" aria-label="Inventory assistant">
    <header class="ai-sidebar-header">
        <h2>Inventory Assistant</h2>
        <button id="aiCloseButton" type="button" class="ai-close" aria-label="Close"
                onclick="document.getElementById('aiSidebar').classList.remove('open');">
            {close_icon}
        </button>
    </header>
    <div id="aiMessages" class="ai-messages" aria-live="polite">
        {welcome}
    </div>
    <form id="aiForm" class="ai-form"
          hx-post="{EXCHANGE_PATH}"
          hx-target="#aiMessages"
          hx-swap="beforeend scroll:bottom"
          hx-disabled-elt="#aiInput, #aiSubmit"
          hx-indicator="#aiSubmit"
          hx-headers='{{"{header}": "{token}"}}'
          hx-on::config-request="if (!event.detail.parameters.query || !event.detail.parameters.query.trim()) event.preventDefault()"
          hx-on::before-request="this.reset()"
          hx-on::after-request="document.getElementById('aiInput').focus()">
        <input type="hidden" name="{field}" value="{token}">
        <input id="aiInput" name="query" type="text" autocomplete="off" placeholder="Ask about your inventory...">
        <button id="aiSubmit" type="submit" aria-label="Send">
            {send_icon}<span class="htmx-indicator">{loading_icon}</span>
        </button>
    </form>
</aside>"##,
        toggle_icon = sparkles_icon("ai-toggle-icon"),
        close_icon = x_icon("ai-close-icon"),
        welcome = page.welcome.to_html(),
        send_icon = submit_icon(SubmitIcon::Send),
        loading_icon = submit_icon(SubmitIcon::Loading),
    )
}

/// Full host page.
#[must_use]
pub fn sidebar_page(page: &SidebarPage<'_>) -> String {
    html_shell("Assistant", &sidebar_markup(page))
}

/// Concatenated message fragments, appended to `#aiMessages` by the page.
#[must_use]
pub fn messages_fragment(messages: &[MessageViewModel]) -> String {
    messages.iter().map(MessageViewModel::to_html).collect()
}
