//! Inline SVG icons.

use crate::widget::SubmitIcon;

/// Common icon size class.
const ICON_SIZE: &str = "h-4 w-4";

/// Paper-plane send icon.
#[must_use]
pub fn send_icon(class: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" class="{ICON_SIZE} {class}"><line x1="22" y1="2" x2="11" y2="13"/><polygon points="22 2 15 22 11 13 2 9 22 2"/></svg>"#
    )
}

/// Spinner shown while a request is in flight.
#[must_use]
pub fn loader_icon(class: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" class="{ICON_SIZE} {class} animate-spin"><path d="M21 12a9 9 0 1 1-6.219-8.56"/></svg>"#
    )
}

/// Close (X) icon.
#[must_use]
pub fn x_icon(class: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" class="{ICON_SIZE} {class}"><line x1="18" y1="6" x2="6" y2="18"/><line x1="6" y1="6" x2="18" y2="18"/></svg>"#
    )
}

/// Sparkles icon used on the toggle button.
#[must_use]
pub fn sparkles_icon(class: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" class="{ICON_SIZE} {class}"><path d="m12 3-1.912 5.813a2 2 0 0 1-1.275 1.275L3 12l5.813 1.912a2 2 0 0 1 1.275 1.275L12 21l1.912-5.813a2 2 0 0 1 1.275-1.275L21 12l-5.813-1.912a2 2 0 0 1-1.275-1.275L12 3Z"/></svg>"#
    )
}

/// Markup for the submit control's icon.
#[must_use]
pub fn submit_icon(icon: SubmitIcon) -> String {
    match icon {
        SubmitIcon::Send => send_icon("ai-icon-send"),
        SubmitIcon::Loading => loader_icon("ai-loading"),
    }
}
