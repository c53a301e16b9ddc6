//! Server-rendered HTML for the sidebar host page.
//!
//! - [`sidebar`]: page shell, sidebar markup and message fragments
//! - [`icons`]: inline SVG icons

pub mod icons;
pub mod sidebar;

pub use sidebar::{EXCHANGE_PATH, SidebarPage, html_shell, messages_fragment, sidebar_page};
