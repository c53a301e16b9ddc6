//! UI affordances the widget drives.
//!
//! The host supplies an implementation of [`WidgetElements`] covering the
//! toggle/close controls, the panel, the input field, the submit control and
//! the message list. [`SidebarDocument`] is an in-memory implementation used
//! by the terminal host and by tests.

use super::message::MessageViewModel;

/// Icon shown on the submit control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitIcon {
    /// Default paper-plane icon.
    #[default]
    Send,
    /// Spinner shown while a request is in flight.
    Loading,
}

/// Mutable view of the sidebar elements.
pub trait WidgetElements: Send {
    /// Add or remove the panel's open state.
    fn set_panel_open(&mut self, open: bool);

    /// Enable or disable both the input field and the submit control.
    fn set_controls_enabled(&mut self, enabled: bool);

    /// Swap the icon shown on the submit control.
    fn set_submit_icon(&mut self, icon: SubmitIcon);

    /// Current raw value of the input field.
    fn input_value(&self) -> String;

    /// Empty the input field.
    fn clear_input(&mut self);

    /// Move focus into the input field.
    fn focus_input(&mut self);

    /// Append a rendered message to the end of the message list.
    fn append_message(&mut self, message: MessageViewModel);

    /// Scroll the message list to its last entry.
    fn scroll_to_end(&mut self);
}

/// In-memory sidebar state.
#[derive(Debug, Clone, Default)]
pub struct SidebarDocument {
    panel_open: bool,
    controls_enabled: bool,
    submit_icon: SubmitIcon,
    input: String,
    input_focused: bool,
    messages: Vec<MessageViewModel>,
    scrolled_to: usize,
}

impl SidebarDocument {
    /// Create a closed sidebar with enabled controls and an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            controls_enabled: true,
            ..Self::default()
        }
    }

    /// Type text into the input field, replacing its contents.
    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    #[must_use]
    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    #[must_use]
    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    #[must_use]
    pub fn submit_icon(&self) -> SubmitIcon {
        self.submit_icon
    }

    #[must_use]
    pub fn is_input_focused(&self) -> bool {
        self.input_focused
    }

    #[must_use]
    pub fn messages(&self) -> &[MessageViewModel] {
        &self.messages
    }

    /// Whether the list is scrolled to its last message.
    #[must_use]
    pub fn is_scrolled_to_end(&self) -> bool {
        self.scrolled_to == self.messages.len()
    }
}

impl WidgetElements for SidebarDocument {
    fn set_panel_open(&mut self, open: bool) {
        self.panel_open = open;
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        self.controls_enabled = enabled;
        if !enabled {
            self.input_focused = false;
        }
    }

    fn set_submit_icon(&mut self, icon: SubmitIcon) {
        self.submit_icon = icon;
    }

    fn input_value(&self) -> String {
        self.input.clone()
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn focus_input(&mut self) {
        // Disabled fields cannot take focus.
        self.input_focused = self.controls_enabled;
    }

    fn append_message(&mut self, message: MessageViewModel) {
        self.messages.push(message);
    }

    fn scroll_to_end(&mut self) {
        self.scrolled_to = self.messages.len();
    }
}
