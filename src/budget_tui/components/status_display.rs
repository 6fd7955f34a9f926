//! Banner for success and error messages

use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::budget_tui::ui::Styles;

/// Types of status messages
#[derive(Debug, Clone, PartialEq)]
pub enum StatusType {
    Success,
    Error,
    Loading,
}

/// Status message with type and content
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub status_type: StatusType,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl StatusMessage {
    pub fn new(message: String, status_type: StatusType) -> Self {
        Self {
            message,
            status_type,
            timestamp: chrono::Local::now(),
        }
    }

    pub fn success(message: String) -> Self {
        Self::new(message, StatusType::Success)
    }

    pub fn error(message: String) -> Self {
        Self::new(message, StatusType::Error)
    }

    pub fn loading(message: String) -> Self {
        Self::new(message, StatusType::Loading)
    }
}

/// Status display component.
///
/// Holds at most one message; success and error messages expire after
/// `auto_clear_timeout`, loading messages stay until replaced.
pub struct StatusDisplay {
    pub current_message: Option<StatusMessage>,
    pub auto_clear_timeout: Option<std::time::Duration>,
}

impl Default for StatusDisplay {
    fn default() -> Self {
        Self {
            current_message: None,
            auto_clear_timeout: None,
        }
    }
}

impl StatusDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_clear(mut self, timeout: std::time::Duration) -> Self {
        self.auto_clear_timeout = Some(timeout);
        self
    }

    pub fn set_message(&mut self, message: StatusMessage) {
        self.current_message = Some(message);
    }

    pub fn set_success(&mut self, message: String) {
        self.set_message(StatusMessage::success(message));
    }

    pub fn set_error(&mut self, message: String) {
        self.set_message(StatusMessage::error(message));
    }

    pub fn set_loading(&mut self, message: String) {
        self.set_message(StatusMessage::loading(message));
    }

    pub fn clear(&mut self) {
        self.current_message = None;
    }

    pub fn get_current(&self) -> Option<&StatusMessage> {
        self.current_message.as_ref()
    }

    pub fn is_showing(&self, status_type: StatusType) -> bool {
        self.current_message
            .as_ref()
            .map_or(false, |m| m.status_type == status_type)
    }

    /// Check if we should auto-clear the current message
    pub fn should_auto_clear(&self) -> bool {
        if let (Some(timeout), Some(message)) = (self.auto_clear_timeout, &self.current_message) {
            if message.status_type == StatusType::Loading {
                return false;
            }
            let elapsed = chrono::Local::now().signed_duration_since(message.timestamp);
            return elapsed.to_std().unwrap_or_default() >= timeout;
        }
        false
    }

    /// Drop the current message if it has expired. Returns true if cleared.
    pub fn tick(&mut self) -> bool {
        if self.should_auto_clear() {
            self.clear();
            return true;
        }
        false
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let Some(message) = &self.current_message else {
            return;
        };

        let style = match message.status_type {
            StatusType::Success => Styles::success(),
            StatusType::Error => Styles::error(),
            StatusType::Loading => Styles::warning(),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(style);

        let paragraph = Paragraph::new(self.format_message(message))
            .style(style)
            .wrap(Wrap { trim: true })
            .block(block);

        f.render_widget(paragraph, area);
    }

    fn format_message(&self, message: &StatusMessage) -> String {
        let prefix = match message.status_type {
            StatusType::Success => "✓",
            StatusType::Error => "✗",
            StatusType::Loading => "⟳",
        };

        format!(
            "{} [{}] {}",
            prefix,
            message.timestamp.format("%H:%M:%S"),
            message.message
        )
    }
}
