//! Budget entry form

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::debug;

use crate::{
    budget_tui::{events::AppEvent, ui::Styles},
    errors::ValidationError,
    models::Budget,
};

const LABEL: &str = "Budget Amount";
const PLACEHOLDER: &str = "Enter your budget (e.g., 1000.00)";

/// Single-field form that validates a budget before handing it to the page.
///
/// Validation errors stay local: they are shown under the field and cleared
/// by the next edit.
#[derive(Debug, Clone, Default)]
pub struct BudgetForm {
    pub value: String,
    /// Cursor position in characters, not bytes
    pub cursor_position: usize,
    pub validation_error: Option<ValidationError>,
    pub is_loading: bool,
}

impl BudgetForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self.cursor_position = value.chars().count();
        self
    }

    /// Disable or re-enable input while a request is in flight
    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn error_message(&self) -> Option<String> {
        self.validation_error.as_ref().map(|e| e.to_string())
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        if self.is_loading {
            return;
        }
        let idx = self.byte_index(self.cursor_position);
        self.value.insert(idx, c);
        self.cursor_position += 1;
        self.validation_error = None;
    }

    pub fn delete_char(&mut self) {
        if self.is_loading {
            return;
        }
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let idx = self.byte_index(self.cursor_position);
            self.value.remove(idx);
            self.validation_error = None;
        }
    }

    pub fn delete_char_forward(&mut self) {
        if self.is_loading {
            return;
        }
        if self.cursor_position < self.char_count() {
            let idx = self.byte_index(self.cursor_position);
            self.value.remove(idx);
            self.validation_error = None;
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.char_count() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_to_start(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_to_end(&mut self) {
        self.cursor_position = self.char_count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor_position = 0;
        self.validation_error = None;
    }

    /// Validate the current input.
    ///
    /// On success the input is cleared and the parsed budget is returned for
    /// the owner to submit. On failure the error is kept on the form and
    /// nothing is returned. Does nothing while loading.
    pub fn submit(&mut self) -> Option<Budget> {
        if self.is_loading {
            return None;
        }

        match Budget::parse(&self.value) {
            Ok(budget) => {
                self.clear();
                Some(budget)
            }
            Err(err) => {
                debug!("Rejected budget input {:?}: {}", self.value, err);
                self.validation_error = Some(err);
                None
            }
        }
    }

    /// Handle a key press; returns `BudgetSubmitted` when Enter yields a valid budget
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Enter => self.submit().map(AppEvent::BudgetSubmitted),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert_char(c);
                None
            }
            KeyCode::Backspace => {
                self.delete_char();
                None
            }
            KeyCode::Delete => {
                self.delete_char_forward();
                None
            }
            KeyCode::Left => {
                self.move_cursor_left();
                None
            }
            KeyCode::Right => {
                self.move_cursor_right();
                None
            }
            KeyCode::Home => {
                self.move_cursor_to_start();
                None
            }
            KeyCode::End => {
                self.move_cursor_to_end();
                None
            }
            _ => None,
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_loading {
            "Submitting..."
        } else {
            "Submit Budget"
        }
    }

    /// Rows needed by [`BudgetForm::render`]
    pub fn height(&self) -> u16 {
        5
    }

    /// Slice of the input that fits in `width` columns with the cursor on screen.
    ///
    /// Returns the visible text and the cursor's column within it.
    pub fn visible_window(&self, width: usize) -> (String, usize) {
        if width == 0 {
            return (String::new(), 0);
        }
        let start = self.cursor_position.saturating_sub(width - 1);
        let text: String = self.value.chars().skip(start).take(width).collect();
        (text, self.cursor_position - start)
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        let border_style = if self.validation_error.is_some() {
            Styles::error()
        } else if self.is_loading {
            Styles::inactive_border()
        } else {
            Styles::active_border()
        };

        let inner_width = usize::from(chunks[0].width.saturating_sub(2));
        let (visible_text, cursor_column) = self.visible_window(inner_width);

        let (display_text, text_style) = if self.value.is_empty() {
            (PLACEHOLDER.to_string(), Styles::inactive())
        } else {
            (visible_text, Styles::default())
        };

        let input = Paragraph::new(display_text)
            .style(text_style)
            .block(
                Block::default()
                    .title(LABEL)
                    .borders(Borders::ALL)
                    .border_style(border_style),
            );
        f.render_widget(input, chunks[0]);

        if let Some(error) = self.error_message() {
            f.render_widget(Paragraph::new(error).style(Styles::error()), chunks[1]);
        }

        let button_style = if self.is_loading {
            Styles::inactive()
        } else {
            Styles::selected()
        };
        let button = Paragraph::new(Line::from(vec![
            Span::styled(format!(" {} ", self.submit_label()), button_style),
            Span::styled("  (Enter)", Styles::inactive()),
        ]));
        f.render_widget(button, chunks[2]);

        if !self.is_loading && inner_width > 0 {
            let offset = u16::try_from(cursor_column).unwrap_or(u16::MAX);
            let cursor_x = chunks[0].x.saturating_add(1).saturating_add(offset);
            let cursor_y = chunks[0].y.saturating_add(1);
            if cursor_x < chunks[0].right().saturating_sub(1) {
                f.set_cursor(cursor_x, cursor_y);
            }
        }
    }
}
