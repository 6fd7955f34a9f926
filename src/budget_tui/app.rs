//! Main TUI application state and logic

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::components::{BudgetForm, ProductTable, StatusDisplay, StatusType};
use super::events::AppEvent;
use super::state::SubmissionState;
use super::ui::{centered_rect, Styles};
use crate::api::{TeamBuilderApi, TeamBuilderClient};
use crate::config::Config;
use crate::errors::SubmitError;
use crate::format::format_budget;
use crate::models::{ApiResponse, Budget};

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Which parts of the page are visible for the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageSections {
    pub success_banner: bool,
    pub error_banner: bool,
    pub loading_indicator: bool,
    pub current_budget: bool,
    pub response_details: bool,
    pub product_table: bool,
    pub reset_control: bool,
}

/// The budget page: owns the submission lifecycle and everything it displays
pub struct App {
    pub config: Config,
    api: Arc<dyn TeamBuilderApi>,

    pub form: BudgetForm,
    pub state: SubmissionState,
    pub banner: StatusDisplay,
    pub products: ProductTable,

    pub should_quit: bool,
    pub show_help_popup: bool,

    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(config: Config, api: Arc<dyn TeamBuilderApi>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let banner = StatusDisplay::new().with_auto_clear(config.message_ttl());

        Self {
            config,
            api,
            form: BudgetForm::new(),
            state: SubmissionState::Idle,
            banner,
            products: ProductTable::default(),
            should_quit: false,
            show_help_popup: false,
            events_tx,
            events_rx,
        }
    }

    /// Create an app talking to the team-builder API described by `config`
    pub fn with_http_client(config: Config) -> Result<Self> {
        let client = TeamBuilderClient::from_config(&config)?;
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        info!("Budget page ready, API at {}", self.config.base_url_str());

        loop {
            self.drain_pending_events();
            self.banner.tick();

            terminal.draw(|f| self.draw(f))?;

            if crossterm::event::poll(EVENT_POLL_INTERVAL)? {
                if let Event::Key(key) = crossterm::event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Handle keyboard input events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        // Global shortcuts
        match key.code {
            KeyCode::Char('c') if ctrl => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('r') if ctrl => {
                self.handle_app_event(AppEvent::Reset);
                return;
            }
            KeyCode::F(1) | KeyCode::Char('?') => {
                self.show_help_popup = !self.show_help_popup;
                return;
            }
            KeyCode::Esc => {
                if self.show_help_popup {
                    self.show_help_popup = false;
                } else {
                    self.handle_app_event(AppEvent::Quit);
                }
                return;
            }
            _ => {}
        }

        if self.show_help_popup {
            return;
        }

        match key.code {
            KeyCode::Up => self.products.navigate_up(),
            KeyCode::Down => self.products.navigate_down(),
            _ => {
                if let Some(event) = self.form.handle_key_event(key) {
                    self.handle_app_event(event);
                }
            }
        }
    }

    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Quit => self.should_quit = true,
            AppEvent::BudgetSubmitted(budget) => self.submit_budget(budget),
            AppEvent::SubmissionFinished { budget, outcome } => {
                self.finish_submission(budget, outcome)
            }
            AppEvent::Reset => self.reset(),
        }
    }

    /// Start one submission cycle for `budget`.
    ///
    /// Does not guard against a request already being in flight: each call
    /// starts its own request, and whichever completion is handled last
    /// determines what the page shows.
    pub fn submit_budget(&mut self, budget: Budget) {
        info!("Submitting budget {}", budget);

        self.state = SubmissionState::Loading { budget };
        self.form.set_loading(true);
        self.banner
            .set_loading(format!("Submitting budget {}...", format_budget(budget.value())));

        let api = Arc::clone(&self.api);
        let tx = self.events_tx.clone();

        tokio::spawn(async move {
            let request = tokio::spawn(async move { api.build_team(budget).await });

            // A panicked request still has to report back, or the page would stay loading
            let outcome = request.await.unwrap_or_else(|e| {
                warn!("Team builder task failed: {}", e);
                Err(SubmitError::RequestConstruction(format!(
                    "request task failed: {}",
                    e
                )))
            });

            if tx.send(AppEvent::SubmissionFinished { budget, outcome }).is_err() {
                debug!("Page closed before submission for {} finished", budget);
            }
        });
    }

    fn finish_submission(&mut self, budget: Budget, outcome: Result<ApiResponse, SubmitError>) {
        self.form.set_loading(false);

        match outcome {
            Ok(response) => {
                info!("Submission for {} succeeded: {}", budget, response.message);
                self.banner
                    .set_success(format!("API Response: {}", response.message));
                self.products.set_products(response.products.clone());
                self.state = SubmissionState::Success { budget, response };
            }
            Err(err) => {
                match err.status() {
                    Some(status) => warn!("Submission for {} failed with status {}: {}", budget, status, err),
                    None => warn!("Submission for {} failed: {}", budget, err),
                }
                let message = err.to_string();
                self.banner.set_error(message.clone());
                self.products.clear();
                self.state = SubmissionState::Failure { message };
            }
        }
    }

    /// Return to `Idle`, dropping the submitted budget, response and messages.
    ///
    /// Requests still in flight are not cancelled.
    pub fn reset(&mut self) {
        info!("Resetting budget page from {}", self.state.label());
        self.state = SubmissionState::Idle;
        self.banner.clear();
        self.products.clear();
        self.form.set_loading(false);
    }

    /// Apply every completion that has already arrived, without waiting
    pub fn drain_pending_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_app_event(event);
            handled += 1;
        }
        handled
    }

    /// Wait for the next background event and apply it
    pub async fn process_next_event(&mut self) -> Option<()> {
        let event = self.events_rx.recv().await?;
        self.handle_app_event(event);
        Some(())
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn success_message(&self) -> Option<&str> {
        self.banner
            .get_current()
            .filter(|m| m.status_type == StatusType::Success)
            .map(|m| m.message.as_str())
    }

    pub fn error_message(&self) -> Option<&str> {
        self.banner
            .get_current()
            .filter(|m| m.status_type == StatusType::Error)
            .map(|m| m.message.as_str())
    }

    /// Submitted budget formatted for display, e.g. `$1,000`
    pub fn displayed_budget(&self) -> Option<String> {
        self.state
            .submitted_budget()
            .map(|budget| format_budget(budget.value()))
    }

    pub fn sections(&self) -> PageSections {
        let has_result = self.state.response().is_some();
        PageSections {
            success_banner: self.banner.is_showing(StatusType::Success),
            error_banner: self.banner.is_showing(StatusType::Error),
            loading_indicator: self.is_loading(),
            current_budget: has_result,
            response_details: has_result,
            product_table: has_result && !self.products.is_empty(),
            reset_control: self.state.submitted_budget().is_some(),
        }
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(self.form.height()),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(f, chunks[0]);
        self.form.render(f, chunks[1]);
        self.banner.render(f, chunks[2]);
        self.draw_results(f, chunks[3]);
        self.draw_footer(f, chunks[4]);

        if self.show_help_popup {
            self.draw_help_popup(f, size);
        }
    }

    fn draw_header(&self, f: &mut Frame, area: Rect) {
        let header = Paragraph::new(Line::from(vec![
            Span::styled("Budget Input", Styles::title()),
            Span::styled(" - Enter your budget amount below", Styles::inactive()),
        ]))
        .block(Block::default().borders(Borders::ALL).border_style(Styles::inactive_border()));

        f.render_widget(header, area);
    }

    fn draw_results(&mut self, f: &mut Frame, area: Rect) {
        let sections = self.sections();
        if !sections.response_details {
            return;
        }
        let Some(response) = self.state.response() else {
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(0)])
            .split(area);

        let budget_text = self.displayed_budget().unwrap_or_default();
        let echoed_budget = response
            .budget
            .map(format_budget)
            .unwrap_or_else(|| "N/A".to_string());

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Current Budget: ", Styles::title()),
                Span::styled(budget_text, Styles::highlight_amount()),
            ]),
            Line::from(vec![
                Span::styled("Status: ", Styles::title()),
                Span::raw(response.status.clone()),
            ]),
            Line::from(vec![
                Span::styled("Message: ", Styles::title()),
                Span::raw(response.message.clone()),
            ]),
            Line::from(vec![
                Span::styled("Budget: ", Styles::title()),
                Span::raw(echoed_budget),
            ]),
        ];

        if sections.reset_control {
            lines.push(Line::from(vec![
                Span::styled(" Reset Budget ", Styles::selected()),
                Span::styled("  (Ctrl+R)", Styles::inactive()),
            ]));
        }

        let details = Paragraph::new(lines).block(
            Block::default()
                .title("API Response")
                .borders(Borders::ALL)
                .border_style(Styles::inactive_border()),
        );
        f.render_widget(details, chunks[0]);

        if sections.product_table {
            self.products.render(f, chunks[1]);
        }
    }

    fn draw_footer(&self, f: &mut Frame, area: Rect) {
        let text = format!(
            "{} | {} | Enter: Submit | Ctrl+R: Reset | F1/?: Help | Esc: Quit",
            self.state.label(),
            self.config.base_url_str()
        );

        let footer = Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));

        f.render_widget(footer, area);
    }

    fn draw_help_popup(&self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 50, area);

        f.render_widget(Clear, popup_area);

        let help_content = "Budget Form:\n\
            Type a non-negative amount, e.g. 1000.00\n\
            ←/→, Home/End - Move cursor\n\
            Backspace/Delete - Edit\n\
            Enter - Submit budget\n\n\
            Results:\n\
            ↑/↓ - Select product\n\
            Ctrl+R - Reset budget\n\n\
            Global:\n\
            F1 / ? - Toggle this help\n\
            Esc / Ctrl+C - Quit";

        let help_popup = Paragraph::new(help_content)
            .block(
                Block::default()
                    .title("Help")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White));

        f.render_widget(help_popup, popup_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use async_trait::async_trait;
    use ratatui::backend::TestBackend;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Scripted API: each call pops the next (delay, outcome) pair
    struct ScriptedApi {
        script: Mutex<VecDeque<(Duration, Result<ApiResponse, SubmitError>)>>,
    }

    impl ScriptedApi {
        fn new(script: Vec<(Duration, Result<ApiResponse, SubmitError>)>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
            })
        }
    }

    #[async_trait]
    impl TeamBuilderApi for ScriptedApi {
        async fn build_team(&self, _budget: Budget) -> Result<ApiResponse, SubmitError> {
            let (delay, outcome) = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected build_team call");
            tokio::time::sleep(delay).await;
            outcome
        }
    }

    struct PanickingApi;

    #[async_trait]
    impl TeamBuilderApi for PanickingApi {
        async fn build_team(&self, _budget: Budget) -> Result<ApiResponse, SubmitError> {
            panic!("backend exploded");
        }
    }

    fn response(message: &str, products: Vec<Product>) -> ApiResponse {
        ApiResponse {
            status: "ok".to_string(),
            message: message.to_string(),
            budget: Some(1000.0),
            products,
        }
    }

    fn widget() -> Product {
        Product {
            id: 1,
            name: "Widget".to_string(),
            category: "Tools".to_string(),
            price: 9.99,
            rating: Some(4.5),
        }
    }

    fn budget(value: &str) -> Budget {
        Budget::parse(value).unwrap()
    }

    fn http_app(server: &MockServer, timeout_ms: u64) -> App {
        let config = Config::default().with_overrides(Some(server.uri()), Some(timeout_ms));
        App::with_http_client(config).unwrap()
    }

    fn type_and_submit(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key_event(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        app.handle_key_event(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
    }

    #[tokio::test]
    async fn test_successful_submission_shows_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/team-builder"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok",
                "message": "built",
                "budget": 1000,
                "products": [
                    {"id": 1, "name": "Widget", "category": "Tools", "price": 9.99, "rating": 4.5}
                ]
            })))
            .mount(&server)
            .await;

        let mut app = http_app(&server, 10_000);
        type_and_submit(&mut app, "1000.00");

        assert!(app.is_loading());
        assert!(app.form.is_loading);
        assert!(app.form.value.is_empty());
        assert!(app.sections().loading_indicator);

        app.process_next_event().await.unwrap();

        assert!(!app.is_loading());
        assert!(!app.form.is_loading);
        assert_eq!(app.displayed_budget().as_deref(), Some("$1,000"));
        assert_eq!(app.success_message(), Some("API Response: built"));

        let rows = app.products.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].price, "$9.99");
        assert_eq!(rows[0].rating, "4.50");

        assert_eq!(
            app.sections(),
            PageSections {
                success_banner: true,
                error_banner: false,
                loading_indicator: false,
                current_budget: true,
                response_details: true,
                product_table: true,
                reset_control: true,
            }
        );
    }

    #[tokio::test]
    async fn test_server_error_shows_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/team-builder"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"detail": "insufficient inventory"})),
            )
            .mount(&server)
            .await;

        let mut app = http_app(&server, 10_000);
        app.submit_budget(budget("50"));
        app.process_next_event().await.unwrap();

        assert_eq!(
            app.state,
            SubmissionState::Failure {
                message: "Error: insufficient inventory".to_string()
            }
        );
        assert_eq!(app.error_message(), Some("Error: insufficient inventory"));
        assert!(!app.is_loading());

        let sections = app.sections();
        assert!(sections.error_banner);
        assert!(!sections.success_banner);
        assert!(!sections.product_table);
        assert!(!sections.reset_control);
    }

    #[tokio::test]
    async fn test_timeout_shows_no_response_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/team-builder"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": "ok", "message": "late"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let mut app = http_app(&server, 200);
        app.submit_budget(budget("10"));
        app.process_next_event().await.unwrap();

        assert!(!app.is_loading());
        let message = app.state.failure_message().unwrap();
        assert!(message.contains("No response from server"), "{message}");
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_network() {
        let api = ScriptedApi::new(vec![]);
        let mut app = App::new(Config::default(), api);

        type_and_submit(&mut app, "");
        assert_eq!(
            app.form.error_message().as_deref(),
            Some("Please enter a budget amount")
        );

        app.form.clear();
        type_and_submit(&mut app, "-5");
        assert_eq!(
            app.form.error_message().as_deref(),
            Some("Budget must be a positive number")
        );

        assert!(app.state.is_idle());
        assert_eq!(app.drain_pending_events(), 0);
    }

    #[tokio::test]
    async fn test_reset_returns_to_idle() {
        let api = ScriptedApi::new(vec![(
            Duration::ZERO,
            Ok(response("built", vec![widget()])),
        )]);
        let mut app = App::new(Config::default(), api);

        app.submit_budget(budget("1000"));
        app.process_next_event().await.unwrap();
        assert!(app.sections().reset_control);

        app.handle_key_event(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL));

        assert!(app.state.is_idle());
        assert_eq!(app.displayed_budget(), None);
        assert_eq!(app.success_message(), None);
        assert_eq!(app.error_message(), None);
        assert!(app.products.is_empty());
        assert_eq!(app.sections(), PageSections::default());
    }

    #[tokio::test]
    async fn test_reset_after_failure_and_while_loading() {
        let api = ScriptedApi::new(vec![
            (
                Duration::ZERO,
                Err(SubmitError::ServerNoBody { status: 502 }),
            ),
            (Duration::from_millis(50), Ok(response("late", vec![]))),
        ]);
        let mut app = App::new(Config::default(), api);

        app.submit_budget(budget("1"));
        app.process_next_event().await.unwrap();
        assert_eq!(
            app.error_message(),
            Some("Error: Server responded with status 502")
        );
        app.reset();
        assert_eq!(app.sections(), PageSections::default());

        app.submit_budget(budget("2"));
        app.reset();
        assert!(app.state.is_idle());
        assert!(!app.form.is_loading);

        // The in-flight request is not cancelled and still lands afterwards
        app.process_next_event().await.unwrap();
        assert_eq!(app.success_message(), Some("API Response: late"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_completion_wins() {
        let api = ScriptedApi::new(vec![
            (Duration::from_millis(500), Ok(response("slow", vec![]))),
            (Duration::from_millis(10), Ok(response("fast", vec![widget()]))),
        ]);
        let mut app = App::new(Config::default(), api);

        app.submit_budget(budget("100"));
        app.submit_budget(budget("200"));

        app.process_next_event().await.unwrap();
        assert_eq!(app.success_message(), Some("API Response: fast"));
        assert_eq!(app.displayed_budget().as_deref(), Some("$200"));
        assert!(!app.is_loading());

        app.process_next_event().await.unwrap();
        assert_eq!(app.success_message(), Some("API Response: slow"));
        assert_eq!(app.displayed_budget().as_deref(), Some("$100"));
        assert!(app.products.is_empty());
    }

    #[tokio::test]
    async fn test_panicking_request_still_leaves_loading() {
        let mut app = App::new(Config::default(), Arc::new(PanickingApi));
        app.submit_budget(budget("5"));
        assert!(app.is_loading());

        app.process_next_event().await.unwrap();

        assert!(!app.is_loading());
        assert!(!app.form.is_loading);
        assert!(app.error_message().unwrap().starts_with("Error: request task failed"));
    }

    #[tokio::test]
    async fn test_resubmit_after_success_replaces_response() {
        let api = ScriptedApi::new(vec![
            (Duration::ZERO, Ok(response("first", vec![widget()]))),
            (Duration::ZERO, Err(SubmitError::Network {
                base_url: "http://localhost:8000".to_string(),
            })),
        ]);
        let mut app = App::new(Config::default(), api);

        app.submit_budget(budget("1000"));
        app.process_next_event().await.unwrap();
        assert!(app.sections().product_table);

        app.submit_budget(budget("20"));
        assert_eq!(app.state, SubmissionState::Loading { budget: budget("20") });
        app.process_next_event().await.unwrap();

        assert!(app.state.response().is_none());
        assert!(!app.sections().product_table);
        assert!(app.error_message().unwrap().contains("No response from server"));
    }

    #[tokio::test]
    async fn test_keys_and_help_popup() {
        let mut app = App::new(Config::default(), ScriptedApi::new(vec![]));

        app.handle_key_event(KeyEvent::new(KeyCode::F(1), KeyModifiers::NONE));
        assert!(app.show_help_popup);
        // Typing is swallowed while help is open
        app.handle_key_event(KeyEvent::new(KeyCode::Char('1'), KeyModifiers::NONE));
        assert!(app.form.value.is_empty());

        app.handle_key_event(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(!app.show_help_popup);
        assert!(!app.should_quit);

        // '?' toggles help too and is never typed into the budget field
        app.handle_key_event(KeyEvent::new(KeyCode::Char('?'), KeyModifiers::NONE));
        assert!(app.show_help_popup);
        assert!(app.form.value.is_empty());
        app.handle_key_event(KeyEvent::new(KeyCode::Char('?'), KeyModifiers::NONE));
        assert!(!app.show_help_popup);
        assert!(app.form.value.is_empty());

        app.handle_key_event(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_draw_every_state() {
        let api = ScriptedApi::new(vec![
            (Duration::ZERO, Ok(response("built", vec![widget()]))),
            (Duration::ZERO, Err(SubmitError::ServerNoBody { status: 500 })),
        ]);
        let mut app = App::new(Config::default(), api);
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();

        terminal.draw(|f| app.draw(f)).unwrap();

        app.submit_budget(budget("1000"));
        terminal.draw(|f| app.draw(f)).unwrap();
        app.process_next_event().await.unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();

        app.submit_budget(budget("1"));
        app.process_next_event().await.unwrap();
        app.show_help_popup = true;
        terminal.draw(|f| app.draw(f)).unwrap();
    }
}
