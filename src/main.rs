use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use budget_client::{
    api::TeamBuilderClient,
    budget_tui::App,
    cli::{render_report, submit_once, Cli, Commands},
    config::Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "budget_client=info");
    }

    let config = Config::from_env()?.with_overrides(cli.base_url.clone(), cli.timeout_ms);
    config.validate()?;

    match cli.command {
        Some(Commands::Submit { budget }) => {
            init_cli_logging();
            run_submit(&config, &budget).await
        }
        Some(Commands::Tui) | None => {
            init_tui_logging();
            run_tui(config).await
        }
    }
}

/// Log to stderr; stdout carries the report
fn init_cli_logging() {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();
}

/// Log to a file so output does not corrupt the alternate screen
fn init_tui_logging() {
    let file_appender = tracing_appender::rolling::never(".", "budget-client.log");

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();
}

async fn run_submit(config: &Config, raw_budget: &str) -> Result<()> {
    let client = TeamBuilderClient::from_config(config)?;
    info!("Submitting budget '{}' to {}", raw_budget, client.base_url());

    let outcome = submit_once(&client, raw_budget).await;
    let report = render_report(&outcome);

    if outcome.is_success() {
        print!("{}", report);
        Ok(())
    } else {
        eprintln!("{}", report);
        std::process::exit(1);
    }
}

async fn run_tui(config: Config) -> Result<()> {
    info!("Starting budget TUI...");

    let mut app = App::with_http_client(config)?;

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    match result {
        Ok(_) => {
            info!("Budget TUI exited successfully");
            Ok(())
        }
        Err(e) => {
            error!("Budget TUI encountered an error: {}", e);
            Err(e)
        }
    }
}
