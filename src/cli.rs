use clap::{Parser, Subcommand};

use crate::api::TeamBuilderApi;
use crate::errors::{SubmitError, ValidationError};
use crate::format::{format_budget, format_price, format_rating};
use crate::models::{ApiResponse, Budget};

#[derive(Parser)]
#[command(name = "budget-client")]
#[command(about = "Submit a budget to the team-builder API and browse the curated products")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Base URL of the team-builder API (overrides BUDGET_CLIENT_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in milliseconds (overrides BUDGET_CLIENT_TIMEOUT_MS)
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive budget form (default)
    Tui,

    /// Submit a single budget, print the result and exit
    Submit {
        /// Budget amount, e.g. 1000.00
        #[arg(allow_hyphen_values = true)]
        budget: String,
    },
}

/// Result of one non-interactive submission cycle
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Rejected(ValidationError),
    Failed(SubmitError),
    Succeeded { budget: Budget, response: ApiResponse },
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Succeeded { .. })
    }
}

/// Validate `raw` like the form does, then submit it once
pub async fn submit_once(api: &dyn TeamBuilderApi, raw: &str) -> SubmitOutcome {
    let budget = match Budget::parse(raw) {
        Ok(budget) => budget,
        Err(err) => return SubmitOutcome::Rejected(err),
    };

    match api.build_team(budget).await {
        Ok(response) => SubmitOutcome::Succeeded { budget, response },
        Err(err) => SubmitOutcome::Failed(err),
    }
}

/// Plain-text rendering of an outcome for the terminal
pub fn render_report(outcome: &SubmitOutcome) -> String {
    match outcome {
        SubmitOutcome::Rejected(err) => err.to_string(),
        SubmitOutcome::Failed(err) => err.to_string(),
        SubmitOutcome::Succeeded { budget, response } => {
            let mut out = String::new();
            out.push_str(&format!("API Response: {}\n", response.message));
            out.push_str(&format!("Current Budget: {}\n", format_budget(budget.value())));
            out.push_str(&format!("Status: {}\n", response.status));
            out.push_str(&format!(
                "Budget: {}\n",
                response
                    .budget
                    .map(format_budget)
                    .unwrap_or_else(|| "N/A".to_string())
            ));

            if !response.products.is_empty() {
                out.push('\n');
                out.push_str(&format!(
                    "{:<6} {:<30} {:<16} {:>12} {:>8}\n",
                    "ID", "Name", "Category", "Price", "Rating"
                ));
                out.push_str(&format!("{}\n", "-".repeat(76)));
                for product in &response.products {
                    out.push_str(&format!(
                        "{:<6} {:<30} {:<16} {:>12} {:>8}\n",
                        product.id,
                        truncate_string(&product.name, 30),
                        truncate_string(&product.category, 16),
                        format_price(product.price),
                        format_rating(product.rating)
                    ));
                }
                out.push_str(&format!("\nTotal: {} products\n", response.products.len()));
            }

            out
        }
    }
}

/// Truncate string to specified length with ellipsis
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
