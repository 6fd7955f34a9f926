//! Reusable UI components for the budget TUI

pub mod budget_form;
pub mod product_table;
pub mod status_display;

pub use budget_form::BudgetForm;
pub use product_table::{ProductRow, ProductTable};
pub use status_display::{StatusDisplay, StatusMessage, StatusType};
