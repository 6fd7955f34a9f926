//! Product table component for displaying the curated team

use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::{
    budget_tui::ui::Styles,
    format::{format_price, format_rating},
    models::Product,
};

/// One rendered table row, already formatted for display
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: String,
    pub rating: String,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            category: product.category.clone(),
            price: format_price(product.price),
            rating: format_rating(product.rating),
        }
    }
}

/// Scrollable table of products returned by the team builder
pub struct ProductTable {
    pub products: Vec<Product>,
    pub state: TableState,
    pub title: String,
}

impl Default for ProductTable {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ProductTable {
    pub fn new(products: Vec<Product>) -> Self {
        let mut state = TableState::default();
        if !products.is_empty() {
            state.select(Some(0));
        }

        Self {
            products,
            state,
            title: "Products".to_string(),
        }
    }

    /// Set new products and reset selection
    pub fn set_products(&mut self, products: Vec<Product>) {
        self.products = products;
        self.state = TableState::default();
        if !self.products.is_empty() {
            self.state.select(Some(0));
        }
    }

    pub fn clear(&mut self) {
        self.set_products(Vec::new());
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn rows(&self) -> Vec<ProductRow> {
        self.products.iter().map(ProductRow::from).collect()
    }

    pub fn total_price(&self) -> f64 {
        self.products.iter().map(|p| p.price).sum()
    }

    pub fn navigate_up(&mut self) {
        if self.products.is_empty() {
            return;
        }
        let selected = self.state.selected().unwrap_or(0);
        let new_selected = if selected == 0 {
            self.products.len() - 1
        } else {
            selected - 1
        };
        self.state.select(Some(new_selected));
    }

    pub fn navigate_down(&mut self) {
        if self.products.is_empty() {
            return;
        }
        let selected = self.state.selected().unwrap_or(0);
        let new_selected = (selected + 1) % self.products.len();
        self.state.select(Some(new_selected));
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let header = Row::new(vec!["ID", "Name", "Category", "Price", "Rating"])
            .style(Styles::title());

        let rows: Vec<Row> = self
            .rows()
            .into_iter()
            .map(|row| {
                Row::new(vec![
                    Cell::from(row.id),
                    Cell::from(row.name),
                    Cell::from(row.category),
                    Cell::from(row.price),
                    Cell::from(row.rating),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(6),
            Constraint::Min(16),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(8),
        ];

        let title = format!(
            "{} ({} items, total {})",
            self.title,
            self.products.len(),
            format_price(self.total_price())
        );

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Styles::inactive_border()),
            )
            .highlight_style(Styles::selected());

        f.render_stateful_widget(table, area, &mut self.state);
    }
}
