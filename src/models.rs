use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// A validated, non-negative budget amount.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Budget(f64);

impl Budget {
    /// Parse raw form input into a budget.
    ///
    /// Surrounding whitespace is ignored. `NaN` and infinities are treated as
    /// unparseable input rather than as numbers.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }

        let value: f64 = trimmed
            .parse()
            .map_err(|_| ValidationError::NotANumber(trimmed.to_string()))?;

        if !value.is_finite() {
            return Err(ValidationError::NotANumber(trimmed.to_string()));
        }

        if value < 0.0 {
            return Err(ValidationError::Negative(value));
        }

        // Normalise -0.0 so it displays as 0
        Ok(Self(value.abs()))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Budget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Body returned by `GET /team-builder` on success
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub rating: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_decimal_input() {
        let budget = Budget::parse("1000.00").unwrap();
        assert_eq!(budget.value(), 1000.0);

        let budget = Budget::parse("  42.5 ").unwrap();
        assert_eq!(budget.value(), 42.5);

        let budget = Budget::parse("0").unwrap();
        assert_eq!(budget.value(), 0.0);
    }

    #[test]
    fn test_parse_rejects_blank_input() {
        assert_eq!(Budget::parse(""), Err(ValidationError::Empty));
        assert_eq!(Budget::parse("   \t"), Err(ValidationError::Empty));
    }

    #[test]
    fn test_parse_rejects_non_numeric_input() {
        for input in ["abc", "12abc", "1,000", "$5", "NaN", "inf", "-infinity"] {
            assert!(
                matches!(Budget::parse(input), Err(ValidationError::NotANumber(_))),
                "expected not-a-number for {input:?}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_negative_input() {
        assert_eq!(Budget::parse("-5"), Err(ValidationError::Negative(-5.0)));
        assert_eq!(
            Budget::parse("-0.01"),
            Err(ValidationError::Negative(-0.01))
        );
    }

    #[test]
    fn test_negative_zero_is_zero() {
        let budget = Budget::parse("-0").unwrap();
        assert_eq!(budget.value(), 0.0);
        assert!(budget.value().is_sign_positive());
    }

    #[test]
    fn test_api_response_deserialization() {
        let body = r#"{
            "status": "ok",
            "message": "built",
            "budget": 1000,
            "products": [
                {"id": 1, "name": "Widget", "category": "Tools", "price": 9.99, "rating": 4.5},
                {"id": 2, "name": "Gadget", "category": "Toys", "price": 20}
            ]
        }"#;

        let parsed: ApiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.status, "ok");
        assert_eq!(parsed.budget, Some(1000.0));
        assert_eq!(parsed.products.len(), 2);
        assert_eq!(parsed.products[0].rating, Some(4.5));
        assert_eq!(parsed.products[1].rating, None);
    }

    #[test]
    fn test_api_response_without_products_or_budget() {
        let body = r#"{"status": "success", "message": "called"}"#;
        let parsed: ApiResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.products.is_empty());
        assert_eq!(parsed.budget, None);
    }
}
