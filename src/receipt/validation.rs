//! Form parsing and validation for receipt submissions.
//!
//! Errors carry the offending field, a readable message and a hint so the
//! caller can fix the form without guessing.

use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::model::{LineItem, Transaction};

/// Validation error with a field reference and an optional suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// The field that failed validation, e.g. `qty[2]`
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Create error for empty required field
    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} must not be empty", label))
            .with_suggestion(format!("Please fill in the {}", label.to_lowercase()))
    }

    pub fn invalid_quantity(field: &str, value: &str) -> Self {
        Self::new(field, format!("Quantity '{}' is not a whole number", value))
            .with_suggestion("Use a positive whole number, e.g. 3")
    }

    pub fn quantity_too_large(field: &str, value: &str) -> Self {
        Self::new(field, format!("Quantity '{}' is too large", value))
            .with_suggestion(format!("Use a quantity of at most {}", u32::MAX))
    }

    pub fn non_positive_quantity(field: &str) -> Self {
        Self::new(field, "Quantity must be greater than zero")
    }

    pub fn invalid_price(field: &str, value: &str) -> Self {
        Self::new(field, format!("Price '{}' is not a number", value))
            .with_suggestion("Use a decimal amount, e.g. 49.90")
    }

    pub fn negative_price(field: &str) -> Self {
        Self::new(field, "Price must not be negative")
    }

    pub fn amount_overflow(field: &str) -> Self {
        Self::new(field, "Amount is too large to be recorded")
            .with_suggestion("Split the purchase into smaller receipts")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors with formatted output.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Ok if no errors were collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed: {} error(s) found", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "\n{}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Raw receipt submission as posted by the form.
///
/// Item names, quantities and prices are parallel arrays matched by position.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct ReceiptForm {
    #[schema(example = "Asha")]
    pub customer: Option<String>,
    #[serde(rename = "item[]", default)]
    pub items: Vec<String>,
    #[serde(rename = "qty[]", default)]
    pub quantities: Vec<String>,
    #[serde(rename = "price[]", default)]
    pub prices: Vec<String>,
}

impl ReceiptForm {
    /// Decode an `application/x-www-form-urlencoded` body.
    ///
    /// Repeated keys are collected in order; unknown keys are ignored.
    pub fn from_urlencoded(body: &[u8]) -> Result<Self, ValidationError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body).map_err(|e| {
            ValidationError::new("body", format!("Malformed form body: {}", e))
        })?;

        let mut form = ReceiptForm::default();
        for (key, value) in pairs {
            match key.as_str() {
                "customer" => form.customer = Some(value),
                "item[]" | "item" => form.items.push(value),
                "qty[]" | "qty" | "quantity[]" | "quantity" => form.quantities.push(value),
                "price[]" | "price" => form.prices.push(value),
                _ => {}
            }
        }
        Ok(form)
    }

    /// Validate the submission and build a transaction from it.
    ///
    /// Lines with a blank name are skipped. Any bad number on a kept line
    /// rejects the whole submission.
    pub fn parse(
        &self,
        transaction_id: impl Into<String>,
        created_at: NaiveDateTime,
    ) -> Result<Transaction, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let customer = self.customer.as_deref().unwrap_or("").trim();
        if customer.is_empty() {
            errors.add(ValidationError::empty_field("customer", "Customer Name"));
        }

        let mut items = Vec::new();
        let mut total = Some(Decimal::ZERO);
        let lines = self
            .items
            .iter()
            .zip(self.quantities.iter())
            .zip(self.prices.iter())
            .enumerate();

        for (index, ((name, qty), price)) in lines {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }

            let quantity = parse_quantity(qty, &format!("qty[{}]", index), &mut errors);
            let unit_price = parse_price(price, &format!("price[{}]", index), &mut errors);

            if let (Some(quantity), Some(unit_price)) = (quantity, unit_price) {
                let item = LineItem::new(name, quantity, unit_price);
                match item.checked_line_total() {
                    Some(line_total) => {
                        if let Some(sum) = total {
                            total = sum.checked_add(line_total);
                            if total.is_none() {
                                errors.add(ValidationError::amount_overflow("total"));
                            }
                        }
                    }
                    None => errors.add(ValidationError::amount_overflow(&format!(
                        "price[{}]",
                        index
                    ))),
                }
                items.push(item);
            }
        }

        errors.into_result()?;
        Ok(Transaction::new(transaction_id, customer, items, created_at))
    }
}

fn parse_quantity(value: &str, field: &str, errors: &mut ValidationErrors) -> Option<u32> {
    let trimmed = value.trim();
    match trimmed.parse::<i64>() {
        Ok(q) if q <= 0 => {
            errors.add(ValidationError::non_positive_quantity(field));
            None
        }
        Ok(q) => match u32::try_from(q) {
            Ok(q) => Some(q),
            Err(_) => {
                errors.add(ValidationError::quantity_too_large(field, trimmed));
                None
            }
        },
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow) => {
            errors.add(ValidationError::quantity_too_large(field, trimmed));
            None
        }
        Err(_) => {
            errors.add(ValidationError::invalid_quantity(field, trimmed));
            None
        }
    }
}

fn parse_price(value: &str, field: &str, errors: &mut ValidationErrors) -> Option<Decimal> {
    let trimmed = value.trim();
    match Decimal::from_str(trimmed) {
        Ok(p) if p.is_sign_negative() && !p.is_zero() => {
            errors.add(ValidationError::negative_price(field));
            None
        }
        Ok(p) => Some(p),
        Err(_) => {
            errors.add(ValidationError::invalid_price(field, trimmed));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn form(customer: &str, lines: &[(&str, &str, &str)]) -> ReceiptForm {
        ReceiptForm {
            customer: Some(customer.to_string()),
            items: lines.iter().map(|l| l.0.to_string()).collect(),
            quantities: lines.iter().map(|l| l.1.to_string()).collect(),
            prices: lines.iter().map(|l| l.2.to_string()).collect(),
        }
    }

    #[test]
    fn test_parse_valid_submission() {
        let f = form("Asha", &[("Pen", "3", "10.00"), ("Notebook", "2", "50")]);
        let txn = f.parse("TXN1", now()).unwrap();

        assert_eq!(txn.customer_name, "Asha");
        assert_eq!(txn.items.len(), 2);
        assert_eq!(txn.items[0].name, "Pen");
        assert_eq!(txn.items[1].quantity, 2);
        assert_eq!(txn.total_amount, Decimal::from(130));
    }

    #[test]
    fn test_blank_names_are_skipped() {
        let f = form("Asha", &[("  ", "abc", "x"), ("Pen", "1", "2.5"), ("", "", "")]);
        let txn = f.parse("TXN1", now()).unwrap();
        assert_eq!(txn.items.len(), 1);
        assert_eq!(txn.items[0].name, "Pen");
    }

    #[test]
    fn test_malformed_quantity_rejects_submission() {
        let f = form("Asha", &[("Pen", "abc", "10"), ("Notebook", "2", "50")]);
        let errors = f.parse("TXN1", now()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field, "qty[0]");
    }

    #[test]
    fn test_all_errors_are_collected() {
        let mut f = form("", &[("Pen", "0", "-1"), ("Ink", "1.5", "ten")]);
        f.customer = None;
        let errors = f.parse("TXN1", now()).unwrap_err();
        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["customer", "qty[0]", "price[0]", "qty[1]", "price[1]"]);
    }

    #[test]
    fn test_line_total_overflow_is_rejected() {
        let f = form("Asha", &[("Gold", "2", "79228162514264337593543950335")]);
        let errors = f.parse("TXN1", now()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field, "price[0]");
        assert!(errors.errors()[0].message.contains("too large"));
    }

    #[test]
    fn test_total_overflow_is_rejected() {
        let huge = "50000000000000000000000000000";
        let f = form("Asha", &[("A", "1", huge), ("B", "1", huge), ("C", "1", huge)]);
        let errors = f.parse("TXN1", now()).unwrap_err();
        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["total"]);
    }

    #[test]
    fn test_quantity_beyond_range_is_too_large() {
        let f = form("Asha", &[("Pen", "5000000000", "1"), ("Ink", "99999999999999999999", "1")]);
        let errors = f.parse("TXN1", now()).unwrap_err();
        assert_eq!(errors.len(), 2);
        for error in errors.errors() {
            assert!(error.message.contains("is too large"), "{}", error);
        }
    }

    #[test]
    fn test_zero_items_is_valid() {
        let f = form("Asha", &[]);
        let txn = f.parse("TXN1", now()).unwrap();
        assert!(txn.items.is_empty());
        assert_eq!(txn.total_amount, Decimal::ZERO);
    }

    #[test]
    fn test_mismatched_arrays_zip_to_shortest() {
        let mut f = form("Asha", &[("Pen", "1", "1.00")]);
        f.items.push("Orphan".to_string());
        let txn = f.parse("TXN1", now()).unwrap();
        assert_eq!(txn.items.len(), 1);
    }

    #[test]
    fn test_from_urlencoded_collects_repeated_keys() {
        let body = b"customer=Asha&item%5B%5D=Pen&qty%5B%5D=3&price%5B%5D=10.00\
&item%5B%5D=Notebook&quantity%5B%5D=2&price%5B%5D=50.00&submit=Go";
        let f = ReceiptForm::from_urlencoded(body).unwrap();

        assert_eq!(f.customer.as_deref(), Some("Asha"));
        assert_eq!(f.items, vec!["Pen", "Notebook"]);
        assert_eq!(f.quantities, vec!["3", "2"]);
        assert_eq!(f.prices, vec!["10.00", "50.00"]);
    }

    #[test]
    fn test_display_lists_every_error() {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::invalid_quantity("qty[0]", "abc"));
        let text = errors.to_string();
        assert!(text.contains("1 error(s)"));
        assert!(text.contains("[qty[0]] Quantity 'abc' is not a whole number"));
    }
}
