//! Common utilities for receipt generation.
//!
//! Shared helpers for money formatting, timestamps, and download filenames.

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};

/// Timestamp layout used on receipts and in ledger rows.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a money amount with exactly two fractional digits (e.g. "130.00").
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Format a timestamp the way it appears on receipts and ledger rows.
pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Download filename for a receipt, e.g. `receipt_TXN20250101120000.pdf`.
pub fn receipt_filename(transaction_id: &str) -> String {
    let name = format!("receipt_{}.pdf", transaction_id);
    let safe = sanitize_filename::sanitize(&name);
    if safe.is_empty() {
        return "receipt.pdf".to_string();
    }
    safe
}
