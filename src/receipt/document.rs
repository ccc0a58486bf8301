//! Declarative description of a payment receipt.
//!
//! A [`ReceiptDocument`] holds every string that ends up on the page, already
//! formatted. The render engine only positions and draws it.

use serde::Serialize;

use super::common::{format_amount, format_timestamp};
use super::model::Transaction;

pub const RECEIPT_TITLE: &str = "PAYMENT RECEIPT";
pub const TABLE_HEADER: [&str; 4] = ["Item", "Quantity", "Unit Price", "Total"];
pub const SIGNATURE_LABEL: &str = "Authorized Signature";
pub const CLOSING_LINE: &str = "Thank you for your purchase!";

/// One `label: value` line in the metadata block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataRow {
    pub label: String,
    pub value: String,
}

/// One itemized row; every cell already formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub item: String,
    pub quantity: String,
    pub unit_price: String,
    pub total: String,
}

/// Final table row; only the last two columns are populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub label: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignatureBlock {
    pub label: String,
    pub signatory: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptDocument {
    pub title: String,
    pub metadata: Vec<MetadataRow>,
    pub header: [String; 4],
    pub rows: Vec<TableRow>,
    pub summary: SummaryRow,
    pub signature: SignatureBlock,
    pub closing: String,
}

impl ReceiptDocument {
    /// Build the receipt layout for a transaction. Formatting only: totals
    /// come straight from the transaction.
    pub fn from_transaction(txn: &Transaction, signatory: &str) -> Self {
        let metadata = vec![
            MetadataRow {
                label: "Date".to_string(),
                value: format_timestamp(&txn.created_at),
            },
            MetadataRow {
                label: "Transaction ID".to_string(),
                value: txn.transaction_id.clone(),
            },
            MetadataRow {
                label: "Customer Name".to_string(),
                value: txn.customer_name.clone(),
            },
        ];

        let rows = txn
            .items
            .iter()
            .map(|item| TableRow {
                item: item.name.clone(),
                quantity: item.quantity.to_string(),
                unit_price: format_amount(item.unit_price),
                total: format_amount(item.line_total()),
            })
            .collect();

        Self {
            title: RECEIPT_TITLE.to_string(),
            metadata,
            header: TABLE_HEADER.map(String::from),
            rows,
            summary: SummaryRow {
                label: "Total".to_string(),
                amount: format_amount(txn.total_amount),
            },
            signature: SignatureBlock {
                label: SIGNATURE_LABEL.to_string(),
                signatory: signatory.to_string(),
            },
            closing: CLOSING_LINE.to_string(),
        }
    }
}
