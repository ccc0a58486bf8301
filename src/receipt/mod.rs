//! Receipt module - turns a submitted purchase form into a PDF receipt.
//!
//! - `validation` parses and checks the raw form fields
//! - `document` builds the declarative receipt layout
//! - `engine` positions and draws the layout as PDF
//! - `service` ties validation, rendering and the ledger together

pub mod common;
pub mod document;
pub mod engine;
pub mod handlers;
pub mod model;
pub mod service;
pub mod validation;

pub use document::ReceiptDocument;
pub use engine::{PageSize, PdfRenderEngine};
pub use model::{LineItem, Transaction, TransactionIdGenerator};
pub use service::ReceiptService;
pub use validation::{ReceiptForm, ValidationError, ValidationErrors};

use thiserror::Error;

use crate::ledger::LedgerError;

/// Errors that can occur while rendering a receipt.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to build PDF: {0}")]
    Pdf(String),
}

/// Any failure while issuing a receipt for one submission.
#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("ledger append failed: {0}")]
    Ledger(#[from] LedgerError),
    #[error("receipt rendering failed: {0}")]
    Render(#[from] RenderError),
}

/// Result of a successful receipt generation.
#[derive(Debug)]
pub struct GeneratedReceipt {
    pub filename: String,
    pub pdf: Vec<u8>,
    pub transaction: Transaction,
}
