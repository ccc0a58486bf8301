use crate::ledger::LedgerWriter;

use super::common::{format_amount, receipt_filename};
use super::document::ReceiptDocument;
use super::engine::{PageSize, PdfRenderEngine};
use super::model::TransactionIdGenerator;
use super::validation::ReceiptForm;
use super::{GeneratedReceipt, ReceiptError};

/// Issues receipts: validate, render, then record in the ledger.
///
/// The PDF is rendered in memory before the ledger is touched, so a render
/// failure leaves no ledger rows and a ledger failure returns no receipt.
pub struct ReceiptService {
    ledger: LedgerWriter,
    ids: TransactionIdGenerator,
    signatory: String,
    page_size: PageSize,
}

impl ReceiptService {
    pub fn new(ledger: LedgerWriter, signatory: impl Into<String>, page_size: PageSize) -> Self {
        Self {
            ledger,
            ids: TransactionIdGenerator::new(),
            signatory: signatory.into(),
            page_size,
        }
    }

    pub fn issue(&self, form: &ReceiptForm) -> Result<GeneratedReceipt, ReceiptError> {
        let (transaction_id, created_at) = self.ids.next();
        let transaction = form.parse(transaction_id, created_at).map_err(|errors| {
            log::warn!("Rejected receipt submission: {}", errors);
            errors
        })?;

        let document = ReceiptDocument::from_transaction(&transaction, &self.signatory);
        let pdf = PdfRenderEngine::render(&document, self.page_size).map_err(|e| {
            log::error!("Failed to render receipt {}: {}", transaction.transaction_id, e);
            e
        })?;

        let rows = self.ledger.append(&transaction).map_err(|e| {
            log::error!(
                "Failed to record transaction {} in ledger: {}",
                transaction.transaction_id,
                e
            );
            e
        })?;

        log::info!(
            "Issued receipt {} for '{}' ({} ledger rows, total {})",
            transaction.transaction_id,
            transaction.customer_name,
            rows,
            format_amount(transaction.total_amount)
        );

        Ok(GeneratedReceipt {
            filename: receipt_filename(&transaction.transaction_id),
            pdf,
            transaction,
        })
    }
}
