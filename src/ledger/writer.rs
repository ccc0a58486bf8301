use std::sync::Arc;

use crate::receipt::common::{format_amount, format_timestamp};
use crate::receipt::model::Transaction;

use super::{AppendLog, LedgerError};

pub const LEDGER_HEADER: [&str; 7] = [
    "Date",
    "Transaction ID",
    "Customer Name",
    "Item",
    "Quantity",
    "Unit Price",
    "Total",
];

/// Flattens transactions into ledger rows, one per line item.
#[derive(Clone)]
pub struct LedgerWriter {
    log: Arc<dyn AppendLog + Send + Sync>,
}

impl LedgerWriter {
    pub fn new(log: Arc<dyn AppendLog + Send + Sync>) -> Self {
        Self { log }
    }

    /// Append every item of `txn` as one contiguous block.
    ///
    /// Returns the number of rows written. A transaction without items writes
    /// nothing, not even the header.
    pub fn append(&self, txn: &Transaction) -> Result<usize, LedgerError> {
        if txn.items.is_empty() {
            return Ok(0);
        }

        let date = format_timestamp(&txn.created_at);
        let rows: Vec<[String; 7]> = txn
            .items
            .iter()
            .map(|item| {
                [
                    date.clone(),
                    txn.transaction_id.clone(),
                    txn.customer_name.clone(),
                    item.name.clone(),
                    item.quantity.to_string(),
                    format_amount(item.unit_price),
                    format_amount(item.line_total()),
                ]
            })
            .collect();

        let header = encode(std::iter::once(LEDGER_HEADER))?;
        let block = encode(rows.iter())?;
        self.log.append_block(&header, &block)?;

        log::debug!(
            "Appended {} ledger rows for {}",
            rows.len(),
            txn.transaction_id
        );
        Ok(rows.len())
    }
}

fn encode<I, R, F>(records: I) -> Result<Vec<u8>, LedgerError>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = F>,
    F: AsRef<[u8]>,
{
    let mut buf = Vec::new();
    {
        let mut wtr = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(&mut buf);
        for record in records {
            wtr.write_record(record)?;
        }
        wtr.flush().map_err(LedgerError::Write)?;
    }
    Ok(buf)
}
