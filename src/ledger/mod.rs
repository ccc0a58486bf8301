//! Sales ledger - an append-only CSV log with one row per purchased item.

pub mod append;
pub mod writer;

pub use self::append::{AppendLog, FileAppendLog, InMemoryLog};
pub use self::writer::{LedgerWriter, LEDGER_HEADER};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to open ledger {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write ledger: {0}")]
    Write(#[source] std::io::Error),
    #[error("failed to encode ledger row: {0}")]
    Encode(#[from] csv::Error),
}
