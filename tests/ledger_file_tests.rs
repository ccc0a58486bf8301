//! Ledger behaviour against a real file on disk.

use chrono::NaiveDate;
use receipt_server::ledger::{FileAppendLog, LedgerWriter};
use receipt_server::receipt::{LineItem, Transaction};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use std::thread;

fn transaction(id: String, items: usize) -> Transaction {
    let at = NaiveDate::from_ymd_opt(2025, 8, 15)
        .unwrap()
        .and_hms_opt(11, 0, 0)
        .unwrap();
    let items = (0..items)
        .map(|i| LineItem::new(format!("Item {}", i), 1, Decimal::from_str("1.25").unwrap()))
        .collect();
    Transaction::new(id, "Asha", items, at)
}

#[test]
fn test_header_written_once_over_many_transactions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales_records.csv");
    let writer = LedgerWriter::new(Arc::new(FileAppendLog::new(&path)));

    writer.append(&transaction("TXN0".into(), 0)).unwrap();
    assert!(!path.exists());

    for n in 1..=4 {
        writer.append(&transaction(format!("TXN{}", n), n)).unwrap();
    }

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 1 + (1 + 2 + 3 + 4));
    assert_eq!(lines.iter().filter(|l| l.starts_with("Date,")).count(), 1);
}

#[test]
fn test_concurrent_appends_keep_blocks_contiguous() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 10;
    const ITEMS: usize = 5;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales_records.csv");
    let writer = LedgerWriter::new(Arc::new(FileAppendLog::new(&path)));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let writer = writer.clone();
            thread::spawn(move || {
                for n in 0..PER_THREAD {
                    let txn = transaction(format!("TXN{}-{}", t, n), ITEMS);
                    writer.append(&txn).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let ids: Vec<String> = reader
        .records()
        .map(|r| r.unwrap()[1].to_string())
        .collect();

    assert_eq!(ids.len(), THREADS * PER_THREAD * ITEMS);
    for block in ids.chunks(ITEMS) {
        assert!(block.iter().all(|id| *id == block[0]), "split block: {:?}", block);
    }
}
