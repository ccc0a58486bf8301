use chrono::{Local, NaiveDateTime};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Serialize;

/// One purchased product line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl LineItem {
    pub fn new(name: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    /// `quantity * unit_price`, or `None` when it does not fit in a `Decimal`.
    pub fn checked_line_total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price)
    }

    /// Saturates at `Decimal::MAX`; submissions that overflow are rejected
    /// before a transaction is built.
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity).saturating_mul(self.unit_price)
    }
}

/// One receipt-generation event.
///
/// `total_amount` is computed once at construction and is the value both the
/// ledger and the rendered receipt read.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub customer_name: String,
    pub items: Vec<LineItem>,
    pub total_amount: Decimal,
    pub created_at: NaiveDateTime,
}

impl Transaction {
    pub fn new(
        transaction_id: impl Into<String>,
        customer_name: impl Into<String>,
        items: Vec<LineItem>,
        created_at: NaiveDateTime,
    ) -> Self {
        let total_amount = items
            .iter()
            .map(LineItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add);
        Self {
            transaction_id: transaction_id.into(),
            customer_name: customer_name.into(),
            items,
            total_amount,
            created_at,
        }
    }
}

/// Issues `TXN<YYYYMMDDHHMMSS>` identifiers.
///
/// The first id of a given second has no suffix; later ids in the same second
/// get `-2`, `-3`, ... so ids never repeat within one process.
#[derive(Debug, Default)]
pub struct TransactionIdGenerator {
    last: Mutex<Option<(String, u32)>>,
}

impl TransactionIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id for the current local time, paired with that timestamp.
    pub fn next(&self) -> (String, NaiveDateTime) {
        let now = Local::now().naive_local();
        (self.next_at(&now), now)
    }

    pub fn next_at(&self, at: &NaiveDateTime) -> String {
        let stamp = at.format("%Y%m%d%H%M%S").to_string();
        let mut last = self.last.lock();

        let seq = match last.as_ref() {
            Some((prev, seq)) if *prev == stamp => seq + 1,
            _ => 1,
        };
        *last = Some((stamp.clone(), seq));

        if seq == 1 {
            format!("TXN{}", stamp)
        } else {
            format!("TXN{}-{}", stamp, seq)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 31)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_line_total() {
        let item = LineItem::new("Pen", 3, Decimal::from_str("10.00").unwrap());
        assert_eq!(item.line_total(), Decimal::from(30));
    }

    #[test]
    fn test_transaction_total_is_sum_of_line_totals() {
        let items = vec![
            LineItem::new("A", 3, Decimal::from_str("0.10").unwrap()),
            LineItem::new("B", 7, Decimal::from_str("0.20").unwrap()),
        ];
        let txn = Transaction::new("TXN1", "Asha", items, at(10, 0, 0));
        assert_eq!(txn.total_amount, Decimal::from_str("1.70").unwrap());
    }

    #[test]
    fn test_huge_amounts_saturate_instead_of_panicking() {
        let item = LineItem::new("Gold", 2, Decimal::MAX);
        assert_eq!(item.checked_line_total(), None);
        assert_eq!(item.line_total(), Decimal::MAX);

        let half = Decimal::from_str("50000000000000000000000000000").unwrap();
        let items = vec![LineItem::new("A", 1, half), LineItem::new("B", 1, half)];
        let txn = Transaction::new("TXN1", "Asha", items, at(10, 0, 0));
        assert_eq!(txn.total_amount, Decimal::MAX);
    }

    #[test]
    fn test_empty_transaction_total_is_zero() {
        let txn = Transaction::new("TXN1", "Asha", vec![], at(10, 0, 0));
        assert_eq!(txn.total_amount, Decimal::ZERO);
    }

    #[test]
    fn test_id_format() {
        let ids = TransactionIdGenerator::new();
        assert_eq!(ids.next_at(&at(9, 8, 7)), "TXN20250131090807");
    }

    #[test]
    fn test_same_second_ids_get_sequence_suffix() {
        let ids = TransactionIdGenerator::new();
        assert_eq!(ids.next_at(&at(9, 8, 7)), "TXN20250131090807");
        assert_eq!(ids.next_at(&at(9, 8, 7)), "TXN20250131090807-2");
        assert_eq!(ids.next_at(&at(9, 8, 7)), "TXN20250131090807-3");
        assert_eq!(ids.next_at(&at(9, 8, 8)), "TXN20250131090808");
    }

    #[test]
    fn test_next_uses_current_time() {
        let ids = TransactionIdGenerator::new();
        let (id, created_at) = ids.next();
        assert!(id.starts_with("TXN"));
        assert!(id.contains(&created_at.format("%Y%m%d%H%M%S").to_string()));
    }
}
