//! Client-side statements: fetch a customer and its postings, then run the
//! ledger locally.

use api_types::{customer::CustomerView, transaction::TransactionView};
use chrono::Utc;
use engine::{Ledger, LedgerEntry, LedgerView, Money};
use serde::Serialize;

use crate::client::{Client, ClientError};

#[derive(Debug, Clone, Serialize)]
pub struct LoadedStatement {
    pub customer: CustomerView,
    pub ledger: Ledger,
}

fn entry(tx: &TransactionView) -> LedgerEntry {
    LedgerEntry {
        id: tx.id,
        amount: Some(Money::new(tx.amount_minor)),
        created_at: tx.created_at.with_timezone(&Utc),
    }
}

pub fn build(
    customer: CustomerView,
    transactions: &[TransactionView],
    view: LedgerView,
) -> LoadedStatement {
    let entries: Vec<LedgerEntry> = transactions.iter().map(entry).collect();
    let ledger = Ledger::compute(Money::new(customer.opening_balance_minor), &entries).view(view);
    LoadedStatement { customer, ledger }
}

/// Fetches the customer and its transactions concurrently. Both requests
/// must succeed before the ledger is computed.
pub async fn load(
    client: &Client,
    customer_id: i64,
    view: LedgerView,
) -> Result<LoadedStatement, ClientError> {
    let (customer, transactions) = tokio::join!(
        client.customer(customer_id),
        client.customer_transactions(customer_id)
    );
    let customer = customer?;
    let transactions = transactions?;
    Ok(build(customer, &transactions.transactions, view))
}

#[cfg(test)]
mod tests {
    use api_types::transaction::TransactionKind;
    use chrono::{DateTime, FixedOffset};

    use super::*;

    fn ts(raw: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(raw).unwrap()
    }

    fn customer(opening: i64) -> CustomerView {
        CustomerView {
            id: 7,
            name: "Lakshmi Stores".to_string(),
            phone: None,
            opening_balance_minor: opening,
            agent_id: Some("ravi".to_string()),
            created_at: ts("2025-01-01T00:00:00Z"),
        }
    }

    fn tx(id: i64, amount: i64, at: &str) -> TransactionView {
        TransactionView {
            id,
            customer_id: 7,
            kind: if amount < 0 {
                TransactionKind::Debit
            } else {
                TransactionKind::Collection
            },
            amount_minor: amount,
            note: None,
            recorded_by: "ravi".to_string(),
            created_at: ts(at),
        }
    }

    #[test]
    fn builds_running_balance_from_wire_types() {
        let txs = [
            tx(1, 5_000, "2025-03-02T09:00:00+05:30"),
            tx(2, -2_000, "2025-03-03T09:00:00+05:30"),
            tx(3, 3_000, "2025-03-04T09:00:00+05:30"),
        ];
        let statement = build(customer(10_000), &txs, LedgerView::Statement);

        let balances: Vec<i64> = statement
            .ledger
            .rows()
            .iter()
            .map(|row| row.balance.minor())
            .collect();
        assert_eq!(balances, [15_000, 13_000, 16_000]);
        assert_eq!(statement.ledger.total(), Money::new(16_000));
    }

    #[test]
    fn offsets_are_compared_as_instants() {
        // 10:00+05:30 is 04:30 UTC, earlier than 05:00 UTC.
        let txs = [
            tx(1, 100, "2025-03-02T05:00:00Z"),
            tx(2, 200, "2025-03-02T10:00:00+05:30"),
        ];
        let statement = build(customer(0), &txs, LedgerView::Statement);
        let ids: Vec<i64> = statement
            .ledger
            .rows()
            .iter()
            .map(|row| row.transaction_id)
            .collect();
        assert_eq!(ids, [2, 1]);
    }

    #[test]
    fn debit_view_keeps_numbering() {
        let txs = [
            tx(1, 500, "2025-03-02T09:00:00Z"),
            tx(2, -700, "2025-03-03T09:00:00Z"),
        ];
        let statement = build(customer(200), &txs, LedgerView::Debits);
        assert_eq!(statement.ledger.rows().len(), 1);
        assert_eq!(statement.ledger.rows()[0].sequence, 2);
        assert_eq!(statement.ledger.rows()[0].balance, Money::new(0));
    }
}
