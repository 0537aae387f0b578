//! Running-balance ledger.
//!
//! [`Ledger::compute`] turns an opening balance and the signed transactions
//! of one account into display rows (`Sr | Date | Debit | Credit | Balance`)
//! plus the account total. It is a pure function of its inputs: it performs
//! no I/O and keeps no state between calls.
//!
//! Invariant: `rows[i].balance == opening + sum(amount[0..=i])` with rows in
//! ascending creation-time order, so the total always equals the opening
//! balance plus the sum of every amount. Balances saturate at the `i64`
//! bounds instead of wrapping; amounts within [`Money::LIMIT`] never get
//! there in practice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Money;

/// One transaction as seen by the ledger.
///
/// `amount` is optional so that partially loaded data still renders; a
/// missing amount counts as zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: i64,
    pub amount: Option<Money>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// 1-based position in creation-time order.
    pub sequence: usize,
    pub transaction_id: i64,
    pub created_at: DateTime<Utc>,
    pub debit: Option<Money>,
    pub credit: Option<Money>,
    /// Balance after applying this row.
    pub balance: Money,
}

impl LedgerRow {
    /// Date column as displayed in statements (`dd/mm/yyyy`, UTC).
    pub fn date_label(&self) -> String {
        self.created_at.format("%d/%m/%Y").to_string()
    }
}

/// Which rows of a statement a surface shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerView {
    /// Every row.
    #[default]
    Statement,
    /// Rows carrying a debit (debit history).
    Debits,
    /// Rows carrying a credit (collection history).
    Collections,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    opening: Money,
    rows: Vec<LedgerRow>,
    total: Money,
}

impl Ledger {
    /// Computes the ledger of an account.
    ///
    /// Entries are expected in ascending `created_at` order. They are stably
    /// sorted by `created_at` before accumulating: ascending input is left
    /// untouched (ties keep the caller's order) and misordered input still
    /// yields a correct running balance.
    pub fn compute(opening: Money, entries: &[LedgerEntry]) -> Self {
        let mut ordered: Vec<&LedgerEntry> = entries.iter().collect();
        ordered.sort_by_key(|entry| entry.created_at);

        let mut balance = opening;
        let rows = ordered
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let amount = entry.amount.unwrap_or(Money::ZERO);
                balance = balance.saturating_add(amount);
                LedgerRow {
                    sequence: index + 1,
                    transaction_id: entry.id,
                    created_at: entry.created_at,
                    debit: amount.is_negative().then(|| amount.abs()),
                    credit: amount.is_positive().then_some(amount),
                    balance,
                }
            })
            .collect();

        Self {
            opening,
            rows,
            total: balance,
        }
    }

    pub fn opening(&self) -> Money {
        self.opening
    }

    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<LedgerRow> {
        self.rows
    }

    /// Current balance of the account: the last running balance, or the
    /// opening balance when there are no transactions.
    pub fn total(&self) -> Money {
        self.total
    }

    /// Sum of all debit magnitudes.
    pub fn total_debits(&self) -> Money {
        self.rows.iter().filter_map(|row| row.debit).sum()
    }

    /// Sum of all credits.
    pub fn total_credits(&self) -> Money {
        self.rows.iter().filter_map(|row| row.credit).sum()
    }

    /// Keeps only the rows a surface displays.
    ///
    /// Sequence numbers, running balances and the total are those of the
    /// full statement, so a filtered history still reads against it.
    pub fn view(mut self, view: LedgerView) -> Self {
        match view {
            LedgerView::Statement => {}
            LedgerView::Debits => self.rows.retain(|row| row.debit.is_some()),
            LedgerView::Collections => self.rows.retain(|row| row.credit.is_some()),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn entries(amounts: &[i64]) -> Vec<LedgerEntry> {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| LedgerEntry {
                id: i as i64 + 1,
                amount: Some(Money::new(*amount)),
                created_at: start + Duration::hours(i as i64),
            })
            .collect()
    }

    fn balances(ledger: &Ledger) -> Vec<String> {
        ledger
            .rows()
            .iter()
            .map(|row| row.balance.ledger_format())
            .collect()
    }

    #[test]
    fn mixed_postings_accumulate_on_opening() {
        let ledger = Ledger::compute(Money::new(10_000), &entries(&[5_000, -2_000, 3_000]));

        assert_eq!(balances(&ledger), ["150.0", "130.0", "160.0"]);
        assert_eq!(ledger.total().ledger_format(), "160.0");
        let sequences: Vec<usize> = ledger.rows().iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, [1, 2, 3]);
    }

    #[test]
    fn empty_history_totals_opening() {
        let ledger = Ledger::compute(Money::ZERO, &[]);
        assert!(ledger.rows().is_empty());
        assert_eq!(ledger.total(), Money::ZERO);

        let ledger = Ledger::compute(Money::new(-700), &[]);
        assert_eq!(ledger.total(), Money::new(-700));
    }

    #[test]
    fn negative_opening_can_reach_zero() {
        let ledger = Ledger::compute(Money::new(-1_050), &entries(&[1_050]));
        assert_eq!(balances(&ledger), ["0.0"]);
        assert_eq!(ledger.total(), Money::ZERO);
    }

    #[test]
    fn overdrawn_total_is_not_clamped() {
        let ledger = Ledger::compute(Money::new(20_000), &entries(&[-25_000]));
        let row = &ledger.rows()[0];

        assert_eq!(row.debit.map(Money::ledger_format).as_deref(), Some("250.0"));
        assert_eq!(row.credit, None);
        assert_eq!(row.balance.ledger_format(), "-50.0");
        assert_eq!(ledger.total().ledger_format(), "-50.0");
    }

    #[test]
    fn debit_credit_split_by_sign() {
        let ledger = Ledger::compute(Money::ZERO, &entries(&[-300, 0, 400]));
        let rows = ledger.rows();

        assert_eq!((rows[0].debit, rows[0].credit), (Some(Money::new(300)), None));
        assert_eq!((rows[1].debit, rows[1].credit), (None, None));
        assert_eq!((rows[2].debit, rows[2].credit), (None, Some(Money::new(400))));
        assert_eq!(ledger.total_debits(), Money::new(300));
        assert_eq!(ledger.total_credits(), Money::new(400));
    }

    #[test]
    fn missing_amount_counts_as_zero() {
        let mut input = entries(&[1_000, 0, 500]);
        input[1].amount = None;

        let ledger = Ledger::compute(Money::ZERO, &input);
        assert_eq!(ledger.rows()[1].balance, Money::new(1_000));
        assert_eq!(ledger.total(), Money::new(1_500));
    }

    #[test]
    fn misordered_input_is_replayed_chronologically() {
        let mut input = entries(&[1_000, -400, 200]);
        input.reverse();

        let ledger = Ledger::compute(Money::ZERO, &input);
        let ids: Vec<i64> = ledger.rows().iter().map(|r| r.transaction_id).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(ledger.rows()[1].balance, Money::new(600));
    }

    #[test]
    fn equal_timestamps_keep_caller_order() {
        let mut input = entries(&[100, 200, 300]);
        let at = input[0].created_at;
        for entry in &mut input {
            entry.created_at = at;
        }
        input.swap(0, 2);

        let ledger = Ledger::compute(Money::ZERO, &input);
        let ids: Vec<i64> = ledger.rows().iter().map(|r| r.transaction_id).collect();
        assert_eq!(ids, [3, 2, 1]);
    }

    #[test]
    fn views_keep_statement_numbering() {
        let ledger = Ledger::compute(Money::new(1_000), &entries(&[500, -200, 300, -100]));

        let debits = ledger.clone().view(LedgerView::Debits);
        let seq: Vec<usize> = debits.rows().iter().map(|r| r.sequence).collect();
        assert_eq!(seq, [2, 4]);
        assert_eq!(debits.total(), ledger.total());

        let collections = ledger.view(LedgerView::Collections);
        let seq: Vec<usize> = collections.rows().iter().map(|r| r.sequence).collect();
        assert_eq!(seq, [1, 3]);
        assert_eq!(collections.rows()[1].balance, Money::new(1_600));
    }

    #[test]
    fn extreme_amounts_saturate_instead_of_overflowing() {
        let ledger = Ledger::compute(Money::ZERO, &entries(&[i64::MAX, i64::MAX, -5]));
        assert_eq!(ledger.rows()[1].balance, Money::new(i64::MAX));
        assert_eq!(ledger.total(), Money::new(i64::MAX - 5));
    }

    #[test]
    fn date_label_is_day_month_year() {
        let ledger = Ledger::compute(Money::ZERO, &entries(&[1]));
        assert_eq!(ledger.rows()[0].date_label(), "01/01/2025");
    }
}
