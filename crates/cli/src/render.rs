//! Plain-text tables for the terminal.

use std::io::{self, Write};

use api_types::{customer::CustomerList, summary::DailySummary, transaction::TransactionView};
use chrono_tz::Tz;
use engine::{LedgerView, Money};

use crate::statement::LoadedStatement;

fn title(view: LedgerView) -> &'static str {
    match view {
        LedgerView::Statement => "Statement",
        LedgerView::Debits => "Debit history",
        LedgerView::Collections => "Collection history",
    }
}

fn cell(amount: Option<Money>) -> String {
    amount.map(Money::ledger_format).unwrap_or_default()
}

pub fn statement(
    out: &mut impl Write,
    loaded: &LoadedStatement,
    view: LedgerView,
    tz: Tz,
) -> io::Result<()> {
    let customer = &loaded.customer;
    writeln!(
        out,
        "{} for {} (#{})",
        title(view),
        customer.name,
        customer.id
    )?;
    writeln!(
        out,
        "Opening balance: {}",
        loaded.ledger.opening().ledger_format()
    )?;
    writeln!(
        out,
        "{:>4}  {:<10}  {:>12}  {:>12}  {:>12}",
        "Sr", "Date", "Debit", "Credit", "Balance"
    )?;
    if loaded.ledger.rows().is_empty() {
        writeln!(out, "(no transactions)")?;
    }
    for row in loaded.ledger.rows() {
        writeln!(
            out,
            "{:>4}  {:<10}  {:>12}  {:>12}  {:>12}",
            row.sequence,
            row.created_at.with_timezone(&tz).format("%d/%m/%Y"),
            cell(row.debit),
            cell(row.credit),
            row.balance.ledger_format()
        )?;
    }
    writeln!(
        out,
        "Total balance: {}",
        loaded.ledger.total().ledger_format()
    )
}

pub fn customers(out: &mut impl Write, list: &CustomerList) -> io::Result<()> {
    writeln!(
        out,
        "{:>5}  {:<24}  {:<12}  {:>12}",
        "Id", "Name", "Agent", "Balance"
    )?;
    for item in &list.customers {
        writeln!(
            out,
            "{:>5}  {:<24}  {:<12}  {:>12}",
            item.customer.id,
            item.customer.name,
            item.customer.agent_id.as_deref().unwrap_or("-"),
            Money::new(item.balance_minor).ledger_format()
        )?;
    }
    Ok(())
}

pub fn posted(out: &mut impl Write, tx: &TransactionView, tz: Tz) -> io::Result<()> {
    writeln!(
        out,
        "recorded #{} on customer #{}: {} at {}",
        tx.id,
        tx.customer_id,
        Money::new(tx.amount_minor).ledger_format(),
        tx.created_at.with_timezone(&tz).format("%d/%m/%Y %H:%M")
    )
}

pub fn summary(out: &mut impl Write, summary: &DailySummary) -> io::Result<()> {
    writeln!(out, "Collections on {}", summary.day.format("%d/%m/%Y"))?;
    writeln!(out, "{:<12}  {:>6}  {:>12}", "Agent", "Count", "Total")?;
    for line in &summary.agents {
        writeln!(
            out,
            "{:<12}  {:>6}  {:>12}",
            line.agent_id,
            line.count,
            Money::new(line.total_minor).ledger_format()
        )?;
    }
    writeln!(
        out,
        "Total: {}",
        Money::new(summary.total_minor).ledger_format()
    )
}

#[cfg(test)]
mod tests {
    use api_types::customer::CustomerView;
    use chrono::{DateTime, TimeZone, Utc};
    use engine::{Ledger, LedgerEntry};

    use super::*;

    fn loaded(entries: &[(i64, i64)], view: LedgerView) -> LoadedStatement {
        let at = Utc.with_ymd_and_hms(2025, 3, 2, 20, 0, 0).unwrap();
        let entries: Vec<LedgerEntry> = entries
            .iter()
            .map(|(id, amount)| LedgerEntry {
                id: *id,
                amount: Some(Money::new(*amount)),
                created_at: at,
            })
            .collect();
        LoadedStatement {
            customer: CustomerView {
                id: 3,
                name: "Kiran".to_string(),
                phone: None,
                opening_balance_minor: 20_000,
                agent_id: None,
                created_at: DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z").unwrap(),
            },
            ledger: Ledger::compute(Money::new(20_000), &entries).view(view),
        }
    }

    #[test]
    fn statement_table_lists_rows_and_total() {
        let mut out = Vec::new();
        statement(
            &mut out,
            &loaded(&[(1, -25_000)], LedgerView::Statement),
            LedgerView::Statement,
            chrono_tz::UTC,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Statement for Kiran (#3)"));
        assert!(text.contains("02/03/2025"));
        assert!(text.contains("250.0"));
        assert!(text.ends_with("Total balance: -50.0\n"));
    }

    #[test]
    fn dates_follow_the_configured_timezone() {
        let mut out = Vec::new();
        statement(
            &mut out,
            &loaded(&[(1, 100)], LedgerView::Statement),
            LedgerView::Statement,
            chrono_tz::Asia::Kolkata,
        )
        .unwrap();
        // 20:00 UTC is past midnight in Kolkata.
        assert!(String::from_utf8(out).unwrap().contains("03/03/2025"));
    }

    #[test]
    fn empty_history_says_so() {
        let mut out = Vec::new();
        statement(
            &mut out,
            &loaded(&[], LedgerView::Collections),
            LedgerView::Collections,
            chrono_tz::UTC,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Collection history"));
        assert!(text.contains("(no transactions)"));
        assert!(text.ends_with("Total balance: 200.0\n"));
    }
}
