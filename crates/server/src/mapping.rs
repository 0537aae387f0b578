//! Conversions from engine types to wire types.

use api_types::{
    agent::AgentView,
    customer::{CustomerSummary, CustomerView},
    statement::{LedgerRowView, StatementView},
    transaction::{TransactionKind as ApiKind, TransactionView},
};

pub(crate) fn map_currency(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Inr => api_types::Currency::Inr,
    }
}

fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Collection => ApiKind::Collection,
        engine::TransactionKind::Debit => ApiKind::Debit,
    }
}

pub(crate) fn agent_view(user: engine::User) -> AgentView {
    AgentView {
        username: user.username,
        display_name: user.display_name,
        active: user.active,
        created_at: user.created_at.fixed_offset(),
    }
}

pub(crate) fn customer_view(customer: engine::Customer) -> CustomerView {
    CustomerView {
        id: customer.id,
        name: customer.name,
        phone: customer.phone,
        opening_balance_minor: customer.opening_balance.minor(),
        agent_id: customer.agent_id,
        created_at: customer.created_at.fixed_offset(),
    }
}

pub(crate) fn customer_summary(item: engine::CustomerBalance) -> CustomerSummary {
    CustomerSummary {
        balance_minor: item.balance.minor(),
        customer: customer_view(item.customer),
    }
}

pub(crate) fn transaction_view(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        kind: map_kind(tx.kind()),
        id: tx.id,
        customer_id: tx.customer_id,
        amount_minor: tx.amount.minor(),
        note: tx.note,
        recorded_by: tx.recorded_by,
        created_at: tx.created_at.fixed_offset(),
    }
}

fn ledger_row_view(row: engine::LedgerRow) -> LedgerRowView {
    LedgerRowView {
        date: row.date_label(),
        sequence: row.sequence,
        transaction_id: row.transaction_id,
        created_at: row.created_at.fixed_offset(),
        debit_minor: row.debit.map(engine::Money::minor),
        credit_minor: row.credit.map(engine::Money::minor),
        balance_minor: row.balance.minor(),
    }
}

pub(crate) fn statement_view(statement: engine::Statement) -> StatementView {
    let engine::Statement { customer, ledger } = statement;
    let opening_balance_minor = ledger.opening().minor();
    let total_balance_minor = ledger.total().minor();
    StatementView {
        customer: customer_view(customer),
        currency: map_currency(engine::Currency::default()),
        opening_balance_minor,
        rows: ledger.into_rows().into_iter().map(ledger_row_view).collect(),
        total_balance_minor,
    }
}
