use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Actor, Customer, EngineError, Ledger, LedgerEntry, LedgerView, Money, ResultEngine, Role,
    Transaction, transactions,
};

use super::{Engine, with_tx};

/// A customer together with its computed ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub customer: Customer,
    pub ledger: Ledger,
}

/// Collections recorded by one agent in a day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCollections {
    pub agent_id: String,
    pub count: u64,
    pub total: Money,
}

impl Engine {
    /// Full statement of a customer: every transaction with its running
    /// balance, and the current total.
    pub async fn customer_statement(
        &self,
        actor: &Actor,
        customer_id: i64,
    ) -> ResultEngine<Statement> {
        self.statement_view(actor, customer_id, LedgerView::Statement)
            .await
    }

    /// Debit rows of a customer's statement.
    pub async fn debit_history(&self, actor: &Actor, customer_id: i64) -> ResultEngine<Statement> {
        self.statement_view(actor, customer_id, LedgerView::Debits)
            .await
    }

    /// Collection rows of a customer's statement.
    pub async fn collection_history(
        &self,
        actor: &Actor,
        customer_id: i64,
    ) -> ResultEngine<Statement> {
        self.statement_view(actor, customer_id, LedgerView::Collections)
            .await
    }

    /// Loads customer and transactions in one DB transaction so the opening
    /// balance and the postings always come from the same snapshot.
    pub async fn statement_view(
        &self,
        actor: &Actor,
        customer_id: i64,
        view: LedgerView,
    ) -> ResultEngine<Statement> {
        with_tx!(self, |db_tx| {
            let customer = Customer::from(
                self.require_customer_read(&db_tx, actor, customer_id)
                    .await?,
            );
            let postings: Vec<Transaction> = transactions::Entity::find()
                .filter(transactions::Column::CustomerId.eq(customer_id))
                .order_by_asc(transactions::Column::CreatedAt)
                .order_by_asc(transactions::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Transaction::from)
                .collect();

            let entries: Vec<LedgerEntry> = postings.iter().map(LedgerEntry::from).collect();
            let ledger = Ledger::compute(customer.opening_balance, &entries).view(view);
            Ok::<_, EngineError>(Statement { customer, ledger })
        })
    }

    /// Per-agent collections for one UTC day, ordered by agent.
    ///
    /// Agents only get their own line.
    pub async fn daily_collections(
        &self,
        actor: &Actor,
        day: NaiveDate,
    ) -> ResultEngine<Vec<AgentCollections>> {
        let start = day.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = day
            .checked_add_days(Days::new(1))
            .ok_or_else(|| EngineError::InvalidDate("day out of range".to_string()))?
            .and_time(chrono::NaiveTime::MIN)
            .and_utc();

        let mut query = transactions::Entity::find()
            .filter(transactions::Column::CreatedAt.gte(start))
            .filter(transactions::Column::CreatedAt.lt(end))
            .filter(transactions::Column::AmountMinor.gt(0));
        if actor.role() == Role::Agent {
            query = query.filter(transactions::Column::RecordedBy.eq(actor.user_id()));
        }
        let models = query.all(&self.database).await?;

        let mut by_agent: BTreeMap<String, AgentCollections> = BTreeMap::new();
        for model in models {
            let line = by_agent
                .entry(model.recorded_by.clone())
                .or_insert_with(|| AgentCollections {
                    agent_id: model.recorded_by.clone(),
                    count: 0,
                    total: Money::ZERO,
                });
            line.count += 1;
            line.total = line.total.saturating_add(Money::new(model.amount_minor));
        }
        Ok(by_agent.into_values().collect())
    }
}
