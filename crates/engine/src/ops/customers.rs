use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{
    Actor, Customer, CustomerBalance, CustomerUpdate, EngineError, Money, NewCustomer,
    ResultEngine, Role, customers, transactions,
    util::{
        normalize_optional_text, normalize_required_name, normalize_username,
        require_within_limit,
    },
};

use super::{Engine, access::require_admin, with_tx};

impl Engine {
    /// Creates a customer account.
    pub async fn create_customer(
        &self,
        actor: &Actor,
        customer: NewCustomer,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Customer> {
        require_admin(actor, "create customers")?;
        require_within_limit(customer.opening_balance)?;
        let name = normalize_required_name(&customer.name, "customer")?;
        let phone = normalize_optional_text(customer.phone.as_deref());
        let agent_id = customer
            .agent_id
            .as_deref()
            .map(normalize_username)
            .transpose()?;

        with_tx!(self, |db_tx| {
            if let Some(agent_id) = agent_id.as_deref() {
                self.require_agent(&db_tx, agent_id).await?;
            }
            let model = customers::ActiveModel::for_insert(
                NewCustomer {
                    name,
                    phone,
                    opening_balance: customer.opening_balance,
                    agent_id,
                },
                created_at,
            )
            .insert(&db_tx)
            .await?;
            tracing::info!(customer_id = model.id, by = actor.user_id(), "customer created");
            Ok(Customer::from(model))
        })
    }

    /// Applies a partial update to a customer.
    pub async fn update_customer(
        &self,
        actor: &Actor,
        customer_id: i64,
        update: CustomerUpdate,
    ) -> ResultEngine<Customer> {
        require_admin(actor, "edit customers")?;
        if let Some(opening) = update.opening_balance {
            require_within_limit(opening)?;
        }
        let name = update
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "customer"))
            .transpose()?;
        let agent_id = update
            .agent_id
            .map(|agent| agent.as_deref().map(normalize_username).transpose())
            .transpose()?;

        with_tx!(self, |db_tx| {
            let model = self
                .require_customer_read(&db_tx, actor, customer_id)
                .await?;
            let mut active: customers::ActiveModel = model.into();

            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(phone) = update.phone {
                active.phone = ActiveValue::Set(normalize_optional_text(phone.as_deref()));
            }
            if let Some(opening) = update.opening_balance {
                active.opening_balance_minor = ActiveValue::Set(opening.minor());
            }
            if let Some(agent_id) = agent_id {
                if let Some(agent) = agent_id.as_deref() {
                    self.require_agent(&db_tx, agent).await?;
                }
                active.agent_id = ActiveValue::Set(agent_id);
            }

            let model = active.update(&db_tx).await?;
            Ok(Customer::from(model))
        })
    }

    /// Deletes a customer and every transaction posted on it.
    pub async fn delete_customer(&self, actor: &Actor, customer_id: i64) -> ResultEngine<()> {
        require_admin(actor, "delete customers")?;
        with_tx!(self, |db_tx| {
            self.require_customer_read(&db_tx, actor, customer_id)
                .await?;
            let removed = transactions::Entity::delete_many()
                .filter(transactions::Column::CustomerId.eq(customer_id))
                .exec(&db_tx)
                .await?;
            customers::Entity::delete_by_id(customer_id)
                .exec(&db_tx)
                .await?;
            tracing::info!(
                customer_id,
                transactions = removed.rows_affected,
                "customer deleted"
            );
            Ok(())
        })
    }

    /// Returns a single customer visible to `actor`.
    pub async fn customer(&self, actor: &Actor, customer_id: i64) -> ResultEngine<Customer> {
        with_tx!(self, |db_tx| {
            self.require_customer_read(&db_tx, actor, customer_id)
                .await
                .map(Customer::from)
        })
    }

    /// Lists the customers visible to `actor`, ordered by name, each with its
    /// current total balance (opening balance plus every posted amount).
    pub async fn list_customers(&self, actor: &Actor) -> ResultEngine<Vec<CustomerBalance>> {
        with_tx!(self, |db_tx| {
            let mut query = customers::Entity::find()
                .order_by_asc(customers::Column::Name)
                .order_by_asc(customers::Column::Id);
            if actor.role() == Role::Agent {
                query = query.filter(customers::Column::AgentId.eq(actor.user_id()));
            }
            let models = query.all(&db_tx).await?;

            let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
            let sums: Vec<(i64, i64)> = transactions::Entity::find()
                .select_only()
                .column(transactions::Column::CustomerId)
                .column_as(Expr::col(transactions::Column::AmountMinor).sum(), "total")
                .filter(transactions::Column::CustomerId.is_in(ids))
                .group_by(transactions::Column::CustomerId)
                .into_tuple()
                .all(&db_tx)
                .await?;
            let sums: HashMap<i64, i64> = sums.into_iter().collect();

            let out = models
                .into_iter()
                .map(|model| {
                    let posted = Money::new(sums.get(&model.id).copied().unwrap_or(0));
                    let customer = Customer::from(model);
                    CustomerBalance {
                        balance: customer.opening_balance.saturating_add(posted),
                        customer,
                    }
                })
                .collect();
            Ok::<_, EngineError>(out)
        })
    }
}
