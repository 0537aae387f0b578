//! Customers (accounts) and their storage model.
//!
//! A customer carries an opening balance that is set at creation and only
//! changes through an explicit edit; postings never touch it.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::Money;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub opening_balance: Money,
    /// Username of the agent collecting from this customer.
    pub agent_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A customer with its current total balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerBalance {
    pub customer: Customer,
    pub balance: Money,
}

/// Input for [`Engine::create_customer`](crate::Engine::create_customer).
#[derive(Clone, Debug, Default)]
pub struct NewCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub opening_balance: Money,
    pub agent_id: Option<String>,
}

/// Partial update; `None` leaves a field unchanged.
///
/// `phone` and `agent_id` are doubly optional so they can be cleared with
/// `Some(None)`.
#[derive(Clone, Debug, Default)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<Option<String>>,
    pub opening_balance: Option<Money>,
    pub agent_id: Option<Option<String>>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub opening_balance_minor: i64,
    pub agent_id: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AgentId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Agent,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Agent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Customer {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            phone: model.phone,
            opening_balance: Money::new(model.opening_balance_minor),
            agent_id: model.agent_id,
            created_at: model.created_at,
        }
    }
}

impl ActiveModel {
    pub(crate) fn for_insert(customer: NewCustomer, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(customer.name),
            phone: ActiveValue::Set(customer.phone),
            opening_balance_minor: ActiveValue::Set(customer.opening_balance.minor()),
            agent_id: ActiveValue::Set(customer.agent_id),
            created_at: ActiveValue::Set(created_at),
        }
    }
}
