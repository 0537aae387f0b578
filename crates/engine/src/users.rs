//! Users table.
//!
//! Administrators and agents share one table; `role` tells them apart. The
//! username is the stable user id referenced by customers and transactions.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Role};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub role: String,
    pub active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::customers::Entity")]
    Customers,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            role: Role::try_from(model.role.as_str())?,
            username: model.username,
            display_name: model.display_name,
            active: model.active,
            created_at: model.created_at,
        })
    }
}

/// Builds the row for a new user.
pub(crate) fn new_active_model(
    username: String,
    password: String,
    display_name: String,
    role: Role,
    created_at: DateTime<Utc>,
) -> ActiveModel {
    ActiveModel {
        username: ActiveValue::Set(username),
        password: ActiveValue::Set(password),
        display_name: ActiveValue::Set(display_name),
        role: ActiveValue::Set(role.as_str().to_string()),
        active: ActiveValue::Set(true),
        created_at: ActiveValue::Set(created_at),
    }
}
