//! Transaction primitives.
//!
//! A `Transaction` is a single signed posting on a customer account:
//! positive amounts are collections (credits), negative amounts are debits.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Money, ledger::LedgerEntry};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Collection,
    Debit,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Debit => "debit",
        }
    }

    /// Applies the kind's sign to a positive magnitude.
    pub(crate) fn signed(self, magnitude: Money) -> Money {
        match self {
            Self::Collection => magnitude,
            Self::Debit => -magnitude,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub customer_id: i64,
    /// Signed amount.
    pub amount: Money,
    pub note: Option<String>,
    /// Username of whoever recorded the posting.
    pub recorded_by: String,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn kind(&self) -> TransactionKind {
        if self.amount.is_negative() {
            TransactionKind::Debit
        } else {
            TransactionKind::Collection
        }
    }
}

/// Input for recording a collection or a debit.
///
/// `amount` is the positive magnitude; the sign comes from the operation.
#[derive(Clone, Debug)]
pub struct NewPosting {
    pub customer_id: i64,
    pub amount: Money,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Transaction> for LedgerEntry {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id,
            amount: Some(tx.amount),
            created_at: tx.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub customer_id: i64,
    pub amount_minor: i64,
    pub note: Option<String>,
    pub recorded_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Customers,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Transaction {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            customer_id: model.customer_id,
            amount: Money::new(model.amount_minor),
            note: model.note,
            recorded_by: model.recorded_by,
            created_at: model.created_at,
        }
    }
}

impl ActiveModel {
    pub(crate) fn for_insert(
        posting: NewPosting,
        kind: TransactionKind,
        recorded_by: &str,
    ) -> Self {
        Self {
            id: ActiveValue::NotSet,
            customer_id: ActiveValue::Set(posting.customer_id),
            amount_minor: ActiveValue::Set(kind.signed(posting.amount).minor()),
            note: ActiveValue::Set(posting.note),
            recorded_by: ActiveValue::Set(recorded_by.to_string()),
            created_at: ActiveValue::Set(posting.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn tx(amount: i64) -> Transaction {
        Transaction {
            id: 7,
            customer_id: 1,
            amount: Money::new(amount),
            note: None,
            recorded_by: "ravi".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn kind_follows_sign() {
        assert_eq!(tx(500).kind(), TransactionKind::Collection);
        assert_eq!(tx(-500).kind(), TransactionKind::Debit);
    }

    #[test]
    fn signed_applies_kind() {
        assert_eq!(
            TransactionKind::Debit.signed(Money::new(250)),
            Money::new(-250)
        );
        assert_eq!(
            TransactionKind::Collection.signed(Money::new(250)),
            Money::new(250)
        );
    }

    #[test]
    fn ledger_entry_carries_amount_and_time() {
        let tx = tx(-120);
        let entry = LedgerEntry::from(&tx);
        assert_eq!(entry.id, 7);
        assert_eq!(entry.amount, Some(Money::new(-120)));
        assert_eq!(entry.created_at, tx.created_at);
    }
}
