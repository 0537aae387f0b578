//! JSON types shared by the HTTP server and its clients.
//!
//! Amounts travel as signed integer minor units (`*_minor`, paise).

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Inr,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub mod agent {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AgentNew {
        pub username: String,
        pub password: String,
        pub display_name: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AgentView {
        pub username: String,
        pub display_name: String,
        pub active: bool,
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AgentList {
        pub agents: Vec<AgentView>,
    }
}

pub mod customer {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CustomerNew {
        pub name: String,
        pub phone: Option<String>,
        #[serde(default)]
        pub opening_balance_minor: i64,
        pub agent_id: Option<String>,
    }

    /// Partial update.
    ///
    /// Absent fields are left unchanged. `phone` and `agent_id` accept an
    /// explicit `null` to clear the value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CustomerUpdate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            with = "double_option"
        )]
        pub phone: Option<Option<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub opening_balance_minor: Option<i64>,
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            with = "double_option"
        )]
        pub agent_id: Option<Option<String>>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CustomerView {
        pub id: i64,
        pub name: String,
        pub phone: Option<String>,
        pub opening_balance_minor: i64,
        pub agent_id: Option<String>,
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CustomerSummary {
        #[serde(flatten)]
        pub customer: CustomerView,
        /// Opening balance plus every posted amount.
        pub balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CustomerList {
        pub customers: Vec<CustomerSummary>,
    }

    /// Distinguishes a missing field from an explicit `null`.
    mod double_option {
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
            T: Serialize,
        {
            match value {
                Some(inner) => inner.serialize(serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
        where
            D: Deserializer<'de>,
            T: Deserialize<'de>,
        {
            Option::<T>::deserialize(deserializer).map(Some)
        }
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Collection,
        Debit,
    }

    /// Body of `POST /collections` and `POST /debits`.
    ///
    /// `amount_minor` is a positive magnitude; the endpoint decides the sign.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PostingNew {
        pub customer_id: i64,
        pub amount_minor: i64,
        pub note: Option<String>,
        /// Defaults to the time the server receives the request.
        pub created_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub amount_minor: i64,
        pub note: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: i64,
        pub customer_id: i64,
        pub kind: TransactionKind,
        /// Signed amount.
        pub amount_minor: i64,
        pub note: Option<String>,
        pub recorded_by: String,
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionList {
        pub transactions: Vec<TransactionView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RecentQuery {
        pub limit: Option<u64>,
    }
}

pub mod statement {
    use super::*;
    use crate::customer::CustomerView;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LedgerRowView {
        pub sequence: usize,
        pub transaction_id: i64,
        pub created_at: DateTime<FixedOffset>,
        pub date: String,
        pub debit_minor: Option<i64>,
        pub credit_minor: Option<i64>,
        pub balance_minor: i64,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct StatementView {
        pub customer: CustomerView,
        pub currency: Currency,
        pub opening_balance_minor: i64,
        pub rows: Vec<LedgerRowView>,
        pub total_balance_minor: i64,
    }
}

pub mod summary {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DailyQuery {
        /// UTC day; defaults to today.
        pub day: Option<NaiveDate>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AgentCollectionsView {
        pub agent_id: String,
        pub count: u64,
        pub total_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DailySummary {
        pub day: NaiveDate,
        pub agents: Vec<AgentCollectionsView>,
        pub total_minor: i64,
    }
}

#[cfg(test)]
mod tests {
    use super::customer::CustomerUpdate;

    #[test]
    fn customer_update_distinguishes_null_from_missing() {
        let missing: CustomerUpdate = serde_json::from_str(r#"{"name":"Asha"}"#).unwrap();
        assert_eq!(missing.agent_id, None);

        let cleared: CustomerUpdate = serde_json::from_str(r#"{"agent_id":null}"#).unwrap();
        assert_eq!(cleared.agent_id, Some(None));

        let set: CustomerUpdate = serde_json::from_str(r#"{"agent_id":"ravi"}"#).unwrap();
        assert_eq!(set.agent_id, Some(Some("ravi".to_string())));
    }
}
