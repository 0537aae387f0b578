use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use api_types::ErrorResponse;
pub use server::{router, run_with_listener};

mod agents;
mod customers;
mod mapping;
mod server;
mod statements;
mod transactions;

pub mod types {
    pub mod agent {
        pub use api_types::agent::{AgentList, AgentNew, AgentView};
    }

    pub mod customer {
        pub use api_types::customer::{
            CustomerList, CustomerNew, CustomerSummary, CustomerUpdate, CustomerView,
        };
    }

    pub mod transaction {
        pub use api_types::transaction::{
            PostingNew, RecentQuery, TransactionKind, TransactionList, TransactionUpdate,
            TransactionView,
        };
    }

    pub mod statement {
        pub use api_types::statement::{LedgerRowView, StatementView};
        pub use api_types::summary::{AgentCollectionsView, DailyQuery, DailySummary};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Unauthorized => StatusCode::UNAUTHORIZED,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidDate(_) => StatusCode::BAD_REQUEST,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidRole(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
