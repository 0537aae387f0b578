//! Customer endpoints.

use api_types::{
    customer::{CustomerList, CustomerNew, CustomerUpdate, CustomerView},
    transaction::TransactionList,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{Actor, Money};

use crate::{
    ServerError,
    mapping::{customer_summary, customer_view, transaction_view},
    server::ServerState,
};

pub async fn list(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<CustomerList>, ServerError> {
    let customers = state.engine.list_customers(&actor).await?;
    Ok(Json(CustomerList {
        customers: customers.into_iter().map(customer_summary).collect(),
    }))
}

pub async fn create(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<CustomerNew>,
) -> Result<(StatusCode, Json<CustomerView>), ServerError> {
    let customer = state
        .engine
        .create_customer(
            &actor,
            engine::NewCustomer {
                name: payload.name,
                phone: payload.phone,
                opening_balance: Money::new(payload.opening_balance_minor),
                agent_id: payload.agent_id,
            },
            Utc::now(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(customer_view(customer))))
}

pub async fn get(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<CustomerView>, ServerError> {
    let customer = state.engine.customer(&actor, id).await?;
    Ok(Json(customer_view(customer)))
}

pub async fn update(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerUpdate>,
) -> Result<Json<CustomerView>, ServerError> {
    let customer = state
        .engine
        .update_customer(
            &actor,
            id,
            engine::CustomerUpdate {
                name: payload.name,
                phone: payload.phone,
                opening_balance: payload.opening_balance_minor.map(Money::new),
                agent_id: payload.agent_id,
            },
        )
        .await?;
    Ok(Json(customer_view(customer)))
}

pub async fn delete(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_customer(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Transactions of a customer, oldest first.
pub async fn transactions(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<TransactionList>, ServerError> {
    let txs = state.engine.list_customer_transactions(&actor, id).await?;
    Ok(Json(TransactionList {
        transactions: txs.into_iter().map(transaction_view).collect(),
    }))
}
