//! Posting endpoints.

use api_types::transaction::{
    PostingNew, RecentQuery, TransactionList, TransactionUpdate, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{Actor, Money, NewPosting};

use crate::{ServerError, mapping::transaction_view, server::ServerState};

const DEFAULT_RECENT_LIMIT: u64 = 50;
const MAX_RECENT_LIMIT: u64 = 500;

fn posting(payload: PostingNew) -> NewPosting {
    NewPosting {
        customer_id: payload.customer_id,
        amount: Money::new(payload.amount_minor),
        note: payload.note,
        created_at: payload
            .created_at
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now),
    }
}

pub async fn collect(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<PostingNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let tx = state
        .engine
        .record_collection(&actor, posting(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(transaction_view(tx))))
}

pub async fn debit(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<PostingNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let tx = state.engine.record_debit(&actor, posting(payload)).await?;
    Ok((StatusCode::CREATED, Json(transaction_view(tx))))
}

/// Latest postings, newest first.
pub async fn recent(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<TransactionList>, ServerError> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    if limit == 0 || limit > MAX_RECENT_LIMIT {
        return Err(ServerError::Generic(format!(
            "limit must be between 1 and {MAX_RECENT_LIMIT}"
        )));
    }
    let txs = state.engine.recent_transactions(&actor, limit).await?;
    Ok(Json(TransactionList {
        transactions: txs.into_iter().map(transaction_view).collect(),
    }))
}

pub async fn update(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .update_transaction(
            &actor,
            id,
            Money::new(payload.amount_minor),
            payload.note.as_deref(),
        )
        .await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn delete(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
