//! Statement and summary endpoints.

use api_types::{
    statement::StatementView,
    summary::{AgentCollectionsView, DailyQuery, DailySummary},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use engine::{Actor, LedgerView, Money};

use crate::{ServerError, mapping::statement_view, server::ServerState};

async fn view(
    state: &ServerState,
    actor: &Actor,
    id: i64,
    view: LedgerView,
) -> Result<Json<StatementView>, ServerError> {
    let statement = state.engine.statement_view(actor, id, view).await?;
    Ok(Json(statement_view(statement)))
}

pub async fn statement(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<StatementView>, ServerError> {
    view(&state, &actor, id, LedgerView::Statement).await
}

pub async fn debits(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<StatementView>, ServerError> {
    view(&state, &actor, id, LedgerView::Debits).await
}

pub async fn collections(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<StatementView>, ServerError> {
    view(&state, &actor, id, LedgerView::Collections).await
}

pub async fn daily(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Query(query): Query<DailyQuery>,
) -> Result<Json<DailySummary>, ServerError> {
    let day = query.day.unwrap_or_else(|| Utc::now().date_naive());
    let lines = state.engine.daily_collections(&actor, day).await?;

    let total_minor = lines
        .iter()
        .fold(Money::ZERO, |sum, line| sum.saturating_add(line.total))
        .minor();
    let agents = lines
        .into_iter()
        .map(|line| AgentCollectionsView {
            agent_id: line.agent_id,
            count: line.count,
            total_minor: line.total.minor(),
        })
        .collect();

    Ok(Json(DailySummary {
        day,
        agents,
        total_minor,
    }))
}
