//! Agent provisioning endpoints (administrators only).

use api_types::agent::{AgentList, AgentNew, AgentView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{Actor, NewUser};

use crate::{ServerError, mapping::agent_view, server::ServerState};

pub async fn list(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<AgentList>, ServerError> {
    let agents = state.engine.list_agents(&actor).await?;
    Ok(Json(AgentList {
        agents: agents.into_iter().map(agent_view).collect(),
    }))
}

pub async fn create(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<AgentNew>,
) -> Result<(StatusCode, Json<AgentView>), ServerError> {
    let user = state
        .engine
        .create_agent(
            &actor,
            NewUser {
                username: payload.username,
                password: payload.password,
                display_name: payload.display_name,
            },
            Utc::now(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(agent_view(user))))
}

pub async fn deactivate(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(username): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.deactivate_agent(&actor, &username).await?;
    Ok(StatusCode::NO_CONTENT)
}
