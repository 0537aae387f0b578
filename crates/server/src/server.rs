use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{agents, customers, statements, transactions};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Authenticates every request with HTTP Basic credentials and stores the
/// resulting [`engine::Actor`] as a request extension.
async fn auth(
    State(state): State<ServerState>,
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let actor = match state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await
    {
        Ok(actor) => actor,
        Err(EngineError::Unauthorized) => return Err(StatusCode::UNAUTHORIZED),
        Err(err) => {
            tracing::error!("authentication failed: {err}");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

/// Builds the API router around a shared engine.
pub fn router(engine: Arc<Engine>) -> Router {
    let state = ServerState { engine };
    Router::new()
        .route("/agents", get(agents::list).post(agents::create))
        .route(
            "/agents/{username}",
            axum::routing::delete(agents::deactivate),
        )
        .route("/customers", get(customers::list).post(customers::create))
        .route(
            "/customers/{id}",
            get(customers::get)
                .patch(customers::update)
                .delete(customers::delete),
        )
        .route(
            "/customers/{id}/transactions",
            get(customers::transactions),
        )
        .route("/customers/{id}/statement", get(statements::statement))
        .route("/customers/{id}/debits", get(statements::debits))
        .route("/customers/{id}/collections", get(statements::collections))
        .route("/collections", post(transactions::collect))
        .route("/debits", post(transactions::debit))
        .route("/transactions/recent", get(transactions::recent))
        .route(
            "/transactions/{id}",
            patch(transactions::update).delete(transactions::delete),
        )
        .route("/summary/daily", get(statements::daily))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(Arc::new(engine))).await
}
