use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{balances, categories, projects, tasks, teams, transactions};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Username of the caller, inserted by the auth middleware.
#[derive(Clone, Debug)]
pub struct AuthUser(pub String);

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let username = state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await
        .map_err(|err| {
            tracing::error!("authentication failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(AuthUser(username));
    Ok(next.run(request).await)
}

pub fn router(engine: Arc<Engine>) -> Router {
    let state = ServerState { engine };
    Router::new()
        .route("/balances/me/", get(balances::me))
        .route(
            "/transactions/",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/transactions/{id}/",
            get(transactions::get)
                .patch(transactions::update)
                .delete(transactions::delete),
        )
        .route(
            "/categories/",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}/",
            get(categories::get)
                .patch(categories::update)
                .delete(categories::delete),
        )
        .route("/projects/", get(projects::list).post(projects::create))
        .route(
            "/projects/{id}/",
            get(projects::get)
                .patch(projects::update)
                .delete(projects::delete),
        )
        .route(
            "/projects/{project_id}/tasks/",
            get(tasks::list).post(tasks::create),
        )
        .route(
            "/projects/{project_id}/tasks/{id}/",
            get(tasks::get).patch(tasks::update).delete(tasks::delete),
        )
        .route("/teams/", get(teams::list).post(teams::create))
        .route(
            "/teams/{id}/",
            get(teams::get).patch(teams::update).delete(teams::delete),
        )
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
