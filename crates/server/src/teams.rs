//! Teams API endpoints.

use api_types::team::{Team, TeamMembers};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{AuthUser, ServerError, ServerState, extract::ApiJson};

fn map_team(team: engine::Team) -> Team {
    Team {
        id: team.id,
        user: team.user_id,
        members: team.members,
    }
}

pub async fn list(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Team>>, ServerError> {
    let teams = state
        .engine
        .list_teams(&user)
        .await?
        .into_iter()
        .map(map_team)
        .collect();
    Ok(Json(teams))
}

pub async fn get(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Team>, ServerError> {
    let team = state.engine.team(&user, id).await?;
    Ok(Json(map_team(team)))
}

pub async fn create(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<TeamMembers>,
) -> Result<(StatusCode, Json<Team>), ServerError> {
    let team = state.engine.create_team(&user, &payload.members).await?;
    Ok((StatusCode::CREATED, Json(map_team(team))))
}

/// Replaces the member list.
pub async fn update(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<TeamMembers>,
) -> Result<Json<Team>, ServerError> {
    let team = state
        .engine
        .update_team(&user, id, &payload.members)
        .await?;
    Ok(Json(map_team(team)))
}

pub async fn delete(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_team(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
