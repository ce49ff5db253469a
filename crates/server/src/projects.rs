//! Projects API endpoints.

use api_types::project::{Project, ProjectListQuery, ProjectNew, ProjectUpdate};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{NewProjectCmd, UpdateProjectCmd};

use crate::{AuthUser, ServerError, ServerState, extract::ApiJson};

fn map_project(project: engine::Project) -> Project {
    Project {
        id: project.id,
        user: project.user_id,
        name: project.name,
        description: project.description,
        end_date: project.end_date,
        created_at: project.created_at,
        updated_at: project.updated_at,
        is_active: project.is_active,
    }
}

pub async fn list(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<ProjectListQuery>,
) -> Result<Json<Vec<Project>>, ServerError> {
    let projects = state
        .engine
        .list_projects(&user, query.is_active)
        .await?
        .into_iter()
        .map(map_project)
        .collect();
    Ok(Json(projects))
}

pub async fn get(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Project>, ServerError> {
    let project = state.engine.project(&user, id).await?;
    Ok(Json(map_project(project)))
}

pub async fn create(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<ProjectNew>,
) -> Result<(StatusCode, Json<Project>), ServerError> {
    let cmd = NewProjectCmd {
        description: payload.description,
        end_date: payload.end_date,
        is_active: payload.is_active,
        ..NewProjectCmd::new(user, payload.name)
    };
    let project = state.engine.create_project(cmd).await?;
    Ok((StatusCode::CREATED, Json(map_project(project))))
}

pub async fn update(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<ProjectUpdate>,
) -> Result<Json<Project>, ServerError> {
    let cmd = UpdateProjectCmd {
        name: payload.name,
        description: payload.description,
        end_date: payload.end_date,
        is_active: payload.is_active,
    };
    let project = state.engine.update_project(&user, id, cmd).await?;
    Ok(Json(map_project(project)))
}

/// Deletes a project and its tasks.
pub async fn delete(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_project(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
