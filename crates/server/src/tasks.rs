//! Tasks API endpoints, nested under `/projects/{project_id}/tasks/`.

use api_types::task::{Task, TaskNew, TaskStatus as ApiStatus, TaskUpdate};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{NewTaskCmd, TaskStatus, UpdateTaskCmd};

use crate::{AuthUser, ServerError, ServerState, extract::ApiJson};

fn map_status(status: ApiStatus) -> TaskStatus {
    match status {
        ApiStatus::N => TaskStatus::NotStarted,
        ApiStatus::P => TaskStatus::InProgress,
        ApiStatus::R => TaskStatus::InReview,
        ApiStatus::C => TaskStatus::Completed,
    }
}

fn map_api_status(status: TaskStatus) -> ApiStatus {
    match status {
        TaskStatus::NotStarted => ApiStatus::N,
        TaskStatus::InProgress => ApiStatus::P,
        TaskStatus::InReview => ApiStatus::R,
        TaskStatus::Completed => ApiStatus::C,
    }
}

fn map_task(task: engine::Task) -> Task {
    Task {
        id: task.id,
        project: task.project_id,
        user: task.user_id,
        owner: task.owner_id,
        name: task.name,
        description: task.description,
        status: map_api_status(task.status),
        priority: task.priority,
        due_date: task.due_date,
        created_at: task.created_at,
        updated_at: task.updated_at,
    }
}

pub async fn list(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(project_id): Path<i32>,
) -> Result<Json<Vec<Task>>, ServerError> {
    let tasks = state
        .engine
        .list_tasks(&user, project_id)
        .await?
        .into_iter()
        .map(map_task)
        .collect();
    Ok(Json(tasks))
}

pub async fn get(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path((project_id, id)): Path<(i32, i32)>,
) -> Result<Json<Task>, ServerError> {
    let task = state.engine.task(&user, project_id, id).await?;
    Ok(Json(map_task(task)))
}

pub async fn create(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(project_id): Path<i32>,
    ApiJson(payload): ApiJson<TaskNew>,
) -> Result<(StatusCode, Json<Task>), ServerError> {
    let cmd = NewTaskCmd {
        description: payload.description,
        status: payload.status.map(map_status),
        priority: payload.priority,
        due_date: payload.due_date,
        owner: payload.owner,
        ..NewTaskCmd::new(user, project_id, payload.name)
    };
    let task = state.engine.create_task(cmd).await?;
    Ok((StatusCode::CREATED, Json(map_task(task))))
}

pub async fn update(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path((project_id, id)): Path<(i32, i32)>,
    ApiJson(payload): ApiJson<TaskUpdate>,
) -> Result<Json<Task>, ServerError> {
    let cmd = UpdateTaskCmd {
        name: payload.name,
        description: payload.description,
        status: payload.status.map(map_status),
        priority: payload.priority,
        due_date: payload.due_date,
        owner: payload.owner,
    };
    let task = state.engine.update_task(&user, project_id, id, cmd).await?;
    Ok(Json(map_task(task)))
}

pub async fn delete(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path((project_id, id)): Path<(i32, i32)>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_task(&user, project_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
