//! Categories API endpoints.

use api_types::category::{Category, CategoryNew};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{AuthUser, ServerError, ServerState, extract::ApiJson};

fn map_category(category: engine::Category) -> Category {
    Category {
        id: category.id,
        name: category.name,
    }
}

pub async fn list(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Category>>, ServerError> {
    let categories = state
        .engine
        .list_categories(&user)
        .await?
        .into_iter()
        .map(map_category)
        .collect();
    Ok(Json(categories))
}

pub async fn get(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Category>, ServerError> {
    let category = state.engine.category(&user, id).await?;
    Ok(Json(map_category(category)))
}

pub async fn create(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<CategoryNew>,
) -> Result<(StatusCode, Json<Category>), ServerError> {
    let category = state.engine.create_category(&user, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn update(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<CategoryNew>,
) -> Result<Json<Category>, ServerError> {
    let category = state
        .engine
        .update_category(&user, id, &payload.name)
        .await?;
    Ok(Json(map_category(category)))
}

/// Deletes a category; its transactions become uncategorized.
pub async fn delete(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
