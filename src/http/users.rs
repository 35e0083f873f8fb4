//! User CRUD handlers.
//!
//! JSON routes under `/users`, plus form routes (`/welcome`, `/edit/{id}`,
//! `/delete/{id}`) for HTML form posts. Extractor rejections are turned into
//! `ApiError` so malformed requests get the usual JSON error body.

use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Form, Json,
};

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::store::{NewUser, StoreError, UserPatch, UserRecord};

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserRecord>>, ApiError> {
    let users = state.users.list().await?;
    tracing::info!(count = users.len(), "Fetched {} users", users.len());
    Ok(Json(users))
}

pub async fn create_user(
    State(state): State<AppState>,
    user: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<UserRecord>), ApiError> {
    let Json(user) = user?;
    register(&state, user).await
}

/// Form registration.
pub async fn welcome(
    State(state): State<AppState>,
    user: Result<Form<NewUser>, FormRejection>,
) -> Result<(StatusCode, Json<UserRecord>), ApiError> {
    let Form(user) = user?;
    register(&state, user).await
}

async fn register(state: &AppState, user: NewUser) -> Result<(StatusCode, Json<UserRecord>), ApiError> {
    let record = state.users.create(user).await?;
    tracing::info!(user_id = record.id, name = %record.name, "New user added");
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<UserRecord>, ApiError> {
    let Path(id) = id?;
    let user = state
        .users
        .find(id)
        .await?
        .ok_or(StoreError::NotFound(id))?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    patch: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Json<UserRecord>, ApiError> {
    let (Path(id), Json(patch)) = (id?, patch?);
    edit(&state, id, patch).await
}

/// Form edit.
pub async fn edit_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    patch: Result<Form<UserPatch>, FormRejection>,
) -> Result<Json<UserRecord>, ApiError> {
    let (Path(id), Form(patch)) = (id?, patch?);
    edit(&state, id, patch).await
}

async fn edit(state: &AppState, id: i64, patch: UserPatch) -> Result<Json<UserRecord>, ApiError> {
    let record = state.users.update(id, patch).await?;
    tracing::info!(
        user_id = id,
        name = %record.name,
        email = %record.email,
        "Edited user {}",
        id
    );
    Ok(Json(record))
}

pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.users.delete(id).await?;
    tracing::info!(user_id = id, "Deleted user with ID {}", id);
    Ok(StatusCode::NO_CONTENT)
}
