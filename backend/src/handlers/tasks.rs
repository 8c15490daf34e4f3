use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use taskflow_shared::{
    CreateTaskRequest, MessageResponse, Task, TaskListResponse, TaskResponse, UpdateTaskRequest,
    DATE_FORMAT,
};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::store;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    date: Option<String>,
}

fn parse_day(date: Option<&str>) -> Result<NaiveDate, ApiError> {
    match date.filter(|date| !date.is_empty()) {
        Some(date) => NaiveDate::parse_from_str(date, DATE_FORMAT)
            .map_err(|_| ApiError::BadRequest("date must be formatted as YYYY-MM-DD".to_string())),
        None => Ok(taskflow_shared::today()),
    }
}

// Ids that are not numbers cannot name a task.
fn task_id(id: Result<Path<u64>, PathRejection>) -> Result<u64, ApiError> {
    id.map(|Path(id)| id).map_err(|_| ApiError::TaskNotFound)
}

async fn owned_task(state: &AppState, user_id: u64, id: u64) -> Result<Task, ApiError> {
    state
        .store
        .task(user_id, id)
        .await?
        .ok_or(ApiError::TaskNotFound)
}

pub async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let Query(query) = query?;
    let day = parse_day(query.date.as_deref())?;

    let tasks = state.store.tasks_on(user.id, day).await?;
    tracing::debug!(user_id = user.id, %day, count = tasks.len(), "listed tasks");
    Ok(Json(TaskListResponse { tasks }))
}

pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let Json(input) = payload?;
    if input.description.trim().is_empty() {
        return Err(ApiError::BadRequest("description is required".to_string()));
    }

    let task = state.store.create_task(user.id, input.description).await?;
    tracing::info!(user_id = user.id, task_id = task.id, "created task");
    Ok(Json(TaskResponse {
        message: "created".to_string(),
        task,
    }))
}

pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let id = task_id(id)?;
    let Json(input) = payload?;
    let mut task = owned_task(&state, user.id, id).await?;

    if let Some(description) = input.description.filter(|d| !d.is_empty()) {
        task.description = description;
    }
    if let Some(status) = input.status {
        task.status = status;
    }
    task.updated_at = store::now();

    state.store.save_task(&task).await?;
    tracing::info!(user_id = user.id, task_id = id, status = task.status.as_str(), "updated task");
    Ok(Json(TaskResponse {
        message: "updated".to_string(),
        task,
    }))
}

pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = task_id(id)?;
    let task = owned_task(&state, user.id, id).await?;
    state.store.delete_task(&task).await?;

    tracing::info!(user_id = user.id, task_id = id, "deleted task");
    Ok(Json(MessageResponse {
        message: "deleted".to_string(),
    }))
}
