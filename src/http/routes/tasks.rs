use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::application::task_service::TaskService;
use crate::domain::task::{
    CreateTask, Task, TaskFilter, TaskId, TaskStats, UpdateTask, PRIORITY_MEDIUM, STATUS_PENDING,
};
use crate::http::types::ApiError;

#[derive(Clone)]
pub struct AppState<S: TaskService> {
    pub service: S,
}

pub fn router<S: TaskService + Clone>(state: AppState<S>) -> Router {
    Router::new()
        .route("/api/tasks", post(create_task::<S>).get(list_tasks::<S>))
        .route("/api/tasks/stats", get(task_stats::<S>))
        .route(
            "/api/tasks/:id",
            get(get_task::<S>).put(update_task::<S>).delete(delete_task::<S>),
        )
        .with_state(state)
}

#[derive(Deserialize)]
struct ListParams {
    status: Option<String>,
    priority: Option<String>,
}

async fn list_tasks<S: TaskService>(
    State(state): State<AppState<S>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let filter = TaskFilter { status: params.status, priority: params.priority };
    let tasks = state.service.list(filter).await.map_err(ApiError::internal)?;
    Ok(Json(tasks))
}

#[derive(Deserialize)]
struct CreateBody {
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    due_date: Option<String>,
}

async fn create_task<S: TaskService>(
    State(state): State<AppState<S>>,
    Json(body): Json<CreateBody>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let title = match body.title {
        Some(t) if !t.is_empty() => t,
        _ => return Err(ApiError::bad_request("Title is required")),
    };
    let due_date = match body.due_date.as_deref() {
        Some(s) if !s.is_empty() => Some(parse_due_date(s)?),
        _ => None,
    };
    let input = CreateTask {
        title,
        description: body.description.unwrap_or_default(),
        status: body.status.unwrap_or_else(|| STATUS_PENDING.into()),
        priority: body.priority.unwrap_or_else(|| PRIORITY_MEDIUM.into()),
        due_date,
    };
    let task = state.service.create(input).await.map_err(ApiError::internal)?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task<S: TaskService>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    let task = state.service.get(TaskId(id)).await.map_err(ApiError::internal)?;
    task.map(Json).ok_or_else(ApiError::not_found)
}

#[derive(Deserialize)]
struct UpdateBody {
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    due_date: Option<String>,
}

async fn update_task<S: TaskService>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<Task>, ApiError> {
    // A null or empty due_date leaves the stored value alone.
    let due_date = match body.due_date.as_deref() {
        Some(s) if !s.is_empty() => Some(parse_due_date(s)?),
        _ => None,
    };
    let input = UpdateTask {
        title: body.title,
        description: body.description,
        status: body.status,
        priority: body.priority,
        due_date,
    };
    let updated = state.service.update(TaskId(id), input).await.map_err(ApiError::internal)?;
    updated.map(Json).ok_or_else(ApiError::not_found)
}

async fn delete_task<S: TaskService>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = state.service.delete(TaskId(id)).await.map_err(ApiError::internal)?;
    if deleted {
        Ok(Json(serde_json::json!({ "message": "Task deleted successfully" })))
    } else {
        Err(ApiError::not_found())
    }
}

async fn task_stats<S: TaskService>(
    State(state): State<AppState<S>>,
) -> Result<Json<TaskStats>, ApiError> {
    let stats = state.service.stats().await.map_err(ApiError::internal)?;
    Ok(Json(stats))
}

fn parse_due_date(s: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::bad_request("due_date must be an ISO-8601 timestamp"))
}
