//! `/api/todos` routes.
//!
//! Handlers validate ids and payloads first, then take the store lock once:
//! a read lock for list/get/stats, a write lock for anything that mutates.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::Serialize;
use tokio::sync::RwLock;
use todo_core::{
    validate_create, validate_id, validate_update, CreateTodoPayload, Statistics, Todo,
    TodoQuery, TodoStore, UpdateTodoPayload,
};
use uuid::Uuid;

use crate::error::{ApiError, TODO_NOT_FOUND};
use crate::not_found;

pub type Db = Arc<RwLock<TodoStore>>;

/// Query string of `GET /api/todos`. Everything arrives as text and is
/// interpreted in `into_query`.
#[derive(Debug, Default, PartialEq)]
pub struct ListParams {
    pub completed: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

impl ListParams {
    /// Collect raw query pairs. A repeated key keeps every value joined with
    /// `,`, so `completed=true&completed=true` is not `"true"` and a repeated
    /// priority names no priority.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = ListParams::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "completed" => &mut params.completed,
                "priority" => &mut params.priority,
                "category" => &mut params.category,
                "search" => &mut params.search,
                "limit" => &mut params.limit,
                "page" => &mut params.page,
                _ => continue,
            };
            match slot {
                Some(existing) => {
                    existing.push(',');
                    existing.push_str(&value);
                }
                None => *slot = Some(value),
            }
        }
        params
    }

    /// `completed` filters on `== "true"`; `limit`/`page` read their leading
    /// integer and fall back to the defaults when there is none.
    pub fn into_query(self) -> TodoQuery {
        TodoQuery {
            completed: self.completed.map(|c| c == "true"),
            priority: self.priority,
            category: self.category,
            search: self.search,
            page: self.page.as_deref().and_then(leading_integer),
            limit: self.limit.as_deref().and_then(leading_integer),
        }
    }
}

/// `"5abc"` is 5, `"2.5"` is 2, `" -3"` is -3, `"abc"` is nothing.
fn leading_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let digits_start = usize::from(raw.starts_with(['-', '+']));
    let end = raw[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(raw.len(), |i| i + digits_start);
    raw[..end].parse().ok()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub success: bool,
    pub count: usize,
    pub total_count: usize,
    pub page: usize,
    pub total_pages: usize,
    pub data: Vec<Todo>,
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> MessageResponse<T> {
    fn new(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: String,
}

pub fn create_todo_router(db: Db) -> Router {
    Router::new()
        .route(
            "/api/todos",
            get(list_todos).post(create_todo).fallback(not_found),
        )
        .route("/api/todos/stats", get(todo_stats).fallback(not_found))
        .route(
            "/api/todos/health/check",
            get(health_check).fallback(not_found),
        )
        .route(
            "/api/todos/{id}",
            get(get_todo)
                .put(update_todo)
                .delete(delete_todo)
                .fallback(not_found),
        )
        .route(
            "/api/todos/{id}/toggle",
            patch(toggle_todo).fallback(not_found),
        )
        .with_state(db)
}

/// A blank id is a bad request; anything that is not a UUID cannot name a
/// record and is reported the same way as an unknown UUID.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    let id = validate_id(raw)?;
    Uuid::parse_str(id).map_err(|_| ApiError::NotFound(TODO_NOT_FOUND.to_string()))
}

#[tracing::instrument(skip(db))]
pub async fn list_todos(
    State(db): State<Db>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<ListResponse>, ApiError> {
    let Query(pairs) = pairs?;
    let query = ListParams::from_pairs(pairs).into_query();
    let page = db.read().await.query(&query);
    tracing::info!(count = page.count, page = page.page, "returning todos");
    Ok(Json(ListResponse {
        success: true,
        count: page.count,
        total_count: page.total_count,
        page: page.page,
        total_pages: page.total_pages,
        data: page.items,
    }))
}

#[tracing::instrument(skip(db))]
pub async fn get_todo(
    State(db): State<Db>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<DataResponse<Todo>>, ApiError> {
    let Path(id) = id?;
    let id = parse_id(&id)?;
    let todo = db.read().await.get(id)?;
    Ok(Json(DataResponse {
        success: true,
        data: todo,
    }))
}

#[tracing::instrument(skip(db, payload))]
pub async fn create_todo(
    State(db): State<Db>,
    payload: Result<Json<CreateTodoPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse<Todo>>), ApiError> {
    let Json(payload) = payload?;
    let input = validate_create(payload)?;
    let todo = db.write().await.create(input);
    Ok((
        StatusCode::CREATED,
        MessageResponse::new("Todo created successfully", todo),
    ))
}

#[tracing::instrument(skip(db, payload))]
pub async fn update_todo(
    State(db): State<Db>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateTodoPayload>, JsonRejection>,
) -> Result<Json<MessageResponse<Todo>>, ApiError> {
    let Path(id) = id?;
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let patch = validate_update(payload)?;
    let todo = db.write().await.update(id, patch)?;
    Ok(MessageResponse::new("Todo updated successfully", todo))
}

#[tracing::instrument(skip(db))]
pub async fn toggle_todo(
    State(db): State<Db>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<MessageResponse<Todo>>, ApiError> {
    let Path(id) = id?;
    let id = parse_id(&id)?;
    let todo = db.write().await.toggle(id)?;
    let status = if todo.completed { "completed" } else { "pending" };
    Ok(MessageResponse::new(format!("Todo marked as {status}"), todo))
}

#[tracing::instrument(skip(db))]
pub async fn delete_todo(
    State(db): State<Db>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<MessageResponse<Todo>>, ApiError> {
    let Path(id) = id?;
    let id = parse_id(&id)?;
    let todo = db.write().await.delete(id)?;
    Ok(MessageResponse::new("Todo deleted successfully", todo))
}

#[tracing::instrument(skip(db))]
pub async fn todo_stats(State(db): State<Db>) -> Json<DataResponse<Statistics>> {
    let stats = db.read().await.stats();
    tracing::debug!(?stats, "computed statistics");
    Json(DataResponse {
        success: true,
        data: stats,
    })
}

#[tracing::instrument]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "Todo routes are healthy",
        timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    })
}
