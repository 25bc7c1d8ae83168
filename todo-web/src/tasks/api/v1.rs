use crate::session::{SessionId, SessionRegistry};
use crate::tasks::ViewQuery;
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use todo_list::{Outcome, Summary, Task, TaskId, TodoList, ValidationError};
use utoipa::{OpenApi, ToSchema};

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskJson {
    /// Opaque unique identifier of the task
    id: String,
    /// Trimmed, non-empty task text
    text: String,
    /// Whether the task is completed
    done: bool,
    /// Creation time in RFC 3339 format
    created_at: String,
}

impl From<&Task> for TaskJson {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id().to_string(),
            text: task.text().to_string(),
            done: task.is_done(),
            created_at: task
                .created_at()
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

/// Task counts over the whole list.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SummaryJson {
    total: usize,
    done: usize,
    active: usize,
}

impl From<Summary> for SummaryJson {
    fn from(summary: Summary) -> Self {
        Self {
            total: summary.total,
            done: summary.done,
            active: summary.active(),
        }
    }
}

/// API response for listing tasks.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TasksResponse {
    /// Tasks visible in the requested view, in insertion order
    tasks: Vec<TaskJson>,
    /// Number of tasks returned
    count: usize,
    summary: SummaryJson,
}

/// API response for a mutation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OperationResponse {
    /// False when the operation referred to a task that does not exist
    changed: bool,
    /// Confirmation message to show the user, if any
    notice: Option<String>,
    /// The task after the operation, absent when it was deleted or never existed
    task: Option<TaskJson>,
    summary: SummaryJson,
}

impl OperationResponse {
    fn new(outcome: &Outcome, list: &TodoList) -> Self {
        Self {
            changed: outcome.task_id().is_some(),
            notice: outcome.notice().map(|notice| notice.message().to_string()),
            task: outcome
                .task_id()
                .and_then(|id| list.get(id))
                .map(TaskJson::from),
            summary: list.summary().into(),
        }
    }
}

/// Request body for creating a task.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddTaskRequest {
    text: String,
}

/// Request body for replacing the text of a task.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateTextRequest {
    text: String,
}

/// Request body for setting the completion flag of a task.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToggleRequest {
    done: bool,
}

/// JSON response for API errors
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse {
                    error: "validation_error".to_string(),
                    message: err.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

fn apply<F>(
    registry: &SessionRegistry,
    session_id: &SessionId,
    operation: F,
) -> Result<OperationResponse, ApiError>
where
    F: FnOnce(&mut TodoList) -> Result<Outcome, ValidationError>,
{
    let response = registry.with_session(session_id, |list| {
        let outcome = operation(list)?;
        Ok::<_, ValidationError>(OperationResponse::new(&outcome, list))
    })?;
    Ok(response)
}

/// Handler for GET /api/v1/tasks - Returns the tasks of the session in JSON format.
#[tracing::instrument(skip(registry, session_id))]
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    params(
        ("view" = Option<String>, Query, description = "One of all, active, done; defaults to all")
    ),
    responses(
        (status = 200, description = "Successfully retrieved tasks", body = TasksResponse),
        (status = 400, description = "Unknown view")
    ),
    tag = "Tasks"
)]
pub async fn list_tasks_handler(
    State(registry): State<Arc<SessionRegistry>>,
    Extension(session_id): Extension<SessionId>,
    Query(query): Query<ViewQuery>,
) -> Json<TasksResponse> {
    registry.read_session(&session_id, |list| {
        let tasks: Vec<TaskJson> = list
            .filter(query.view)
            .into_iter()
            .map(TaskJson::from)
            .collect();
        let count = tasks.len();
        Json(TasksResponse {
            tasks,
            count,
            summary: list.summary().into(),
        })
    })
}

/// Handler for POST /api/v1/tasks - Adds a task.
#[tracing::instrument(skip(registry, session_id))]
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = AddTaskRequest,
    responses(
        (status = 201, description = "Task created", body = OperationResponse),
        (status = 422, description = "Task text is blank", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn add_task_handler(
    State(registry): State<Arc<SessionRegistry>>,
    Extension(session_id): Extension<SessionId>,
    Json(request): Json<AddTaskRequest>,
) -> Result<(StatusCode, Json<OperationResponse>), ApiError> {
    let response = apply(&registry, &session_id, |list| list.add(&request.text))?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for DELETE /api/v1/tasks/{id} - Deletes a task; unknown ids are not an error.
#[tracing::instrument(skip(registry, session_id))]
#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task deleted, or already absent", body = OperationResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(registry): State<Arc<SessionRegistry>>,
    Extension(session_id): Extension<SessionId>,
    Path(id): Path<TaskId>,
) -> Result<Json<OperationResponse>, ApiError> {
    apply(&registry, &session_id, |list| Ok(list.delete(&id))).map(Json)
}

/// Handler for PUT /api/v1/tasks/{id}/text - Replaces the text of a task.
#[tracing::instrument(skip(registry, session_id))]
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{id}/text",
    params(("id" = String, Path, description = "Task ID")),
    request_body = UpdateTextRequest,
    responses(
        (status = 200, description = "Task updated, or unknown ID ignored", body = OperationResponse),
        (status = 422, description = "Task text is blank", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_text_handler(
    State(registry): State<Arc<SessionRegistry>>,
    Extension(session_id): Extension<SessionId>,
    Path(id): Path<TaskId>,
    Json(request): Json<UpdateTextRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    apply(&registry, &session_id, |list| {
        list.update_text(&id, &request.text)
    })
    .map(Json)
}

/// Handler for PUT /api/v1/tasks/{id}/done - Sets the completion flag of a task.
#[tracing::instrument(skip(registry, session_id))]
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{id}/done",
    params(("id" = String, Path, description = "Task ID")),
    request_body = ToggleRequest,
    responses(
        (status = 200, description = "Flag set, or unknown ID ignored", body = OperationResponse)
    ),
    tag = "Tasks"
)]
pub async fn toggle_task_handler(
    State(registry): State<Arc<SessionRegistry>>,
    Extension(session_id): Extension<SessionId>,
    Path(id): Path<TaskId>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    apply(&registry, &session_id, |list| {
        Ok(list.toggle_done(&id, request.done))
    })
    .map(Json)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list_tasks_handler,
        add_task_handler,
        delete_task_handler,
        update_task_text_handler,
        toggle_task_handler
    ),
    components(schemas(
        TaskJson,
        SummaryJson,
        TasksResponse,
        OperationResponse,
        AddTaskRequest,
        UpdateTextRequest,
        ToggleRequest,
        ErrorResponse
    )),
    tags((name = "Tasks", description = "Session-scoped to-do list"))
)]
pub struct ApiDoc;

/// Handler for GET /api-docs/openapi.json.
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Creates and returns the tasks API router.
pub fn create_api_router(registry: Arc<SessionRegistry>) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks_handler).post(add_task_handler))
        .route("/tasks/{id}", axum::routing::delete(delete_task_handler))
        .route("/tasks/{id}/text", put(update_task_text_handler))
        .route("/tasks/{id}/done", put(toggle_task_handler))
        .with_state(registry)
}
