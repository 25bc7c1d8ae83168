use askama::Template;
use axum::{
    Extension, Form, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::Html,
    routing::{get, put},
};
use serde::Deserialize;
use std::sync::Arc;
use todo_list::{Notice, Outcome, Task, TaskId, TodoList, ValidationError, View};

use crate::session::{SessionId, SessionRegistry};
use crate::tasks::{TaskPanel, ViewQuery};

#[derive(Debug, Deserialize)]
pub struct AddTaskForm {
    text: String,
    #[serde(default)]
    view: View,
}

#[derive(Debug, Deserialize)]
pub struct EditTaskForm {
    text: String,
}

/// Checkbox form: an unchecked box submits nothing, which reads as `false`.
#[derive(Debug, Deserialize)]
pub struct ToggleTaskForm {
    #[serde(default)]
    done: bool,
}

/// Custom error type for task handler operations.
#[derive(Debug, thiserror::Error)]
enum TaskError {
    /// Submitted task text was blank.
    #[error("Invalid task text")]
    Validation(#[from] ValidationError),
    /// No task with this ID exists in the session.
    #[error("Task {0} not found")]
    NotFound(TaskId),
    /// Represents an error during template rendering.
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
}

impl axum::response::IntoResponse for TaskError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, user_facing_error_message) = match self {
            TaskError::Validation(ValidationError::EmptyText) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "Task cannot be empty!")
            }
            TaskError::NotFound(_) => (StatusCode::NOT_FOUND, "Task not found."),
            TaskError::Template(err) => {
                tracing::error!("Failed to render task template: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred while processing your request. Please try again later.",
                )
            }
        };

        let error_template = ErrorMessageTemplate::new(user_facing_error_message.to_string());
        let Ok(rendered) = error_template.render() else {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        };

        let mut response = (status_code, Html(rendered)).into_response();
        // Send the message to the notice area instead of replacing the task list
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("hx-retarget"),
            HeaderValue::from_static("#notice"),
        );
        headers.insert(
            HeaderName::from_static("hx-reswap"),
            HeaderValue::from_static("innerHTML"),
        );
        response.headers_mut().extend(headers);
        response
    }
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    panel: TaskPanel,
    notice: Option<Notice>,
}

impl IndexTemplate {
    pub fn new(panel: TaskPanel) -> Self {
        Self {
            panel,
            notice: None,
        }
    }
}

#[derive(Template)]
#[template(path = "tasks/panel.html")]
struct TaskPanelTemplate {
    panel: TaskPanel,
    notice: Option<Notice>,
}

impl TaskPanelTemplate {
    pub fn new(panel: TaskPanel, notice: Option<Notice>) -> Self {
        Self { panel, notice }
    }
}

#[derive(Template)]
#[template(path = "tasks/task_row.html")]
struct TaskRowTemplate {
    task: Task,
    view: View,
}

impl TaskRowTemplate {
    pub fn new(task: Task, view: View) -> Self {
        Self { task, view }
    }
}

#[derive(Template)]
#[template(path = "tasks/edit_task_form.html")]
struct EditTaskFormTemplate {
    task: Task,
    view: View,
}

impl EditTaskFormTemplate {
    pub fn new(task: Task, view: View) -> Self {
        Self { task, view }
    }
}

#[derive(Template)]
#[template(path = "error_message.html")]
struct ErrorMessageTemplate {
    message: String,
}

impl ErrorMessageTemplate {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

/// Runs one operation against the session's list and renders the refreshed
/// panel for `view` together with the operation's notice.
fn render_after<F>(
    registry: &SessionRegistry,
    session_id: &SessionId,
    view: View,
    operation: F,
) -> Result<Html<String>, TaskError>
where
    F: FnOnce(&mut TodoList) -> Result<Outcome, ValidationError>,
{
    let (outcome, panel) = registry.with_session(session_id, |list| {
        let outcome = operation(list)?;
        Ok::<_, ValidationError>((outcome, TaskPanel::new(list, view)))
    })?;
    tracing::debug!(
        change = ?outcome.change(),
        refresh = outcome.is_refresh(),
        "task operation applied"
    );
    let template = TaskPanelTemplate::new(panel, outcome.notice().cloned());
    template.render().map(Html).map_err(TaskError::from)
}

fn find_task(
    registry: &SessionRegistry,
    session_id: &SessionId,
    id: TaskId,
) -> Result<Task, TaskError> {
    registry
        .read_session(session_id, |list| list.get(&id).cloned())
        .ok_or(TaskError::NotFound(id))
}

/// Handler for `/` that renders the whole page.
#[tracing::instrument(skip(registry, session_id))]
async fn index_handler(
    State(registry): State<Arc<SessionRegistry>>,
    Extension(session_id): Extension<SessionId>,
    Query(query): Query<ViewQuery>,
) -> Result<Html<String>, TaskError> {
    let panel = registry.read_session(&session_id, |list| TaskPanel::new(list, query.view));
    let template = IndexTemplate::new(panel);
    template.render().map(Html).map_err(TaskError::from)
}

/// Handler for GET /tasks that returns the task panel for the selected view.
#[tracing::instrument(skip(registry, session_id))]
async fn task_panel_handler(
    State(registry): State<Arc<SessionRegistry>>,
    Extension(session_id): Extension<SessionId>,
    Query(query): Query<ViewQuery>,
) -> Result<Html<String>, TaskError> {
    let panel = registry.read_session(&session_id, |list| TaskPanel::new(list, query.view));
    let template = TaskPanelTemplate::new(panel, None);
    template.render().map(Html).map_err(TaskError::from)
}

/// Handler for creating a new task via POST request.
#[tracing::instrument(skip(registry, session_id))]
async fn add_task_handler(
    State(registry): State<Arc<SessionRegistry>>,
    Extension(session_id): Extension<SessionId>,
    Form(form): Form<AddTaskForm>,
) -> Result<Html<String>, TaskError> {
    render_after(&registry, &session_id, form.view, |list| list.add(&form.text))
}

/// Handler for GET /tasks/{id} that returns a single task row.
#[tracing::instrument(skip(registry, session_id))]
async fn task_row_handler(
    State(registry): State<Arc<SessionRegistry>>,
    Extension(session_id): Extension<SessionId>,
    Path(id): Path<TaskId>,
    Query(query): Query<ViewQuery>,
) -> Result<Html<String>, TaskError> {
    let task = find_task(&registry, &session_id, id)?;
    let template = TaskRowTemplate::new(task, query.view);
    template.render().map(Html).map_err(TaskError::from)
}

/// Handler for serving the inline edit form of a task.
#[tracing::instrument(skip(registry, session_id))]
async fn edit_task_form_handler(
    State(registry): State<Arc<SessionRegistry>>,
    Extension(session_id): Extension<SessionId>,
    Path(id): Path<TaskId>,
    Query(query): Query<ViewQuery>,
) -> Result<Html<String>, TaskError> {
    let task = find_task(&registry, &session_id, id)?;
    let template = EditTaskFormTemplate::new(task, query.view);
    template.render().map(Html).map_err(TaskError::from)
}

/// Handler for updating the text of a task via PUT request.
#[tracing::instrument(skip(registry, session_id))]
async fn update_task_handler(
    State(registry): State<Arc<SessionRegistry>>,
    Extension(session_id): Extension<SessionId>,
    Path(id): Path<TaskId>,
    Query(query): Query<ViewQuery>,
    Form(form): Form<EditTaskForm>,
) -> Result<Html<String>, TaskError> {
    render_after(&registry, &session_id, query.view, |list| {
        list.update_text(&id, &form.text)
    })
}

/// Handler for setting the completion flag of a task via PUT request.
#[tracing::instrument(skip(registry, session_id))]
async fn toggle_task_handler(
    State(registry): State<Arc<SessionRegistry>>,
    Extension(session_id): Extension<SessionId>,
    Path(id): Path<TaskId>,
    Query(query): Query<ViewQuery>,
    Form(form): Form<ToggleTaskForm>,
) -> Result<Html<String>, TaskError> {
    render_after(&registry, &session_id, query.view, |list| {
        Ok(list.toggle_done(&id, form.done))
    })
}

/// Handler for deleting a task via DELETE request.
#[tracing::instrument(skip(registry, session_id))]
async fn delete_task_handler(
    State(registry): State<Arc<SessionRegistry>>,
    Extension(session_id): Extension<SessionId>,
    Path(id): Path<TaskId>,
    Query(query): Query<ViewQuery>,
) -> Result<Html<String>, TaskError> {
    render_after(&registry, &session_id, query.view, |list| Ok(list.delete(&id)))
}

/// Creates and returns the task router with the page and all htmx fragments.
pub fn create_task_router(registry: Arc<SessionRegistry>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/tasks", get(task_panel_handler).post(add_task_handler))
        .route(
            "/tasks/{id}",
            get(task_row_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .route("/tasks/{id}/edit", get(edit_task_form_handler))
        .route("/tasks/{id}/done", put(toggle_task_handler))
        .with_state(registry)
}
