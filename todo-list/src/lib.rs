//! Session-scoped to-do list: the task model, its ordered store, and the
//! operations a UI calls to add, edit, toggle, filter and delete tasks.
pub mod store;
pub mod task;
pub mod todo;
pub mod view;

pub use store::TaskStore;
pub use task::{Task, TaskId, ValidationError};
pub use todo::{Change, Notice, Outcome, Summary, TodoList};
pub use view::{ParseViewError, View};
