use crate::store::TaskStore;
use crate::task::{Task, TaskId, ValidationError, normalize_text};
use crate::view::View;

/// What a successful operation did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Added(TaskId),
    Removed(TaskId),
    Updated(TaskId),
    Toggled(TaskId),
    /// The operation referred to a task that does not exist.
    Unchanged,
}

/// User-facing confirmation of a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    message: &'static str,
}

impl Notice {
    pub const TASK_ADDED: Notice = Notice::success("Task added successfully!");
    pub const TASK_DELETED: Notice = Notice::success("Task deleted");
    pub const TASK_UPDATED: Notice = Notice::success("Task updated");

    const fn success(message: &'static str) -> Self {
        Self { message }
    }

    pub fn message(&self) -> &'static str {
        self.message
    }
}

/// Result of a successful operation, consumed by the presentation layer to
/// decide what to redraw and what to tell the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    change: Change,
    notice: Option<Notice>,
}

impl Outcome {
    fn new(change: Change, notice: Option<Notice>) -> Self {
        Self { change, notice }
    }

    pub fn change(&self) -> &Change {
        &self.change
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Returns the id of the task the operation touched, if any.
    pub fn task_id(&self) -> Option<&TaskId> {
        match &self.change {
            Change::Added(id) | Change::Removed(id) | Change::Updated(id) | Change::Toggled(id) => {
                Some(id)
            }
            Change::Unchanged => None,
        }
    }

    /// Whether the displayed list must be redrawn.
    pub fn is_refresh(&self) -> bool {
        self.change != Change::Unchanged || self.notice.is_some()
    }
}

/// Counts over the whole list, independent of the selected view.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub done: usize,
}

impl Summary {
    pub fn active(&self) -> usize {
        self.total.saturating_sub(self.done)
    }
}

/// The to-do list of one session: a [`TaskStore`] plus the operations the UI
/// invokes on it.
///
/// Every operation runs to completion synchronously. Only [`TodoList::add`] and
/// [`TodoList::update_text`] can fail, and they fail before touching the store.
#[derive(Debug, Default, Clone)]
pub struct TodoList {
    store: TaskStore,
}

impl TodoList {
    pub fn new() -> Self {
        Self {
            store: TaskStore::new(),
        }
    }

    /// Adds a task with the trimmed `text`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyText`] when `text` is blank; the list is
    /// left unchanged.
    #[tracing::instrument(skip(self))]
    pub fn add(&mut self, text: &str) -> Result<Outcome, ValidationError> {
        let task = Task::new(text)?;
        let id = task.id().clone();
        if !self.store.append(task) {
            tracing::warn!(task_id = %id, "generated task id already present");
        }
        tracing::debug!(task_id = %id, "task added");
        Ok(Outcome::new(Change::Added(id), Some(Notice::TASK_ADDED)))
    }

    /// Deletes the task with `id`. Deleting an unknown id is not an error.
    #[tracing::instrument(skip(self))]
    pub fn delete(&mut self, id: &TaskId) -> Outcome {
        let change = if self.store.remove(id) {
            tracing::debug!(task_id = %id, "task deleted");
            Change::Removed(id.clone())
        } else {
            Change::Unchanged
        };
        Outcome::new(change, Some(Notice::TASK_DELETED))
    }

    /// Replaces the text of the task with `id`.
    ///
    /// Blank text is rejected before the lookup, so the error is reported even
    /// for an unknown id. An unknown id with valid text is a silent no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyText`] when `new_text` is blank.
    #[tracing::instrument(skip(self))]
    pub fn update_text(&mut self, id: &TaskId, new_text: &str) -> Result<Outcome, ValidationError> {
        let text = normalize_text(new_text)?;
        let Some(task) = self.store.find_mut(id) else {
            return Ok(Outcome::new(Change::Unchanged, None));
        };
        task.set_text(&text)?;
        tracing::debug!(task_id = %id, "task text updated");
        Ok(Outcome::new(Change::Updated(id.clone()), Some(Notice::TASK_UPDATED)))
    }

    /// Sets the completion flag of the task with `id`. Never notifies.
    #[tracing::instrument(skip(self))]
    pub fn toggle_done(&mut self, id: &TaskId, value: bool) -> Outcome {
        match self.store.find_mut(id) {
            Some(task) => {
                task.set_done(value);
                Outcome::new(Change::Toggled(id.clone()), None)
            }
            None => Outcome::new(Change::Unchanged, None),
        }
    }

    /// Tasks visible under `view`, in insertion order.
    pub fn filter(&self, view: View) -> Vec<&Task> {
        self.store
            .all()
            .iter()
            .filter(|task| view.matches(task))
            .collect()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.store.find(id)
    }

    pub fn summary(&self) -> Summary {
        let tasks = self.store.all();
        Summary {
            total: tasks.len(),
            done: tasks.iter().filter(|task| task.is_done()).count(),
        }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
