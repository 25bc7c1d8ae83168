use crate::task::{Task, TaskId};

/// Ordered, in-memory collection of tasks owned by a single session.
///
/// Insertion order is preserved and removing a task never reorders the rest.
#[derive(Debug, Default, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self { tasks: vec![] }
    }

    /// Appends a task at the end of the store.
    ///
    /// Returns `false` and leaves the store unchanged when a task with the same
    /// id is already present.
    pub fn append(&mut self, task: Task) -> bool {
        if self.find(task.id()).is_some() {
            return false;
        }
        self.tasks.push(task);
        true
    }

    /// Removes the task with `id`. Returns `false` when no such task exists.
    pub fn remove(&mut self, id: &TaskId) -> bool {
        match self.tasks.iter().position(|task| task.id() == id) {
            Some(index) => {
                self.tasks.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    pub fn find_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id() == id)
    }

    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
