use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a task.
///
/// Generated from a random UUID and rendered as 32 lowercase hex digits.
/// Callers must not assume any ordering or structure beyond equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a fresh, collision-resistant identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rejected task text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The text was empty or whitespace-only after trimming.
    #[error("task cannot be empty")]
    EmptyText,
}

/// Trims `text` and rejects it when nothing is left.
pub fn normalize_text(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyText);
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord")]
pub struct Task {
    id: TaskId,
    text: String,
    done: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

/// Unchecked wire form of a [`Task`]; text is normalized on conversion.
#[derive(Deserialize)]
struct TaskRecord {
    id: TaskId,
    text: String,
    done: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<TaskRecord> for Task {
    type Error = ValidationError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            text: normalize_text(&record.text)?,
            done: record.done,
            created_at: record.created_at,
        })
    }
}

impl Task {
    /// Creates an open task stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyText`] when `text` is blank.
    pub fn new(text: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: TaskId::generate(),
            text: normalize_text(text)?,
            done: false,
            created_at: chrono::Utc::now(),
        })
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Returns when the task was created. Informational only.
    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
    }

    /// Replaces the text, leaving the task untouched when `text` is blank.
    pub fn set_text(&mut self, text: &str) -> Result<(), ValidationError> {
        self.text = normalize_text(text)?;
        Ok(())
    }

    pub fn set_done(&mut self, done: bool) {
        self.done = done;
    }
}
