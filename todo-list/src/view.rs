use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::task::Task;

/// Display filter over a task list. Not stored; chosen per request.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum View {
    #[default]
    All,
    Active,
    Done,
}

impl View {
    /// Selector options in display order.
    pub const ALL: [View; 3] = [View::All, View::Active, View::Done];

    /// Returns whether `task` belongs in this view.
    pub fn matches(self, task: &Task) -> bool {
        match self {
            View::All => true,
            View::Active => !task.is_done(),
            View::Done => task.is_done(),
        }
    }

    /// Query-string form of the view.
    pub fn as_str(self) -> &'static str {
        match self {
            View::All => "all",
            View::Active => "active",
            View::Done => "done",
        }
    }

    /// Human-readable selector label.
    pub fn label(self) -> &'static str {
        match self {
            View::All => "All",
            View::Active => "Active",
            View::Done => "Done",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown view '{0}', expected one of: all, active, done")]
pub struct ParseViewError(String);

impl FromStr for View {
    type Err = ParseViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(View::All),
            "active" => Ok(View::Active),
            "done" => Ok(View::Done),
            _ => Err(ParseViewError(s.to_string())),
        }
    }
}

impl TryFrom<String> for View {
    type Error = ParseViewError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
