use serde::Deserialize;
use todo_list::{Summary, Task, TodoList, View};

pub mod api;
pub mod web;

pub use web::create_task_router;

/// Query parameters carrying the view the client is currently showing.
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub view: View,
}

/// One entry of the view selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOption {
    pub value: View,
    pub label: &'static str,
    pub selected: bool,
}

/// Snapshot of a session's list as seen through one view.
///
/// Built while the session lock is held so the rows and the counts always
/// describe the same state.
#[derive(Debug, Clone)]
pub struct TaskPanel {
    pub view: View,
    pub tasks: Vec<Task>,
    pub summary: Summary,
    pub views: Vec<ViewOption>,
}

impl TaskPanel {
    pub fn new(list: &TodoList, view: View) -> Self {
        Self {
            view,
            tasks: list.filter(view).into_iter().cloned().collect(),
            summary: list.summary(),
            views: View::ALL
                .iter()
                .map(|&option| ViewOption {
                    value: option,
                    label: option.label(),
                    selected: option == view,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_build_panel_for_selected_view() {
        let mut list = TodoList::new();
        list.add("Buy milk").unwrap();
        list.add("Walk dog").unwrap();
        let milk = list.filter(View::All)[0].id().clone();
        list.toggle_done(&milk, true);

        let panel = TaskPanel::new(&list, View::Active);

        assert_eq!(panel.tasks.len(), 1);
        assert_eq!(panel.tasks[0].text(), "Walk dog");
        assert_eq!(panel.summary, Summary { total: 2, done: 1 });
        let selected: Vec<View> = panel
            .views
            .iter()
            .filter(|option| option.selected)
            .map(|option| option.value)
            .collect();
        assert_eq!(selected, vec![View::Active]);
    }
}
