use chrono::{DateTime, Utc};

use finish_it::core::task::Task;
use finish_it::core::view::ViewParameters;

use crate::components::task_row::{task_details, task_row};

pub fn task_list_view(
    total: usize,
    view: &[&Task],
    params: &ViewParameters,
    now: DateTime<Utc>,
) -> String {
    if view.is_empty() {
        return if total == 0 {
            "No tasks found. Create your first task to get started!".to_string()
        } else {
            "No tasks found. Try adjusting your filters or search query.".to_string()
        };
    }

    let mut out = Vec::with_capacity(view.len() + 1);
    for task in view {
        out.push(task_row(task, now));
        if let Some(details) = task_details(task) {
            out.push(details);
        }
    }

    if params.is_filtered() {
        out.push(format!("Showing {} of {} tasks", view.len(), total));
    } else {
        out.push(format!("{} tasks", total));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use finish_it::core::view::filter_and_sort;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn empty_messages_depend_on_collection() {
        let params = ViewParameters::default();
        assert!(task_list_view(0, &[], &params, now()).contains("first task"));
        assert!(task_list_view(3, &[], &params, now()).contains("adjusting your filters"));
    }

    #[test]
    fn filtered_footer_counts() {
        let tasks = vec![Task::new("1", "Foobar"), Task::new("2", "baz")];
        let params = ViewParameters {
            search_query: "foo".into(),
            ..Default::default()
        };
        let view = filter_and_sort(&tasks, &params);
        let out = task_list_view(tasks.len(), &view, &params, now());
        assert!(out.contains("Foobar"));
        assert!(!out.contains("baz"));
        assert!(out.ends_with("Showing 1 of 2 tasks"));
    }
}
