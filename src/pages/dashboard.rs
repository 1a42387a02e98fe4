use chrono::{DateTime, Utc};

use finish_it::core::view::Dashboard;

use crate::components::task_row::task_row;

pub fn dashboard_view(dash: &Dashboard<'_>, now: DateTime<Utc>) -> String {
    let stats = &dash.stats;
    let mut out = vec![
        format!(
            "Tasks: {} total, {} completed, {} in progress, {} to do",
            stats.total, stats.completed, stats.in_progress, stats.todo
        ),
        format!("Progress: {}% complete", stats.completion_percentage),
        format!("Productivity score: {}", stats.productivity_score),
        String::new(),
        "Recent tasks".to_string(),
    ];

    if dash.recent.is_empty() {
        out.push("  No tasks yet. Create your first task to get started!".to_string());
    } else {
        out.extend(dash.recent.iter().map(|t| format!("  {}", task_row(t, now))));
    }

    out.push(String::new());
    out.push("Upcoming deadlines".to_string());
    if dash.upcoming.is_empty() {
        out.push("  No upcoming deadlines.".to_string());
    } else {
        out.extend(dash.upcoming.iter().map(|t| format!("  {}", task_row(t, now))));
    }

    out.join("\n")
}
