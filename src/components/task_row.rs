use chrono::{DateTime, Utc};

use finish_it::core::task::{Task, TaskStatus};
use finish_it::core::view::{Urgency, urgency};

fn checkbox(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "[ ]",
        TaskStatus::InProgress => "[~]",
        TaskStatus::Completed => "[x]",
    }
}

/// One line per task: state box, id, title, priority badge, status and deadline.
pub fn task_row(task: &Task, now: DateTime<Utc>) -> String {
    let mut line = format!(
        "{} #{:<4} {}  [{}] {}",
        checkbox(task.status),
        task.id,
        task.title,
        task.priority.badge(),
        task.status.label(),
    );

    if let Some(due) = task.due_date {
        line.push_str(&format!("  due {}", due.format("%Y-%m-%d")));
        if due <= now {
            if !task.status.is_done() {
                line.push_str(" (overdue)");
            }
        } else if let Some(level) = urgency(task, now) {
            if level != Urgency::Later {
                line.push_str(&format!(" ({})", level.label()));
            }
        }
    }

    line
}

/// Description lines, indented under the row.
pub fn task_details(task: &Task) -> Option<String> {
    let description = task.description.as_deref()?.trim();
    if description.is_empty() {
        return None;
    }
    Some(
        description
            .lines()
            .map(|l| format!("        {}", l))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use finish_it::core::task::Priority;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn plain_row() {
        let mut task = Task::new("12", "Water plants");
        task.priority = Priority::Low;
        assert_eq!(task_row(&task, now()), "[ ] #12   Water plants  [LOW] To Do");
    }

    #[test]
    fn urgent_deadline_is_flagged() {
        let mut task = Task::new("3", "File taxes");
        task.status = TaskStatus::InProgress;
        task.due_date = Some(Utc.with_ymd_and_hms(2026, 5, 11, 9, 0, 0).unwrap());
        assert_eq!(
            task_row(&task, now()),
            "[~] #3    File taxes  [MEDIUM] In Progress  due 2026-05-11 (urgent)"
        );
    }

    #[test]
    fn overdue_only_for_open_tasks() {
        let mut task = Task::new("4", "Renew passport");
        task.due_date = Some(Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap());
        assert!(task_row(&task, now()).ends_with("(overdue)"));

        task.status = TaskStatus::Completed;
        assert!(task_row(&task, now()).ends_with("due 2026-05-01"));
    }

    #[test]
    fn details_skip_blank_description() {
        let mut task = Task::new("1", "x");
        assert_eq!(task_details(&task), None);
        task.description = Some("  ".into());
        assert_eq!(task_details(&task), None);
        task.description = Some("first\nsecond".into());
        assert_eq!(
            task_details(&task).unwrap(),
            "        first\n        second"
        );
    }
}
