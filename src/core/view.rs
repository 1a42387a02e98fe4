use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};

use super::task::{Priority, Task, TaskStatus};

/// Either every value, or only tasks whose field equals the given one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Filter<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == value,
        }
    }
}

impl<T: FromStr<Err = String>> FromStr for Filter<T> {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

pub type StatusFilter = Filter<TaskStatus>;
pub type PriorityFilter = Filter<Priority>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    CreatedDesc,
    CreatedAsc,
    TitleAsc,
    TitleDesc,
    Priority,
    Status,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedDesc => "created_desc",
            Self::CreatedAsc => "created_asc",
            Self::TitleAsc => "title_asc",
            Self::TitleDesc => "title_desc",
            Self::Priority => "priority",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_desc" => Ok(Self::CreatedDesc),
            "created_asc" => Ok(Self::CreatedAsc),
            "title_asc" => Ok(Self::TitleAsc),
            "title_desc" => Ok(Self::TitleDesc),
            "priority" => Ok(Self::Priority),
            "status" => Ok(Self::Status),
            _ => Err(format!(
                "unknown sort key '{}' (expected created_desc, created_asc, title_asc, title_desc, priority or status)",
                s
            )),
        }
    }
}

/// Search, filter and sort selections for the task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewParameters {
    pub search_query: String,
    pub status: StatusFilter,
    pub priority: PriorityFilter,
    pub sort: SortKey,
}

impl ViewParameters {
    /// Back to no search, no filters, newest first.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_filtered(&self) -> bool {
        !self.search_query.trim().is_empty()
            || self.status != Filter::All
            || self.priority != Filter::All
    }
}

/// Aggregate counters shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DerivedStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub todo: usize,
    pub completion_percentage: u32,
    pub productivity_score: u32,
}

pub fn compute_stats(tasks: &[Task]) -> DerivedStats {
    let mut stats = DerivedStats {
        total: tasks.len(),
        ..DerivedStats::default()
    };
    for task in tasks {
        match task.status {
            TaskStatus::Completed => stats.completed += 1,
            TaskStatus::InProgress => stats.in_progress += 1,
            TaskStatus::Todo => stats.todo += 1,
        }
    }
    if stats.total > 0 {
        stats.completion_percentage =
            (100.0 * stats.completed as f64 / stats.total as f64).round() as u32;
    }
    stats.productivity_score = productivity_score(tasks);
    stats
}

/// Completion rate plus a bonus of 5 points per completed high-priority task
/// (at most 20), clamped to 0..=100.
pub fn productivity_score(tasks: &[Task]) -> u32 {
    if tasks.is_empty() {
        return 0;
    }
    let completed = tasks.iter().filter(|t| t.status.is_done()).count();
    let high_done = tasks
        .iter()
        .filter(|t| t.status.is_done() && t.priority == Priority::High)
        .count();

    let base = 100.0 * completed as f64 / tasks.len() as f64;
    let bonus = (high_done * 5).min(20) as f64;
    (base + bonus).round().clamp(0.0, 100.0) as u32
}

/// Apply text, status and priority filters, then sort. Ties keep their
/// original relative order.
pub fn filter_and_sort<'a>(tasks: &'a [Task], params: &ViewParameters) -> Vec<&'a Task> {
    let needle = params.search_query.to_lowercase();
    let search = !params.search_query.trim().is_empty();

    let mut view: Vec<&Task> = tasks
        .iter()
        .filter(|t| !search || t.matches_text(&needle))
        .filter(|t| params.status.matches(&t.status))
        .filter(|t| params.priority.matches(&t.priority))
        .collect();

    match params.sort {
        SortKey::CreatedDesc => view.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::CreatedAsc => view.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortKey::TitleAsc => view.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortKey::TitleDesc => view.sort_by(|a, b| compare_titles(&b.title, &a.title)),
        SortKey::Priority => view.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank())),
        SortKey::Status => view.sort_by(|a, b| b.status.rank().cmp(&a.status.rank())),
    }
    view
}

/// Case-insensitive first; on a case-only difference lowercase sorts first.
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

const DAY_MS: i64 = 86_400_000;

/// How close a deadline is, in whole days rounded up from `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    /// Due within a day, or already past.
    Urgent,
    /// Due within three days.
    DueSoon,
    Later,
}

impl Urgency {
    pub fn for_due(due: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let days_until = days_until(due, now);
        if days_until <= 1 {
            Self::Urgent
        } else if days_until <= 3 {
            Self::DueSoon
        } else {
            Self::Later
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::DueSoon => "due soon",
            Self::Later => "upcoming",
        }
    }
}

// ceil((due - now) / 1 day); `/` truncates toward zero so only positive remainders round up.
fn days_until(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = due.signed_duration_since(now).num_milliseconds();
    ms / DAY_MS + i64::from(ms % DAY_MS > 0)
}

pub fn urgency(task: &Task, now: DateTime<Utc>) -> Option<Urgency> {
    task.due_date.map(|due| Urgency::for_due(due, now))
}

/// Tasks due after `now` and within `window_days`, soonest first.
/// A window past the representable range has no upper bound.
pub fn upcoming_deadlines(
    tasks: &[Task],
    now: DateTime<Utc>,
    window_days: i64,
    max_count: usize,
) -> Vec<&Task> {
    let horizon = TimeDelta::try_days(window_days.max(0))
        .and_then(|window| now.checked_add_signed(window))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let mut upcoming: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.due_date.is_some_and(|due| due > now && due <= horizon))
        .collect();
    upcoming.sort_by_key(|t| t.due_date);
    upcoming.truncate(max_count);
    upcoming
}

/// Newest tasks first.
pub fn recent_tasks(tasks: &[Task], max_count: usize) -> Vec<&Task> {
    let mut recent: Vec<&Task> = tasks.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(max_count);
    recent
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLimits {
    pub recent: usize,
    pub upcoming: usize,
    pub window_days: i64,
}

impl Default for DashboardLimits {
    fn default() -> Self {
        Self {
            recent: 5,
            upcoming: 3,
            window_days: 7,
        }
    }
}

/// Everything the dashboard shows, derived from one task collection.
pub struct Dashboard<'a> {
    pub stats: DerivedStats,
    pub recent: Vec<&'a Task>,
    pub upcoming: Vec<&'a Task>,
}

impl<'a> Dashboard<'a> {
    pub fn build(tasks: &'a [Task], now: DateTime<Utc>, limits: DashboardLimits) -> Self {
        Self {
            stats: compute_stats(tasks),
            recent: recent_tasks(tasks, limits.recent),
            upcoming: upcoming_deadlines(tasks, now, limits.window_days, limits.upcoming),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, day, hour, 0, 0).unwrap()
    }

    fn make(id: &str, title: &str, status: TaskStatus, priority: Priority, day: u32) -> Task {
        let mut t = Task::new(id, title);
        t.status = status;
        t.priority = priority;
        t.created_at = at(day, 12);
        t
    }

    fn sample() -> Vec<Task> {
        vec![
            make("1", "Write report", TaskStatus::Todo, Priority::High, 1),
            make("2", "buy milk", TaskStatus::Completed, Priority::Low, 3),
            make("3", "Call plumber", TaskStatus::InProgress, Priority::Medium, 2),
            make("4", "Answer email", TaskStatus::Completed, Priority::High, 5),
            make("5", "Book flights", TaskStatus::Todo, Priority::Medium, 4),
        ]
    }

    fn ids(view: &[&Task]) -> Vec<String> {
        view.iter().map(|t| t.id.to_string()).collect()
    }

    #[test]
    fn stats_example() {
        let tasks = vec![
            make("a", "A", TaskStatus::Completed, Priority::High, 1),
            make("b", "B", TaskStatus::Todo, Priority::Low, 2),
        ];
        let stats = compute_stats(&tasks);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.in_progress, 0);
        assert_eq!(stats.todo, 1);
        assert_eq!(stats.completion_percentage, 50);
    }

    #[test]
    fn stats_empty_are_zero() {
        assert_eq!(compute_stats(&[]), DerivedStats::default());
        assert_eq!(productivity_score(&[]), 0);
    }

    #[test]
    fn stats_counts_sum_to_total() {
        let tasks = sample();
        let stats = compute_stats(&tasks);
        assert_eq!(stats.total, tasks.len());
        assert_eq!(stats.completed + stats.in_progress + stats.todo, stats.total);
        assert_eq!(stats.completion_percentage, 40);
    }

    #[test]
    fn completion_percentage_rounds() {
        let tasks = vec![
            make("1", "a", TaskStatus::Completed, Priority::Low, 1),
            make("2", "b", TaskStatus::Completed, Priority::Low, 1),
            make("3", "c", TaskStatus::Todo, Priority::Low, 1),
        ];
        assert_eq!(compute_stats(&tasks).completion_percentage, 67);
    }

    #[test]
    fn productivity_bonus_is_capped() {
        // 40% base + one high-priority completion
        assert_eq!(productivity_score(&sample()), 45);

        let mut tasks: Vec<Task> = (0..5)
            .map(|i| make(&i.to_string(), "x", TaskStatus::Completed, Priority::High, 1))
            .collect();
        tasks.extend((5..10).map(|i| make(&i.to_string(), "y", TaskStatus::Todo, Priority::Low, 1)));
        // 50% base + min(25, 20)
        assert_eq!(productivity_score(&tasks), 70);
    }

    #[test]
    fn productivity_clamps_at_100() {
        let tasks = vec![make("1", "x", TaskStatus::Completed, Priority::High, 1)];
        assert_eq!(productivity_score(&tasks), 100);
    }

    #[test]
    fn search_matches_case_insensitively() {
        let tasks = vec![
            make("1", "Foobar", TaskStatus::Todo, Priority::Medium, 1),
            make("2", "baz", TaskStatus::Todo, Priority::Medium, 2),
        ];
        let params = ViewParameters {
            search_query: "foo".into(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_and_sort(&tasks, &params)), vec!["1"]);
    }

    #[test]
    fn blank_search_keeps_everything() {
        let tasks = sample();
        let params = ViewParameters {
            search_query: "   ".into(),
            ..Default::default()
        };
        assert_eq!(filter_and_sort(&tasks, &params).len(), tasks.len());
    }

    #[test]
    fn filters_combine() {
        let tasks = sample();
        let params = ViewParameters {
            status: Filter::Only(TaskStatus::Completed),
            priority: Filter::Only(Priority::High),
            ..Default::default()
        };
        let view = filter_and_sort(&tasks, &params);
        assert_eq!(ids(&view), vec!["4"]);
        assert!(view
            .iter()
            .all(|t| t.status == TaskStatus::Completed && t.priority == Priority::High));
    }

    #[test]
    fn default_sort_is_newest_first() {
        let tasks = sample();
        let view = filter_and_sort(&tasks, &ViewParameters::default());
        assert_eq!(ids(&view), vec!["4", "5", "2", "3", "1"]);

        let params = ViewParameters {
            sort: SortKey::CreatedAsc,
            ..Default::default()
        };
        assert_eq!(ids(&filter_and_sort(&tasks, &params)), vec!["1", "3", "2", "5", "4"]);
    }

    #[test]
    fn title_sorts_reverse_each_other() {
        let tasks = sample();
        let asc = ViewParameters {
            sort: SortKey::TitleAsc,
            ..Default::default()
        };
        let desc = ViewParameters {
            sort: SortKey::TitleDesc,
            ..Default::default()
        };
        let up = ids(&filter_and_sort(&tasks, &asc));
        let mut down = ids(&filter_and_sort(&tasks, &desc));
        assert_eq!(up, vec!["4", "5", "2", "3", "1"]);
        down.reverse();
        assert_eq!(up, down);
    }

    #[test]
    fn priority_sort_is_stable() {
        let tasks = sample();
        let params = ViewParameters {
            sort: SortKey::Priority,
            ..Default::default()
        };
        // created_desc is not applied first: ties keep input order
        assert_eq!(ids(&filter_and_sort(&tasks, &params)), vec!["1", "4", "3", "5", "2"]);
    }

    #[test]
    fn status_sort_puts_open_work_first() {
        let tasks = sample();
        let params = ViewParameters {
            sort: SortKey::Status,
            ..Default::default()
        };
        assert_eq!(ids(&filter_and_sort(&tasks, &params)), vec!["1", "5", "3", "2", "4"]);
    }

    #[test]
    fn filter_and_sort_is_idempotent() {
        let tasks = sample();
        let params = ViewParameters {
            search_query: "o".into(),
            sort: SortKey::Priority,
            ..Default::default()
        };
        assert_eq!(
            ids(&filter_and_sort(&tasks, &params)),
            ids(&filter_and_sort(&tasks, &params))
        );
    }

    #[test]
    fn empty_collection_yields_empty_view() {
        assert!(filter_and_sort(&[], &ViewParameters::default()).is_empty());
        assert!(recent_tasks(&[], 5).is_empty());
        assert!(upcoming_deadlines(&[], at(1, 0), 7, 3).is_empty());
    }

    #[test]
    fn parse_view_selections() {
        assert_eq!("all".parse::<StatusFilter>(), Ok(Filter::All));
        assert_eq!(
            "in_progress".parse::<StatusFilter>(),
            Ok(Filter::Only(TaskStatus::InProgress))
        );
        assert_eq!("high".parse::<PriorityFilter>(), Ok(Filter::Only(Priority::High)));
        assert!("urgent".parse::<PriorityFilter>().is_err());
        assert_eq!("title_desc".parse::<SortKey>(), Ok(SortKey::TitleDesc));
        assert!("newest".parse::<SortKey>().is_err());
    }

    #[test]
    fn reset_clears_selections() {
        let mut params = ViewParameters {
            search_query: "x".into(),
            status: Filter::Only(TaskStatus::Todo),
            priority: Filter::Only(Priority::Low),
            sort: SortKey::Status,
        };
        assert!(params.is_filtered());
        params.reset();
        assert_eq!(params, ViewParameters::default());
        assert!(!params.is_filtered());
    }

    #[test]
    fn upcoming_excludes_past_missing_and_far() {
        let now = at(10, 12);
        let mut tasks = sample();
        tasks[0].due_date = Some(at(12, 9));
        tasks[1].due_date = Some(at(9, 9)); // past
        tasks[2].due_date = Some(at(11, 8));
        tasks[3].due_date = Some(at(30, 9)); // beyond a week
        // tasks[4] has no deadline

        let upcoming = upcoming_deadlines(&tasks, now, 7, 3);
        assert_eq!(ids(&upcoming), vec!["3", "1"]);
        assert!(upcoming.iter().all(|t| t.due_date.is_some_and(|d| d > now)));

        assert_eq!(ids(&upcoming_deadlines(&tasks, now, 7, 1)), vec!["3"]);
    }

    #[test]
    fn huge_window_has_no_upper_bound() {
        let now = at(10, 12);
        let mut tasks = sample();
        tasks[0].due_date = Some(Utc.with_ymd_and_hms(9999, 12, 31, 0, 0, 0).unwrap());
        tasks[2].due_date = Some(at(11, 8));

        assert_eq!(ids(&upcoming_deadlines(&tasks, now, i64::MAX, 3)), vec!["3", "1"]);
        assert_eq!(ids(&upcoming_deadlines(&tasks, now, 100_000_000, 3)), vec!["3", "1"]);
        // negative windows collapse to nothing
        assert!(upcoming_deadlines(&tasks, now, i64::MIN, 3).is_empty());
    }

    #[test]
    fn urgency_thresholds() {
        let now = at(10, 0);
        assert_eq!(Urgency::for_due(at(10, 23), now), Urgency::Urgent);
        assert_eq!(Urgency::for_due(at(11, 0), now), Urgency::Urgent);
        assert_eq!(Urgency::for_due(at(11, 1), now), Urgency::DueSoon);
        assert_eq!(Urgency::for_due(at(13, 0), now), Urgency::DueSoon);
        assert_eq!(Urgency::for_due(at(13, 1), now), Urgency::Later);
        assert_eq!(Urgency::for_due(at(9, 1), now), Urgency::Urgent);

        let task = make("1", "x", TaskStatus::Todo, Priority::Low, 1);
        assert_eq!(urgency(&task, at(10, 0)), None);
    }

    #[test]
    fn urgency_counts_from_the_current_instant() {
        let now = Utc.with_ymd_and_hms(2026, 5, 10, 1, 0, 0).unwrap();
        let due = Utc.with_ymd_and_hms(2026, 5, 11, 23, 0, 0).unwrap();
        // 46 hours away, two calendar days later
        assert_eq!(Urgency::for_due(due, now), Urgency::DueSoon);
    }

    #[test]
    fn dashboard_bundles_views() {
        let mut tasks = sample();
        tasks[4].due_date = Some(at(12, 0));
        let dash = Dashboard::build(&tasks, at(10, 0), DashboardLimits::default());
        assert_eq!(dash.stats.total, 5);
        assert_eq!(dash.stats.productivity_score, 45);
        assert_eq!(ids(&dash.recent), vec!["4", "5", "2", "3", "1"]);
        assert_eq!(ids(&dash.upcoming), vec!["5"]);
    }

    #[test]
    fn recent_takes_newest() {
        let tasks = sample();
        assert_eq!(ids(&recent_tasks(&tasks, 2)), vec!["4", "5"]);
        // input is untouched
        assert_eq!(tasks[0].id.as_str(), "1");
    }
}
