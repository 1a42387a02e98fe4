use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// Backend-assigned task identifier. Sent as either a JSON string or number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Self(s)),
            Value::Number(n) => Ok(Self(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "task id must be a string or number, got {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::Todo, Self::InProgress, Self::Completed];

    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(Self::Todo),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    /// Rank used by the status sort: open work first.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Todo => 3,
            Self::InProgress => 2,
            Self::Completed => 1,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire(s).ok_or_else(|| {
            format!("unknown status '{}' (expected todo, in_progress or completed)", s)
        })
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Value>::deserialize(deserializer)?;
        let status = raw
            .as_ref()
            .and_then(Value::as_str)
            .and_then(Self::from_wire)
            .unwrap_or_default();
        Ok(status)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.badge())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire(s)
            .ok_or_else(|| format!("unknown priority '{}' (expected low, medium or high)", s))
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Value>::deserialize(deserializer)?;
        let priority = raw
            .as_ref()
            .and_then(Value::as_str)
            .and_then(Self::from_wire)
            .unwrap_or_default();
        Ok(priority)
    }
}

/// A task as returned by `GET /api/tasks`.
///
/// Fields the client does not model are kept in `extra` so a full-task `PUT`
/// sends them back unchanged. Timestamps the client could not read, or had
/// to default, are sent back exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TaskWire", into = "TaskWire")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    /// The Unix epoch when the backend sent no readable value.
    pub created_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub extra: Map<String, Value>,
    received: ReceivedTimestamps,
}

/// `created_at` and `due_date` as they arrived. `None` means the key was absent.
#[derive(Debug, Clone, Default, PartialEq)]
struct ReceivedTimestamps {
    created_at: Option<Value>,
    due_date: Option<Value>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            created_at: Utc::now(),
            due_date: None,
            extra: Map::new(),
            received: ReceivedTimestamps::default(),
        }
    }

    /// Full-task payload for a status change.
    pub fn with_status(&self, status: TaskStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Case-insensitive substring match against title and description.
    /// `needle` must already be lowercase.
    pub fn matches_text(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }
}

/// Payload for `POST /api/tasks`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::Medium,
            status: Some(TaskStatus::Todo),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        validate_title(&self.title)
    }
}

pub(crate) fn validate_title(title: &str) -> Result<(), Error> {
    if title.trim().is_empty() {
        return Err(Error::Validation("Task title cannot be empty".into()));
    }
    Ok(())
}

/// Parse the timestamp shapes the backend is known to emit.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[derive(Serialize, Deserialize)]
struct TaskWire {
    id: TaskId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: TaskStatus,
    #[serde(default)]
    priority: Priority,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    created_at: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    due_date: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

// Keeps an explicit `null` distinct from a missing key.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

fn timestamp_from_value(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::String(s) => parse_timestamp(s),
        // Milliseconds since the epoch.
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

fn timestamp_to_value(value: Option<DateTime<Utc>>) -> Value {
    value.map_or(Value::Null, |dt| {
        Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    })
}

impl From<TaskWire> for Task {
    fn from(wire: TaskWire) -> Self {
        Self {
            id: wire.id,
            title: wire.title,
            description: wire.description,
            status: wire.status,
            priority: wire.priority,
            created_at: timestamp_from_value(wire.created_at.as_ref())
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            due_date: timestamp_from_value(wire.due_date.as_ref()),
            extra: wire.extra,
            received: ReceivedTimestamps {
                created_at: wire.created_at,
                due_date: wire.due_date,
            },
        }
    }
}

impl From<Task> for TaskWire {
    fn from(task: Task) -> Self {
        let ReceivedTimestamps { created_at, due_date } = task.received;

        let received_created = timestamp_from_value(created_at.as_ref())
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        let created_at = if task.created_at == received_created {
            created_at
        } else {
            Some(timestamp_to_value(Some(task.created_at)))
        };

        let due_date = if task.due_date == timestamp_from_value(due_date.as_ref()) {
            due_date
        } else {
            Some(timestamp_to_value(task.due_date))
        };

        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            created_at,
            due_date,
            extra: task.extra,
        }
    }
}
