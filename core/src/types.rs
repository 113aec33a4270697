//! Domain types for the todo store.
//!
//! # Design
//! `Todo` is the only entity. Timestamps are held as `DateTime<Utc>` truncated
//! to milliseconds and serialized as ISO-8601 with a `Z` suffix, so the value
//! in memory is exactly the value on the wire. `Priority` is a closed enum;
//! a record can never carry any other priority.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

pub const DEFAULT_CATEGORY: &str = "general";

/// Importance of a todo item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of `low`, `medium`, `high`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority `{0}`")]
pub struct UnknownPriority(pub String);

impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(UnknownPriority(other.to_string())),
        }
    }
}

/// A single todo item as stored and as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    pub category: String,
    #[serde(serialize_with = "iso8601_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "iso8601_millis")]
    pub updated_at: DateTime<Utc>,
}

fn iso8601_millis<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Validated input for creating a todo.
///
/// Built from the fixed default record (`with_title`) overlaid with whatever
/// optional fields the caller supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
}

impl NewTodo {
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
            category: DEFAULT_CATEGORY.to_string(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// Validated partial update. Only the fields that are `Some` are applied;
/// `id` and `created_at` are not representable here and so can never change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        *self == TodoPatch::default()
    }

    /// Overlay the present fields onto `todo`, returning the new value.
    pub fn apply_to(self, todo: &Todo) -> Todo {
        Todo {
            id: todo.id,
            title: self.title.unwrap_or_else(|| todo.title.clone()),
            description: self.description.unwrap_or_else(|| todo.description.clone()),
            completed: self.completed.unwrap_or(todo.completed),
            priority: self.priority.unwrap_or(todo.priority),
            category: self.category.unwrap_or_else(|| todo.category.clone()),
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        }
    }
}

/// Aggregate counts over the whole collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub completion_rate: u32,
    pub priority_breakdown: PriorityBreakdown,
    pub category_breakdown: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}
