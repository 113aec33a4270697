//! Validation of incoming create/update payloads.
//!
//! Payload fields are kept as raw JSON so that an absent field, an explicit
//! `null`, and a value of the wrong type can each be told apart. Every field
//! is checked and all failures are reported together. Unknown keys are
//! ignored.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{InvalidId, ValidationErrors};
use crate::types::{NewTodo, Priority, TodoPatch};

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const CATEGORY_MAX_CHARS: usize = 50;

const PRIORITY_MESSAGE: &str = "Priority must be one of: low, medium, high";

/// Body of `POST /api/todos` before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTodoPayload {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub priority: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Value>,
}

/// Body of `PUT /api/todos/{id}` before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodoPayload {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub completed: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub priority: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Value>,
}

// A key that is present maps to `Some`, even when its value is `null`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

pub fn validate_create(payload: CreateTodoPayload) -> Result<NewTodo, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let title = match payload.title {
        None => {
            errors.push("title", "Title is required");
            None
        }
        Some(value) => check_title(value, "Title is required", &mut errors),
    };
    let description = payload
        .description
        .and_then(|value| check_description(value, &mut errors));
    let priority = payload.priority.and_then(|value| check_priority(value, &mut errors));
    let category = payload.category.and_then(|value| check_category(value, &mut errors));

    let Some(title) = title else {
        return Err(errors);
    };
    let mut input = NewTodo::with_title(title);
    if let Some(description) = description {
        input = input.description(description);
    }
    if let Some(priority) = priority {
        input = input.priority(priority);
    }
    if let Some(category) = category {
        input = input.category(category);
    }
    errors.into_result(input)
}

pub fn validate_update(payload: UpdateTodoPayload) -> Result<TodoPatch, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let patch = TodoPatch {
        title: payload
            .title
            .and_then(|value| check_title(value, "Title cannot be empty", &mut errors)),
        description: payload
            .description
            .and_then(|value| check_description(value, &mut errors)),
        completed: payload.completed.and_then(|value| match value {
            Value::Bool(b) => Some(b),
            _ => {
                errors.push("completed", "Completed must be a boolean value");
                None
            }
        }),
        priority: payload.priority.and_then(|value| check_priority(value, &mut errors)),
        category: payload.category.and_then(|value| check_category(value, &mut errors)),
    };
    errors.into_result(patch)
}

/// Reject an empty or whitespace-only id, returning it trimmed otherwise.
pub fn validate_id(raw: &str) -> Result<&str, InvalidId> {
    let id = raw.trim();
    if id.is_empty() {
        Err(InvalidId)
    } else {
        Ok(id)
    }
}

fn trimmed_string(
    value: Value,
    field: &'static str,
    label: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        _ => {
            errors.push(field, format!("{label} must be a string"));
            None
        }
    }
}

fn check_title(value: Value, empty_message: &str, errors: &mut ValidationErrors) -> Option<String> {
    let title = trimmed_string(value, "title", "Title", errors)?;
    if title.is_empty() {
        errors.push("title", empty_message);
        return None;
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        errors.push(
            "title",
            format!("Title must not exceed {TITLE_MAX_CHARS} characters"),
        );
        return None;
    }
    Some(title)
}

fn check_description(value: Value, errors: &mut ValidationErrors) -> Option<String> {
    let description = trimmed_string(value, "description", "Description", errors)?;
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        errors.push(
            "description",
            format!("Description must not exceed {DESCRIPTION_MAX_CHARS} characters"),
        );
        return None;
    }
    Some(description)
}

fn check_priority(value: Value, errors: &mut ValidationErrors) -> Option<Priority> {
    match value.as_str().map(str::parse::<Priority>) {
        Some(Ok(priority)) => Some(priority),
        _ => {
            errors.push("priority", PRIORITY_MESSAGE);
            None
        }
    }
}

fn check_category(value: Value, errors: &mut ValidationErrors) -> Option<String> {
    let category = trimmed_string(value, "category", "Category", errors)?;
    if category.chars().count() > CATEGORY_MAX_CHARS {
        errors.push(
            "category",
            format!("Category must not exceed {CATEGORY_MAX_CHARS} characters"),
        );
        return None;
    }
    Some(category)
}
