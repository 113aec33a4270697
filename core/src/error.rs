//! Error types for the todo store and its validation contract.
//!
//! # Design
//! `NotFound` is the only way a store operation can fail; bad input never
//! reaches the store because validation runs first. Validation errors are
//! collected per field rather than short-circuited, so `ValidationErrors`
//! carries the whole list and its `Display` joins every message.

use serde::Serialize;
use uuid::Uuid;

/// Errors returned by `TodoStore` operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No live record has this id.
    #[error("todo {0} not found")]
    NotFound(Uuid),
}

/// One rejected field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every field-level failure found while validating one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_messages(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.message.as_str())
    }

    /// `Ok(value)` when nothing was collected, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(". ")
}

/// An id path parameter that is empty or only whitespace.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("ID is required")]
pub struct InvalidId;
