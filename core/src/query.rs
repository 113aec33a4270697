//! The list pipeline: filter, search, sort, paginate.
//!
//! # Design
//! Stages run in a fixed order, each narrowing the output of the previous
//! one: completion, priority, category, search, then a newest-first sort and
//! finally the page slice. Filters that are absent (or empty, for the string
//! filters) are skipped. A priority filter that is not one of the known
//! values is skipped as well instead of being reported as an error.
//!
//! Records with equal `created_at` are ordered by reverse insertion, so the
//! record inserted last comes first and repeated queries always agree.

use serde::Serialize;

use crate::types::{Priority, Todo};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 100;

/// Filters and paging requested by a caller. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoQuery {
    pub completed: Option<bool>,
    /// Raw priority filter; ignored unless it names a known priority.
    pub priority: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub items: Vec<Todo>,
    pub count: usize,
    pub total_count: usize,
    pub page: usize,
    pub total_pages: usize,
}

impl TodoQuery {
    /// `max(1, page)`, defaulting to 1.
    pub fn page_number(&self) -> usize {
        let page = self.page.unwrap_or(DEFAULT_PAGE).max(1);
        usize::try_from(page).unwrap_or(usize::MAX)
    }

    /// `clamp(limit, 1, 100)`, defaulting to 100.
    pub fn page_size(&self) -> usize {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        // clamped to 1..=100 above
        limit as usize
    }

    /// Run the pipeline over `todos`, which must be in insertion order.
    pub fn run(&self, todos: &[Todo]) -> Page {
        let mut matched: Vec<&Todo> = todos.iter().rev().collect();

        if let Some(completed) = self.completed {
            matched.retain(|todo| todo.completed == completed);
            tracing::debug!(completed, count = matched.len(), "filtered by completion");
        }

        if let Some(priority) = self.priority_filter() {
            matched.retain(|todo| todo.priority == priority);
            tracing::debug!(%priority, count = matched.len(), "filtered by priority");
        }

        if let Some(category) = non_empty(&self.category) {
            let category = category.to_lowercase();
            matched.retain(|todo| todo.category.to_lowercase() == category);
            tracing::debug!(%category, count = matched.len(), "filtered by category");
        }

        if let Some(search) = non_empty(&self.search) {
            let term = search.trim().to_lowercase();
            matched.retain(|todo| {
                todo.title.to_lowercase().contains(&term)
                    || todo.description.to_lowercase().contains(&term)
            });
            tracing::debug!(%term, count = matched.len(), "filtered by search");
        }

        // Stable sort: ties keep the reversed insertion order built above.
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let page = self.page_number();
        let limit = self.page_size();
        let total_count = matched.len();
        let start = (page - 1).saturating_mul(limit);
        let items: Vec<Todo> = matched
            .into_iter()
            .skip(start)
            .take(limit)
            .cloned()
            .collect();

        Page {
            count: items.len(),
            items,
            total_count,
            page,
            total_pages: total_count.div_ceil(limit),
        }
    }

    fn priority_filter(&self) -> Option<Priority> {
        self.priority.as_deref()?.parse().ok()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
