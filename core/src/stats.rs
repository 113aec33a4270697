//! Aggregate statistics over the whole collection.

use std::collections::BTreeMap;

use crate::types::{Priority, PriorityBreakdown, Statistics, Todo};

pub fn compute(todos: &[Todo]) -> Statistics {
    let total = todos.len();
    let completed = todos.iter().filter(|t| t.completed).count();

    let mut priority_breakdown = PriorityBreakdown::default();
    let mut category_breakdown = BTreeMap::new();
    for todo in todos {
        match todo.priority {
            Priority::High => priority_breakdown.high += 1,
            Priority::Medium => priority_breakdown.medium += 1,
            Priority::Low => priority_breakdown.low += 1,
        }
        *category_breakdown.entry(todo.category.clone()).or_insert(0) += 1;
    }

    Statistics {
        total,
        completed,
        pending: total - completed,
        completion_rate: completion_rate(completed, total),
        priority_breakdown,
        category_breakdown,
    }
}

/// Percentage of completed records, rounded half up; 0 for an empty collection.
fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round() as u32
}
