//! In-memory todo store.
//!
//! # Design
//! `TodoStore` exclusively owns the collection as a `Vec` in insertion order.
//! Mutators take `&mut self`, so a caller sharing the store across tasks
//! needs exactly one lock around the whole value. Every mutation replaces a
//! record as a single write. Timestamps come from an injected `Clock`, and a
//! refreshed `updated_at` never moves backwards even if the clock does.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::error::StoreError;
use crate::query::{Page, TodoQuery};
use crate::stats;
use crate::types::{NewTodo, Priority, Statistics, Todo, TodoPatch};

pub struct TodoStore {
    todos: Vec<Todo>,
    clock: Box<dyn Clock>,
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TodoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoStore")
            .field("todos", &self.todos.len())
            .finish_non_exhaustive()
    }
}

impl TodoStore {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            todos: Vec::new(),
            clock: Box::new(clock),
        }
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(3)
    }

    fn position(&self, id: Uuid) -> Result<usize, StoreError> {
        self.todos
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn fresh_id(&self) -> Uuid {
        loop {
            let id = Uuid::new_v4();
            if !self.todos.iter().any(|t| t.id == id) {
                return id;
            }
        }
    }

    pub fn create(&mut self, input: NewTodo) -> Todo {
        let now = self.now();
        let todo = Todo {
            id: self.fresh_id(),
            title: input.title,
            description: input.description,
            completed: false,
            priority: input.priority,
            category: input.category,
            created_at: now,
            updated_at: now,
        };
        self.todos.push(todo.clone());
        tracing::info!(id = %todo.id, title = %todo.title, "todo created");
        todo
    }

    pub fn get(&self, id: Uuid) -> Result<Todo, StoreError> {
        let index = self.position(id)?;
        Ok(self.todos[index].clone())
    }

    pub fn update(&mut self, id: Uuid, patch: TodoPatch) -> Result<Todo, StoreError> {
        let index = self.position(id)?;
        let now = self.now();
        let current = &self.todos[index];
        let mut updated = patch.apply_to(current);
        updated.updated_at = now.max(current.updated_at);
        self.todos[index] = updated.clone();
        tracing::info!(%id, title = %updated.title, "todo updated");
        Ok(updated)
    }

    pub fn delete(&mut self, id: Uuid) -> Result<Todo, StoreError> {
        let index = self.position(id)?;
        let removed = self.todos.remove(index);
        tracing::info!(%id, title = %removed.title, "todo deleted");
        Ok(removed)
    }

    pub fn toggle(&mut self, id: Uuid) -> Result<Todo, StoreError> {
        let index = self.position(id)?;
        let now = self.now();
        let todo = &mut self.todos[index];
        todo.completed = !todo.completed;
        todo.updated_at = now.max(todo.updated_at);
        tracing::info!(%id, completed = todo.completed, "todo toggled");
        Ok(todo.clone())
    }

    pub fn query(&self, query: &TodoQuery) -> Page {
        query.run(&self.todos)
    }

    pub fn stats(&self) -> Statistics {
        stats::compute(&self.todos)
    }

    /// Insert the two welcome records a fresh server starts with.
    pub fn seed_samples(&mut self) {
        let now = self.now();
        let samples = [
            (
                NewTodo::with_title("Sample Todo - Welcome!").description(
                    "This is a sample todo item to get you started. You can edit or delete this.",
                ),
                false,
                now,
            ),
            (
                NewTodo::with_title("Learn axum")
                    .description("Complete the axum tutorial and build a REST API")
                    .priority(Priority::High)
                    .category("learning"),
                true,
                now - Duration::days(1),
            ),
        ];
        for (input, completed, created_at) in samples {
            let id = self.fresh_id();
            self.todos.push(Todo {
                id,
                title: input.title,
                description: input.description,
                completed,
                priority: input.priority,
                category: input.category,
                created_at,
                updated_at: now,
            });
        }
        tracing::info!(count = self.todos.len(), "sample todos seeded");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn store_with_clock() -> (TodoStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        (TodoStore::with_clock(clock.clone()), clock)
    }

    #[test]
    fn create_assigns_defaults_and_timestamps() {
        let (mut store, _) = store_with_clock();
        let todo = store.create(NewTodo::with_title("Buy milk"));
        assert!(!todo.completed);
        assert_eq!(todo.priority, Priority::Medium);
        assert_eq!(todo.category, "general");
        assert_eq!(todo.created_at, start());
        assert_eq!(todo.updated_at, start());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_returns_created_record() {
        let mut store = TodoStore::new();
        let todo = store.create(NewTodo::with_title("a"));
        assert_eq!(store.get(todo.id).unwrap(), todo);
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let store = TodoStore::new();
        let id = Uuid::new_v4();
        assert_eq!(store.get(id), Err(StoreError::NotFound(id)));
    }

    #[test]
    fn update_preserves_identity_and_advances_updated_at() {
        let (mut store, clock) = store_with_clock();
        let todo = store.create(NewTodo::with_title("a"));
        clock.advance(Duration::seconds(5));
        let patch = TodoPatch {
            title: Some("b".to_string()),
            completed: Some(true),
            ..TodoPatch::default()
        };
        let updated = store.update(todo.id, patch).unwrap();
        assert_eq!(updated.id, todo.id);
        assert_eq!(updated.created_at, todo.created_at);
        assert_eq!(updated.updated_at, start() + Duration::seconds(5));
        assert_eq!(updated.title, "b");
        assert!(updated.completed);
        assert_eq!(store.get(todo.id).unwrap(), updated);
    }

    #[test]
    fn empty_update_only_refreshes_updated_at() {
        let (mut store, clock) = store_with_clock();
        let todo = store.create(NewTodo::with_title("a"));
        clock.advance(Duration::milliseconds(1));
        let updated = store.update(todo.id, TodoPatch::default()).unwrap();
        assert_eq!(
            Todo {
                updated_at: todo.updated_at,
                ..updated.clone()
            },
            todo
        );
        assert!(updated.updated_at > todo.updated_at);
    }

    #[test]
    fn updated_at_never_moves_backwards() {
        let (mut store, clock) = store_with_clock();
        let todo = store.create(NewTodo::with_title("a"));
        clock.set(start() - Duration::hours(1));
        let updated = store.toggle(todo.id).unwrap();
        assert_eq!(updated.updated_at, todo.updated_at);
        assert!(updated.created_at <= updated.updated_at);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let mut store = TodoStore::new();
        let id = Uuid::new_v4();
        assert_eq!(
            store.update(id, TodoPatch::default()),
            Err(StoreError::NotFound(id))
        );
    }

    #[test]
    fn toggle_twice_restores_completed() {
        let (mut store, clock) = store_with_clock();
        let todo = store.create(NewTodo::with_title("a"));
        clock.advance(Duration::seconds(1));
        let once = store.toggle(todo.id).unwrap();
        assert!(once.completed);
        clock.advance(Duration::seconds(1));
        let twice = store.toggle(todo.id).unwrap();
        assert!(!twice.completed);
        assert!(once.updated_at > todo.updated_at);
        assert!(twice.updated_at > once.updated_at);
    }

    #[test]
    fn delete_removes_and_returns_snapshot() {
        let mut store = TodoStore::new();
        let a = store.create(NewTodo::with_title("a"));
        let b = store.create(NewTodo::with_title("b"));
        let removed = store.delete(a.id).unwrap();
        assert_eq!(removed, a);
        assert_eq!(store.get(a.id), Err(StoreError::NotFound(a.id)));
        assert_eq!(store.get(b.id).unwrap(), b);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_twice_is_not_found() {
        let mut store = TodoStore::new();
        let a = store.create(NewTodo::with_title("a"));
        store.delete(a.id).unwrap();
        assert_eq!(store.delete(a.id), Err(StoreError::NotFound(a.id)));
    }

    #[test]
    fn query_sees_newest_first() {
        let (mut store, clock) = store_with_clock();
        store.create(NewTodo::with_title("old"));
        clock.advance(Duration::minutes(1));
        store.create(NewTodo::with_title("new"));
        let page = store.query(&TodoQuery::default());
        let titles: Vec<_> = page.items.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "old"]);
    }

    #[test]
    fn stats_total_is_completed_plus_pending() {
        let mut store = TodoStore::new();
        let a = store.create(NewTodo::with_title("a"));
        store.create(NewTodo::with_title("b"));
        store.toggle(a.id).unwrap();
        let stats = store.stats();
        assert_eq!(stats.total, stats.completed + stats.pending);
        assert_eq!(stats.completion_rate, 50);
    }

    #[test]
    fn seed_samples_inserts_welcome_records() {
        let (mut store, _) = store_with_clock();
        store.seed_samples();
        assert_eq!(store.len(), 2);
        let page = store.query(&TodoQuery::default());
        assert_eq!(page.items[0].title, "Sample Todo - Welcome!");
        assert_eq!(page.items[1].category, "learning");
        assert!(page.items[1].completed);
        assert!(page.items.iter().all(|t| t.created_at <= t.updated_at));
    }
}
