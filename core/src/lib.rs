//! In-memory store and query engine for the todo service.
//!
//! # Overview
//! Owns the collection of todo records and exposes create, read, update,
//! toggle, delete, the filter/search/sort/paginate query pipeline, and
//! aggregate statistics. Incoming payloads are checked by the `validation`
//! module before they reach the store.
//!
//! # Design
//! - No I/O and no async. The HTTP server wraps a `TodoStore` in a single
//!   lock and does all transport work itself.
//! - `TodoStore` is the only owner of records; callers receive clones.
//! - Defaults are an explicit merge (`NewTodo::with_title` overlaid with the
//!   supplied fields; `TodoPatch::apply_to` for updates).
//! - Time is injected through `Clock` so ordering is testable.

pub mod clock;
pub mod error;
pub mod query;
pub mod stats;
pub mod store;
pub mod types;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{FieldError, InvalidId, StoreError, ValidationErrors};
pub use query::{Page, TodoQuery};
pub use store::TodoStore;
pub use types::{NewTodo, Priority, PriorityBreakdown, Statistics, Todo, TodoPatch};
pub use validation::{
    validate_create, validate_id, validate_update, CreateTodoPayload, UpdateTodoPayload,
};
