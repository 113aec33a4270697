//! HTTP front end for the in-memory todo store.
//!
//! # Design
//! - One `TodoStore` behind one `RwLock` (`todos::Db`), shared by every
//!   handler. There is no finer-grained locking.
//! - `app()` builds a router over a fresh, empty store with default
//!   settings; tests drive it directly with `tower::ServiceExt::oneshot`.
//! - `run()` seeds the store if configured and serves with connection info so
//!   the rate limiter can key on the client address.

pub mod config;
pub mod error;
pub mod rate_limit;
pub mod todos;

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, OriginalUri},
    handler::HandlerWithoutStateExt,
    http::{HeaderName, HeaderValue},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, get_service},
    Json, Router,
};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use todo_core::TodoStore;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::error::ApiError;
use crate::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::todos::{create_todo_router, Db};

pub use todo_core::{Statistics, Todo};

pub const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

const SECURITY_HEADERS: [(&str, &str); 6] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "SAMEORIGIN"),
    ("referrer-policy", "no-referrer"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-xss-protection", "0"),
];

/// Router over an empty store with default settings.
pub fn app() -> Router {
    router(TodoStore::new(), &Config::default())
}

/// Full application router: API routes, static files, and middleware.
pub fn router(store: TodoStore, config: &Config) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit_max,
        config.rate_limit_window(),
    ));
    let expose_errors = !config.is_production();

    let static_files = ServeDir::new(&config.static_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found.into_service());

    let mut app = Router::new()
        .route("/", get(welcome).fallback(not_found))
        .route(
            "/app",
            get_service(ServeFile::new(config.static_dir.join("index.html"))).fallback(not_found),
        )
        .merge(create_todo_router(db))
        .fallback_service(static_files)
        .layer(from_fn_with_state(limiter, rate_limit_middleware))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
            ApiError::from_panic(panic, expose_errors).into_response()
        }))
        .layer(CorsLayer::permissive());

    for (name, value) in SECURITY_HEADERS {
        app = app.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ));
    }

    app.layer(TraceLayer::new_for_http())
}

/// Serve the API on `listener` until the process stops.
pub async fn run(listener: TcpListener, config: Config) -> Result<(), std::io::Error> {
    let mut store = TodoStore::new();
    if config.seed_samples {
        store.seed_samples();
    }
    let app = router(store, &config);
    tracing::info!(
        address = ?listener.local_addr().ok(),
        environment = %config.environment,
        "todo API listening"
    );
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}

#[tracing::instrument]
pub async fn welcome() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Welcome to Todo List API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "Server is running",
        "frontend": "Access frontend at /app",
        "endpoints": {
            "GET /api/todos": "Get all todos",
            "GET /api/todos/stats": "Get todo statistics",
            "GET /api/todos/:id": "Get todo by ID",
            "POST /api/todos": "Create new todo",
            "PUT /api/todos/:id": "Update todo",
            "DELETE /api/todos/:id": "Delete todo",
            "PATCH /api/todos/:id/toggle": "Toggle todo status"
        }
    }))
}

/// JSON 404 for unknown paths and for known paths hit with an unrouted method.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> Response {
    ApiError::NotFound(format!("Not Found - {uri}")).into_response()
}
