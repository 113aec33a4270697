//! Full round-trip against the server listening on a real socket.
//!
//! # Design
//! Starts the server on a random port in a background thread, then talks to
//! it over HTTP with ureq. This covers what `oneshot` tests cannot: the
//! connect-info plumbing used by the rate limiter and start-up seeding.

use serde_json::{json, Value};
use todo_server::config::Config;

struct Reply {
    status: u16,
    body: Value,
}

fn agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent()
}

/// Execute one request, returning 4xx/5xx responses as data instead of `Err`.
fn execute(method: &str, url: &str, body: Option<Value>) -> Reply {
    let agent = agent();
    let mut response = match (method, body) {
        ("GET", _) => agent.get(url).call(),
        ("DELETE", _) => agent.delete(url).call(),
        ("PATCH", _) => agent.patch(url).send_empty(),
        ("POST", Some(body)) => agent
            .post(url)
            .content_type("application/json")
            .send(body.to_string().as_bytes()),
        ("PUT", Some(body)) => agent
            .put(url)
            .content_type("application/json")
            .send(body.to_string().as_bytes()),
        (other, _) => panic!("unsupported request: {other}"),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let text = response.body_mut().read_to_string().unwrap_or_default();
    Reply {
        status,
        body: serde_json::from_str(&text).unwrap_or(Value::Null),
    }
}

/// Start the server on a random port and return its base URL.
fn start(config: Config) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            todo_server::run(listener, config).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn crud_lifecycle() {
    let base = start(Config {
        seed_samples: false,
        ..Config::default()
    });
    let todos = format!("{base}/api/todos");

    // Step 1: list — should be empty.
    let reply = execute("GET", &todos, None);
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["totalCount"], 0);

    // Step 2: create.
    let reply = execute(
        "POST",
        &todos,
        Some(json!({"title": "Integration test", "priority": "high"})),
    );
    assert_eq!(reply.status, 201);
    assert_eq!(reply.body["data"]["priority"], "high");
    let id = reply.body["data"]["id"].as_str().unwrap().to_string();

    // Step 3: get.
    let reply = execute("GET", &format!("{todos}/{id}"), None);
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["data"]["title"], "Integration test");

    // Step 4: update.
    let reply = execute(
        "PUT",
        &format!("{todos}/{id}"),
        Some(json!({"title": "Updated title"})),
    );
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["data"]["title"], "Updated title");
    assert_eq!(reply.body["data"]["completed"], false);

    // Step 5: toggle.
    let reply = execute("PATCH", &format!("{todos}/{id}/toggle"), None);
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["message"], "Todo marked as completed");

    // Step 6: stats.
    let reply = execute("GET", &format!("{todos}/stats"), None);
    assert_eq!(reply.body["data"]["completed"], 1);
    assert_eq!(reply.body["data"]["completionRate"], 100);

    // Step 7: delete.
    let reply = execute("DELETE", &format!("{todos}/{id}"), None);
    assert_eq!(reply.status, 200);

    // Step 8: get and delete after delete — 404.
    assert_eq!(execute("GET", &format!("{todos}/{id}"), None).status, 404);
    let reply = execute("DELETE", &format!("{todos}/{id}"), None);
    assert_eq!(reply.status, 404);
    assert_eq!(reply.body["success"], false);

    // Step 9: list — empty again.
    let reply = execute("GET", &todos, None);
    assert_eq!(reply.body["data"], json!([]));
}

#[test]
fn seeded_server_starts_with_samples() {
    let base = start(Config {
        seed_samples: true,
        ..Config::default()
    });

    let reply = execute("GET", &format!("{base}/api/todos"), None);
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["totalCount"], 2);
}

#[test]
fn rate_limit_applies_per_client() {
    let base = start(Config {
        seed_samples: false,
        rate_limit_max: 3,
        ..Config::default()
    });

    for _ in 0..3 {
        assert_eq!(execute("GET", &format!("{base}/api/todos"), None).status, 200);
    }
    let reply = execute("GET", &format!("{base}/api/todos"), None);
    assert_eq!(reply.status, 429);
    assert_eq!(reply.body["success"], false);
}
