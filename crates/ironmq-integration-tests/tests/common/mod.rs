//! Common test utilities for ironmq-client integration tests
//!
//! This module provides:
//! - An in-process model of the IronMQ v1 REST surface mounted on `wiremock`
//! - Helpers for building clients against the model
//! - Tracing setup for test output

use ironmq_client::{Client, ClientConfig};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use wiremock::{matchers::any, Mock, MockServer, Request, Respond, ResponseTemplate};

pub const PROJECT_ID: &str = "test-project";
pub const TOKEN: &str = "test-token";

/// First id handed out by the model; large enough to need 64 bits.
const FIRST_MESSAGE_ID: u64 = 5_924_620_498_196_814_694;

const SERVICE_PAGE_SIZE: usize = 30;

/// Install a fmt subscriber once; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Service Model State
// ============================================================================

#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct StoredMessage {
    pub id: u64,
    pub body: String,
    pub timeout: u64,
    pub delay: u64,
    pub expires_in: u64,
    pub reserved: bool,
    /// Released with a delay and not yet visible
    pub delayed: bool,
    pub reserved_count: u64,
}

impl StoredMessage {
    fn is_visible(&self) -> bool {
        !self.reserved && !self.delayed
    }

    fn to_json(&self) -> Value {
        json!({
            "id": self.id.to_string(),
            "body": self.body,
            "timeout": self.timeout,
            "reserved_count": self.reserved_count,
        })
    }
}

#[derive(Debug, Default)]
struct ServiceState {
    queues: BTreeMap<String, Vec<StoredMessage>>,
    next_id: u64,
    /// Bodies of every release request, in order
    release_bodies: Vec<Value>,
}

impl ServiceState {
    fn allocate_id(&mut self) -> u64 {
        if self.next_id == 0 {
            self.next_id = FIRST_MESSAGE_ID;
        }
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

// ============================================================================
// Fake IronMQ Service
// ============================================================================

/// Stateful fake of the queue service
pub struct FakeIronMq {
    server: MockServer,
    state: Arc<Mutex<ServiceState>>,
}

#[allow(dead_code)]
impl FakeIronMq {
    pub async fn start() -> Self {
        init_tracing();

        let server = MockServer::start().await;
        let state = Arc::new(Mutex::new(ServiceState::default()));

        Mock::given(any())
            .respond_with(ServiceResponder {
                state: Arc::clone(&state),
            })
            .mount(&server)
            .await;

        Self { server, state }
    }

    /// Client configured against this fake
    pub fn client(&self) -> Client {
        Client::new(self.config()).expect("valid test configuration")
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(PROJECT_ID, TOKEN)
            .with_base_url(format!("{}/1/projects/{}", self.server.uri(), PROJECT_ID))
    }

    /// Create queues directly in the model
    pub fn seed_queues(&self, names: impl IntoIterator<Item = String>) {
        let mut state = self.state.lock().unwrap();
        for name in names {
            state.queues.entry(name).or_default();
        }
    }

    pub fn queue_names(&self) -> Vec<String> {
        self.state.lock().unwrap().queues.keys().cloned().collect()
    }

    pub fn messages(&self, queue: &str) -> Vec<StoredMessage> {
        self.state
            .lock()
            .unwrap()
            .queues
            .get(queue)
            .cloned()
            .unwrap_or_default()
    }

    pub fn release_bodies(&self) -> Vec<Value> {
        self.state.lock().unwrap().release_bodies.clone()
    }

    /// Number of queue listing page requests received so far
    pub async fn list_page_requests(&self) -> usize {
        let list_path = format!("/1/projects/{}/queues", PROJECT_ID);
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.as_str() == "GET" && r.url.path() == list_path)
            .count()
    }
}

// ============================================================================
// Request Routing
// ============================================================================

struct ServiceResponder {
    state: Arc<Mutex<ServiceState>>,
}

impl Respond for ServiceResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let expected_auth = format!("OAuth {}", TOKEN);
        let authorized = request
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| v == expected_auth);
        if !authorized {
            return error(401, "Invalid token");
        }

        let prefix = format!("/1/projects/{}/", PROJECT_ID);
        let Some(route) = request.url.path().strip_prefix(&prefix) else {
            return error(404, "Project not found");
        };
        let segments: Vec<&str> = route.split('/').collect();
        let query: BTreeMap<String, String> = request.url.query_pairs().into_owned().collect();
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);

        let mut state = self.state.lock().unwrap();
        match (request.method.as_str(), segments.as_slice()) {
            ("GET", ["queues"]) => list_queues(&state, &query),
            ("POST", ["queues", name]) => {
                state.queues.entry(name.to_string()).or_default();
                ok(json!({"queue": {"name": name, "project_id": PROJECT_ID}}))
            }
            ("GET", ["queues", name]) => match state.queues.get(*name) {
                Some(messages) => ok(json!({
                    "id": format!("id-{}", name),
                    "name": name,
                    "project_id": PROJECT_ID,
                    "size": messages.len(),
                })),
                None => error(404, "Queue not found"),
            },
            ("DELETE", ["queues", name]) => match state.queues.remove(*name) {
                Some(_) => ok(json!({"msg": "Deleted"})),
                None => error(404, "Queue not found"),
            },
            ("POST", ["queues", name, "clear"]) => match state.queues.get_mut(*name) {
                Some(messages) => {
                    messages.clear();
                    ok(json!({"msg": "Cleared"}))
                }
                None => error(404, "Queue not found"),
            },
            ("POST", ["queues", name, "messages"]) => add_messages(&mut state, name, &body),
            ("GET", ["queues", name, "messages"]) => reserve_messages(&mut state, name, &query),
            ("GET", ["queues", name, "messages", "peek"]) => peek_messages(&state, name, &query),
            ("POST", ["queues", name, "messages", id, "release"]) => {
                state.release_bodies.push(body.clone());
                let delay = body.get("delay").and_then(Value::as_u64).unwrap_or(0);
                with_message(&mut state, name, id, |message| {
                    if !message.reserved {
                        return false;
                    }
                    message.reserved = false;
                    message.delayed = delay > 0;
                    true
                })
            }
            ("POST", ["queues", name, "messages", id, "touch"]) => {
                with_message(&mut state, name, id, |message| message.reserved)
            }
            ("DELETE", ["queues", name, "messages", id]) => {
                let Some(messages) = state.queues.get_mut(*name) else {
                    return error(404, "Queue not found");
                };
                let before = messages.len();
                messages.retain(|m| m.id.to_string() != *id);
                if messages.len() < before {
                    ok(json!({"msg": "Deleted"}))
                } else {
                    error(404, "Message not found")
                }
            }
            _ => error(404, "Not found"),
        }
    }
}

fn ok(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

fn error(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({"msg": message}))
}

fn list_queues(state: &ServiceState, query: &BTreeMap<String, String>) -> ResponseTemplate {
    let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(0);
    let per_page: usize = query
        .get("per_page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(SERVICE_PAGE_SIZE);

    let items: Vec<Value> = state
        .queues
        .keys()
        .skip(page * per_page)
        .take(per_page)
        .map(|name| json!({"id": format!("id-{}", name), "project_id": PROJECT_ID, "name": name}))
        .collect();

    ok(Value::Array(items))
}

fn add_messages(state: &mut ServiceState, queue: &str, body: &Value) -> ResponseTemplate {
    let Some(submitted) = body.get("messages").and_then(Value::as_array) else {
        return error(400, "Invalid JSON");
    };

    let mut stored = Vec::with_capacity(submitted.len());
    for message in submitted {
        let Some(text) = message.get("body").and_then(Value::as_str) else {
            return error(400, "Message body is required");
        };
        let field = |name: &str, default: u64| message.get(name).and_then(Value::as_u64).unwrap_or(default);
        stored.push(StoredMessage {
            id: 0,
            body: text.to_string(),
            timeout: field("timeout", 60),
            delay: field("delay", 0),
            expires_in: field("expires_in", 604_800),
            reserved: false,
            delayed: field("delay", 0) > 0,
            reserved_count: 0,
        });
    }

    let mut ids = Vec::with_capacity(stored.len());
    for message in &mut stored {
        message.id = state.allocate_id();
        ids.push(message.id.to_string());
    }
    state.queues.entry(queue.to_string()).or_default().extend(stored);

    ok(json!({"ids": ids, "msg": "Messages put on queue."}))
}

fn batch_size(query: &BTreeMap<String, String>) -> usize {
    query.get("n").and_then(|n| n.parse().ok()).unwrap_or(1)
}

fn reserve_messages(
    state: &mut ServiceState,
    queue: &str,
    query: &BTreeMap<String, String>,
) -> ResponseTemplate {
    let Some(messages) = state.queues.get_mut(queue) else {
        return error(404, "Queue not found");
    };

    let reserved: Vec<Value> = messages
        .iter_mut()
        .filter(|m| m.is_visible())
        .take(batch_size(query))
        .map(|m| {
            m.reserved = true;
            m.reserved_count += 1;
            m.to_json()
        })
        .collect();

    ok(json!({"messages": reserved}))
}

fn peek_messages(
    state: &ServiceState,
    queue: &str,
    query: &BTreeMap<String, String>,
) -> ResponseTemplate {
    let Some(messages) = state.queues.get(queue) else {
        return error(404, "Queue not found");
    };

    let visible: Vec<Value> = messages
        .iter()
        .filter(|m| m.is_visible())
        .take(batch_size(query))
        .map(StoredMessage::to_json)
        .collect();

    ok(json!({"messages": visible}))
}

fn with_message(
    state: &mut ServiceState,
    queue: &str,
    id: &str,
    apply: impl FnOnce(&mut StoredMessage) -> bool,
) -> ResponseTemplate {
    let Some(message) = state
        .queues
        .get_mut(queue)
        .and_then(|messages| messages.iter_mut().find(|m| m.id.to_string() == id))
    else {
        return error(404, "Message not found");
    };

    if apply(message) {
        ok(json!({"msg": "OK"}))
    } else {
        error(403, "Message not reserved")
    }
}
