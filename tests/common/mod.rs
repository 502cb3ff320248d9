//! In-process fake of the store's v2 key API for integration tests
#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Form, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use syncpoint::Settings;
use tokio::sync::watch;

#[derive(Debug, Clone)]
struct Event {
    action: &'static str,
    key: String,
    value: String,
    index: u64,
}

struct Inner {
    index: u64,
    keys: HashMap<String, (String, u64)>,
    events: Vec<Event>,
    watches: Vec<(String, u64)>,
}

#[derive(Clone)]
pub struct FakeStore {
    inner: Arc<Mutex<Inner>>,
    changed: watch::Sender<u64>,
    version: Arc<String>,
    index_header: bool,
}

impl FakeStore {
    pub fn new() -> Self {
        let (changed, _) = watch::channel(1);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                index: 1,
                keys: HashMap::new(),
                events: Vec::new(),
                watches: Vec::new(),
            })),
            changed,
            version: Arc::new(r#"{"etcdserver":"2.3.8","etcdcluster":"2.3.0"}"#.to_string()),
            index_header: true,
        }
    }

    /// Serve `body` from `/version`
    pub fn with_version(mut self, body: &str) -> Self {
        self.version = Arc::new(body.to_string());
        self
    }

    /// Leave out the index header (and the index in error bodies)
    pub fn without_index(mut self) -> Self {
        self.index_header = false;
        self
    }

    /// Commit a write directly, bypassing HTTP. Returns its index.
    pub fn set(&self, key: &str, value: &str) -> u64 {
        let key = normalize(key);
        let index = {
            let mut inner = self.inner.lock().unwrap();
            inner.index += 1;
            let index = inner.index;
            let action = if inner.keys.contains_key(&key) {
                "set"
            } else {
                "create"
            };
            inner.keys.insert(key.clone(), (value.to_string(), index));
            inner.events.push(Event {
                action,
                key,
                value: value.to_string(),
                index,
            });
            index
        };
        self.changed.send_replace(index);
        index
    }

    pub fn value(&self, key: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.keys.get(&normalize(key)).map(|(v, _)| v.clone())
    }

    pub fn index(&self) -> u64 {
        self.inner.lock().unwrap().index
    }

    /// Every long-poll received, as (key, waitIndex)
    pub fn watches(&self) -> Vec<(String, u64)> {
        self.inner.lock().unwrap().watches.clone()
    }

    pub fn event_count(&self) -> usize {
        self.inner.lock().unwrap().events.len()
    }

    fn index_headers(&self, index: u64) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if self.index_header {
            headers.insert("x-etcd-index", HeaderValue::from(index));
        }
        headers
    }

    fn not_found(&self, key: &str, index: u64) -> Response {
        let body = if self.index_header {
            json!({"errorCode": 100, "message": "Key not found", "cause": key, "index": index})
        } else {
            json!({"errorCode": 100, "message": "Key not found", "cause": key})
        };
        (StatusCode::NOT_FOUND, self.index_headers(index), body.to_string()).into_response()
    }

    fn read(&self, key: &str) -> Response {
        let inner = self.inner.lock().unwrap();
        match inner.keys.get(key) {
            Some((value, modified)) => {
                let body = json!({
                    "action": "get",
                    "node": {"key": key, "value": value, "modifiedIndex": modified, "createdIndex": modified}
                });
                (StatusCode::OK, self.index_headers(inner.index), body.to_string()).into_response()
            }
            None => self.not_found(key, inner.index),
        }
    }

    async fn watch(&self, key: String, wait_index: u64) -> Response {
        let mut rx = self.changed.subscribe();
        self.inner
            .lock()
            .unwrap()
            .watches
            .push((key.clone(), wait_index));

        loop {
            let found = {
                let inner = self.inner.lock().unwrap();
                inner
                    .events
                    .iter()
                    .find(|e| e.key == key && e.index >= wait_index)
                    .cloned()
                    .map(|e| (e, inner.index))
            };
            if let Some((event, current)) = found {
                let body = json!({
                    "action": event.action,
                    "node": {"key": event.key, "value": event.value, "modifiedIndex": event.index, "createdIndex": event.index}
                });
                return (StatusCode::OK, self.index_headers(current), body.to_string())
                    .into_response();
            }
            if rx.changed().await.is_err() {
                return (StatusCode::OK, String::new()).into_response();
            }
        }
    }
}

fn normalize(key: &str) -> String {
    format!("/{}", key.trim_start_matches('/'))
}

async fn version(State(store): State<FakeStore>) -> String {
    store.version.as_ref().clone()
}

async fn get_key(
    State(store): State<FakeStore>,
    Path(key): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let key = normalize(&key);
    if params.get("wait").map(|w| w == "true").unwrap_or(false) {
        let wait_index = params
            .get("waitIndex")
            .and_then(|i| i.parse().ok())
            .unwrap_or(0);
        return store.watch(key, wait_index).await;
    }
    store.read(&key)
}

async fn put_key(
    State(store): State<FakeStore>,
    Path(key): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let Some(value) = form.get("value") else {
        let body = json!({"errorCode": 209, "message": "Invalid field", "cause": "value is required"});
        return (StatusCode::BAD_REQUEST, body.to_string()).into_response();
    };
    let index = store.set(&key, value);
    let body = json!({
        "action": "set",
        "node": {"key": normalize(&key), "value": value, "modifiedIndex": index, "createdIndex": index}
    });
    (StatusCode::OK, store.index_headers(index), body.to_string()).into_response()
}

/// Start the fake store on an ephemeral port; returns its base URL.
pub async fn spawn(store: FakeStore) -> String {
    let app = Router::new()
        .route("/version", get(version))
        .route("/v2/keys/*key", get(get_key).put(put_key))
        .with_state(store);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// URL of a port nothing listens on
pub fn dead_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn settings_for(endpoint: &str) -> Settings {
    Settings::default()
        .with_endpoint(Some(endpoint.to_string()))
        .unwrap()
}
