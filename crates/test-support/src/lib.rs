//! Shared helpers for integration tests: a scripted in-process YApi server.

use anyhow::Context as _;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// One canned reply of the mock `/api/interface/get` endpoint.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
    pub delay: Duration,
}

impl MockReply {
    #[must_use]
    pub fn json(body: &Value) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: "application/json",
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    /// Reply with a well-formed YApi envelope around a minimal descriptor.
    #[must_use]
    pub fn descriptor(id: &str, title: &str, path: &str) -> Self {
        Self::json(&envelope(json!({ "_id": id, "title": title, "path": path })))
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Wrap a descriptor record the way YApi does (`errcode`/`errmsg`/`data`).
#[must_use]
pub fn envelope(data: Value) -> Value {
    json!({ "errcode": 0, "errmsg": "成功！", "data": data })
}

/// A request observed by the mock.
#[derive(Debug, Clone)]
pub struct RecordedHit {
    pub at: Instant,
    pub query: HashMap<String, String>,
}

type Responder = Arc<dyn Fn(usize, &HashMap<String, String>) -> MockReply + Send + Sync>;

#[derive(Clone)]
struct MockState {
    responder: Responder,
    hits: Arc<Mutex<Vec<RecordedHit>>>,
}

/// In-process YApi stand-in serving `GET /api/interface/get`.
///
/// The responder receives the zero-based hit index and the query parameters of the request.
pub struct MockYapi {
    base_url: String,
    hits: Arc<Mutex<Vec<RecordedHit>>>,
    server: JoinHandle<()>,
}

impl MockYapi {
    /// Bind an ephemeral localhost port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start<F>(responder: F) -> anyhow::Result<Self>
    where
        F: Fn(usize, &HashMap<String, String>) -> MockReply + Send + Sync + 'static,
    {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            responder: Arc::new(responder),
            hits: hits.clone(),
        };
        let app = Router::new()
            .route("/api/interface/get", get(interface_get))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind mock yapi listener")?;
        let addr = listener.local_addr().context("mock yapi local_addr")?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            hits,
            server,
        })
    }

    /// Serve descriptors keyed by the `id` query parameter; unknown ids get an empty envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn with_descriptors(records: Vec<Value>) -> anyhow::Result<Self> {
        let by_id: HashMap<String, Value> = records
            .into_iter()
            .filter_map(|r| {
                let id = match r.get("_id")? {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Some((id, r))
            })
            .collect();
        Self::start(move |_, query| {
            let record = query.get("id").and_then(|id| by_id.get(id)).cloned();
            match record {
                Some(r) => MockReply::json(&envelope(r)),
                None => MockReply::json(&json!({ "errcode": 40011, "errmsg": "不存在的" })),
            }
        })
        .await
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn hit_count(&self) -> usize {
        self.hits.lock().len()
    }

    #[must_use]
    pub fn hits(&self) -> Vec<RecordedHit> {
        self.hits.lock().clone()
    }
}

impl Drop for MockYapi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn interface_get(
    State(state): State<MockState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let index = {
        let mut hits = state.hits.lock();
        hits.push(RecordedHit {
            at: Instant::now(),
            query: query.clone(),
        });
        hits.len() - 1
    };

    let reply = (state.responder)(index, &query);
    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }
    (
        reply.status,
        [(header::CONTENT_TYPE, reply.content_type)],
        reply.body,
    )
        .into_response()
}
