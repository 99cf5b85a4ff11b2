//! Test doubles for the network and the UI.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::context::ClientContext;
use crate::error::{ClientError, ClientResult};
use crate::navigation::HistoryNavigator;
use crate::notify::{Notifier, Toast};
use crate::store::{Session, Store, UserInfo};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

#[derive(Clone)]
enum Scripted {
    Reply {
        status: u16,
        body: Vec<u8>,
        delay: Duration,
    },
    Refuse,
}

/// Answers requests from a script keyed by `"METHOD /path"` (query excluded).
///
/// Each key holds a queue of replies. The last reply of a queue repeats.
/// Unscripted routes answer 404 with no body.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, key: &str, status: u16, body: Value) {
        self.respond_after(key, Duration::ZERO, status, body);
    }

    pub fn respond_after(&self, key: &str, delay: Duration, status: u16, body: Value) {
        let body = if body.is_null() {
            Vec::new()
        } else {
            serde_json::to_vec(&body).unwrap()
        };
        self.push(key, Scripted::Reply { status, body, delay });
    }

    /// The request fails with no response (connection refused).
    pub fn refuse(&self, key: &str) {
        self.push(key, Scripted::Refuse);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, key: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| format!("{} {}", r.method, r.path) == key)
            .count()
    }

    fn push(&self, key: &str, reply: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(reply);
    }

    fn next(&self, key: &str) -> Option<Scripted> {
        let mut routes = self.routes.lock().unwrap();
        let queue = routes.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse> {
        let key = format!("{} {}", request.method, request.path);
        self.requests.lock().unwrap().push(request);

        match self.next(&key) {
            Some(Scripted::Reply {
                status,
                body,
                delay,
            }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(HttpResponse { status, body })
            }
            Some(Scripted::Refuse) => Err(ClientError::ConnectionFailed(format!(
                "connection refused: {}",
                key
            ))),
            None => Ok(HttpResponse {
                status: 404,
                body: Vec::new(),
            }),
        }
    }
}

/// Keeps every toast it is handed.
#[derive(Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.toasts().into_iter().map(|t| t.message).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }
}

/// A context wired to test doubles, plus handles to inspect them.
pub struct Harness {
    pub ctx: ClientContext,
    pub transport: Arc<ScriptedTransport>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<HistoryNavigator>,
}

impl Harness {
    pub fn new() -> Self {
        let transport = Arc::new(ScriptedTransport::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(HistoryNavigator::new());
        let ctx = ClientContext::from_parts(
            Arc::new(Store::new("http://localhost:5000")),
            transport.clone(),
            notifier.clone(),
            navigator.clone(),
        );
        Harness {
            ctx,
            transport,
            notifier,
            navigator,
        }
    }

    /// A harness with an opaque session already in the store.
    pub async fn signed_in() -> Self {
        let harness = Self::new();
        harness
            .ctx
            .store
            .session()
            .set(Some(Session::from_token("test-token")))
            .await;
        harness
    }

    /// Like [`signed_in`](Self::signed_in), with a known user id.
    pub async fn signed_in_as(user_id: i64) -> Self {
        let harness = Self::signed_in().await;
        harness
            .ctx
            .store
            .user()
            .set(Some(UserInfo {
                user_id: Some(user_id),
                ..Default::default()
            }))
            .await;
        harness
    }
}
