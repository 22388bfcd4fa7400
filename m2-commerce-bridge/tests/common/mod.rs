//! Scripted in-memory transport shared by the integration tests.

#![allow(dead_code, reason = "each test binary uses a different subset of the helpers")]
#![allow(clippy::unwrap_used, reason = "test code")]

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;
use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use m2_commerce_bridge::{
    BridgeConfig, CommerceBridge, Transport,
    criteria::SearchCriteria,
    error::{BridgeError, HttpMethod, Result},
};
use serde_json::Value;

/// Scripted answer of one call.
#[derive(Debug, Clone)]
pub enum Reply {
    /// 2xx with a JSON body.
    Json(Value),
    /// Non-success status with a message.
    Status(u16, &'static str),
    /// The call timed out.
    Timeout,
}

/// One recorded call.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: HttpMethod,
    pub path: String,
    pub criteria: Option<SearchCriteria>,
    pub body: Option<Value>,
}

/// Transport answering from a script keyed by method and exact path.
///
/// Replies for a route are consumed in order; the last one repeats. Unscripted routes
/// answer like the platform does for unknown routes (`404`), unless a default reply is set.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(HttpMethod, String), VecDeque<Reply>>>,
    calls: Mutex<Vec<Call>>,
    fallback: Option<Reply>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every unscripted call answers with `reply`.
    pub fn answering_all(reply: Reply) -> Self {
        Self { fallback: Some(reply), ..Self::default() }
    }

    pub fn on(self, method: HttpMethod, path: &str, reply: Reply) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_owned()))
            .or_default()
            .push_back(reply);
        self
    }

    pub fn on_get(self, path: &str, body: Value) -> Self {
        self.on(HttpMethod::Get, path, Reply::Json(body))
    }

    pub fn on_post(self, path: &str, body: Value) -> Self {
        self.on(HttpMethod::Post, path, Reply::Json(body))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls as `"METHOD /path"` strings.
    pub fn call_log(&self) -> Vec<String> {
        self.calls().iter().map(|c| format!("{} {}", c.method, c.path)).collect()
    }

    fn respond(
        &self,
        method: HttpMethod,
        path: &str,
        criteria: Option<&SearchCriteria>,
        body: Option<&Value>,
    ) -> Result<Value> {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_owned(),
            criteria: criteria.cloned(),
            body: body.cloned(),
        });

        let reply = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&(method, path.to_owned())) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply.or_else(|| self.fallback.clone()) {
            Some(Reply::Json(value)) => Ok(value),
            Some(Reply::Status(status, message)) => Err(BridgeError::Transport {
                status,
                method,
                endpoint: path.to_owned(),
                message: message.to_owned(),
            }),
            Some(Reply::Timeout) => Err(BridgeError::Timeout { method, endpoint: path.to_owned() }),
            None => Err(BridgeError::Transport {
                status: 404,
                method,
                endpoint: path.to_owned(),
                message: "Request does not match any route.".to_owned(),
            }),
        }
    }
}

impl Transport for MockTransport {
    fn get<'a>(
        &'a self,
        path: &'a str,
        criteria: Option<&'a SearchCriteria>,
    ) -> impl Future<Output = Result<Value>> + Send + 'a {
        async move { self.respond(HttpMethod::Get, path, criteria, None) }
    }

    fn post<'a>(
        &'a self,
        path: &'a str,
        body: &'a Value,
    ) -> impl Future<Output = Result<Value>> + Send + 'a {
        async move { self.respond(HttpMethod::Post, path, None, Some(body)) }
    }

    fn put<'a>(
        &'a self,
        path: &'a str,
        body: &'a Value,
    ) -> impl Future<Output = Result<Value>> + Send + 'a {
        async move { self.respond(HttpMethod::Put, path, None, Some(body)) }
    }
}

pub fn bridge(transport: MockTransport) -> CommerceBridge<MockTransport> {
    CommerceBridge::with_transport(BridgeConfig::new("https://shop.example.com"), transport)
        .unwrap()
}

/// `(field, value, condition)` of every filter group.
pub fn filters(criteria: &SearchCriteria) -> Vec<(String, String, String)> {
    criteria
        .filter_groups
        .iter()
        .flatten()
        .flat_map(|group| &group.filters)
        .map(|f| (f.field.clone(), f.value.clone(), f.condition_type.as_str().to_owned()))
        .collect()
}
