//! Scripted transport and payload builders for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;

use crate::api::Transport;
use crate::auth::claims::{encode, AccessTokenClaims};
use crate::auth::TokenPackage;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Codes,
    Login,
    Refresh,
}

impl Route {
    fn of(url: &Url) -> Self {
        if url.path().ends_with("/codes") {
            Route::Codes
        } else if url.query_pairs().any(|(k, _)| k == "signature") {
            Route::Login
        } else {
            Route::Refresh
        }
    }
}

#[derive(Debug, Clone)]
pub struct Call {
    pub route: Route,
    pub url: String,
    pub bearer: Option<String>,
}

/// Transport answering from per-route queues and recording every call.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<Route, VecDeque<Result<String>>>>,
    calls: Mutex<Vec<Call>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, route: Route, response: Result<String>) {
        self.responses
            .lock()
            .unwrap()
            .entry(route)
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.calls().into_iter().map(|c| c.route).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &Url, bearer: Option<&str>) -> Result<String> {
        let route = Route::of(url);
        self.calls.lock().unwrap().push(Call {
            route,
            url: url.to_string(),
            bearer: bearer.map(String::from),
        });

        // Give concurrent callers a chance to run while this request is in flight.
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }

        let next = self
            .responses
            .lock()
            .unwrap()
            .get_mut(&route)
            .and_then(|q| q.pop_front());
        next.unwrap_or_else(|| Err(Error::Transport(format!("no scripted response for {:?}", route))))
    }
}

/// Token pair whose access token encodes claims with `id == label`.
pub fn package(label: &str, expiry_time: u64, failure_time: u64) -> TokenPackage {
    TokenPackage {
        access_token: encode(&AccessTokenClaims {
            id: label.to_string(),
            user_id: format!("user-{}", label),
            secret: format!("secret-{}", label),
        }),
        refresh_token: format!("refresh-{}", label),
        expiry_time,
        failure_time,
    }
}

pub fn code_ok(code: &str) -> String {
    serde_json::json!({
        "successful": true,
        "code": "200",
        "message": "",
        "data": code,
    })
    .to_string()
}

pub fn tokens_ok(pkg: &TokenPackage) -> String {
    serde_json::json!({
        "successful": true,
        "code": "200",
        "message": "",
        "data": pkg,
    })
    .to_string()
}

pub fn envelope_err(code: &str, message: &str) -> String {
    serde_json::json!({
        "successful": false,
        "code": code,
        "message": message,
        "data": null,
    })
    .to_string()
}
