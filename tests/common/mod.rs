#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use locomatix::{Client, ClientConfig, HttpRequest, HttpResponse, Transport, TransportError};
use serde_json::{Value, json};

enum Reply {
    Http(HttpResponse),
    ConnectFailure,
    IoFailure,
}

#[derive(Default)]
struct State {
    replies: VecDeque<Reply>,
    requests: Vec<HttpRequest>,
    reconnects: usize,
}

/// Replays scripted replies in order and records every request it sees.
///
/// Clones share state, so a test keeps one handle after giving another to
/// the client.
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<State>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn reply(&self, status: u16, body: impl Into<String>) -> &Self {
        self.state().replies.push_back(Reply::Http(HttpResponse {
            status,
            reason: if status == 200 { "OK".into() } else { "Error".into() },
            body: body.into(),
        }));
        self
    }

    /// A `Success` envelope around `result`.
    pub fn success(&self, result: Value) -> &Self {
        let body = json!({"Status": "Success", "ExecutionTime": 0.004, "Result": result});
        self.reply(200, body.to_string())
    }

    /// A `Success` envelope with no result.
    pub fn ok(&self) -> &Self {
        self.reply(200, r#"{"Status":"Success","ExecutionTime":0.002}"#)
    }

    /// An application error envelope.
    pub fn status(&self, status: &str) -> &Self {
        self.reply(200, json!({"Status": status}).to_string())
    }

    pub fn connect_failure(&self) -> &Self {
        self.state().replies.push_back(Reply::ConnectFailure);
        self
    }

    pub fn io_failure(&self) -> &Self {
        self.state().replies.push_back(Reply::IoFailure);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state().requests.clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.state()
            .requests
            .last()
            .cloned()
            .expect("no request was sent")
    }

    pub fn reconnects(&self) -> usize {
        self.state().reconnects
    }

    pub fn pending(&self) -> usize {
        self.state().replies.len()
    }

    pub fn client(&self) -> Client {
        self.client_with(config())
    }

    pub fn client_with(&self, config: ClientConfig) -> Client {
        Client::with_transport(config, self.clone())
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut state = self.state();
        state.requests.push(request.clone());
        match state.replies.pop_front() {
            Some(Reply::Http(resp)) => Ok(resp),
            Some(Reply::ConnectFailure) => Err(TransportError::Connect("connection refused".into())),
            Some(Reply::IoFailure) => Err(TransportError::Io("connection reset by peer".into())),
            None => Err(TransportError::Io("no scripted reply left".into())),
        }
    }

    fn reconnect(&self) -> Result<(), TransportError> {
        self.state().reconnects += 1;
        Ok(())
    }
}

pub fn config() -> ClientConfig {
    ClientConfig::new("1234", "key-abc", "secret-xyz").with_host("lx.test")
}

/// Splits a query string or form body into decoded pairs.
pub fn pairs(encoded: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(encoded.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Decoded query pairs of a GET/DELETE request.
pub fn query_of(request: &HttpRequest) -> Vec<(String, String)> {
    match request.uri.split_once('?') {
        Some((_, q)) => pairs(q),
        None => Vec::new(),
    }
}

pub fn path_of(request: &HttpRequest) -> &str {
    request.uri.split('?').next().unwrap_or_default()
}

pub fn param<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

pub fn object_row(id: &str, feed: &str, lat: f64, long: f64) -> Value {
    json!({
        "ObjectID": id,
        "Feed": feed,
        "ObjectNameValues": [{"Name": id}],
        "Latitude": lat,
        "Longitude": long,
        "Time": 1_262_304_000,
        "LocationNameValues": []
    })
}
