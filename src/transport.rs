//! The HTTP layer underneath [`Client`](crate::Client).
//!
//! [`Transport`] is the seam: the client hands it fully encoded requests and
//! gets raw responses back, so tests can swap in a scripted fake.

use std::cell::RefCell;
use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use thiserror::Error;
use tracing::trace;

use crate::client::ClientConfig;
use crate::error::{Error, Result};
use crate::request::HttpMethod;
use crate::util::urljoin;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A request ready for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Path plus query string, relative to the base URL.
    pub uri: String,
    /// Form-encoded body for POST and PUT.
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

/// Failures below the HTTP layer. Any HTTP response, whatever its status,
/// is not a transport error.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection could not be opened.
    #[error("could not connect")]
    Connect(#[source] BoxError),

    /// The connection broke or timed out mid-request.
    #[error("request did not complete")]
    Io(#[source] BoxError),
}

pub trait Transport: Send {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Drops and re-establishes the underlying connection.
    fn reconnect(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Blocking `reqwest` transport carrying the account headers on every call.
pub struct ReqwestTransport {
    base_url: String,
    headers: HeaderMap,
    timeout: Duration,
    http: RefCell<HttpClient>,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("locomatix-rs/{}", env!("CARGO_PKG_VERSION")))
                .unwrap_or(HeaderValue::from_static("locomatix-rs")),
        );
        for (name, value) in [
            ("lx-custid", &config.custid),
            ("lx-custkey", &config.key),
            ("lx-secretkey", &config.secret_key),
            ("lx-apiversion", &config.version),
        ] {
            let value = HeaderValue::from_str(value).map_err(|_| {
                Error::Config(format!("{name} contains characters not allowed in a header"))
            })?;
            headers.insert(HeaderName::from_static(name), value);
        }

        let http = build_http(&headers, config.timeout).map_err(|e| {
            Error::Config(format!("failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            base_url: config.base_url(),
            headers,
            timeout: config.timeout,
            http: RefCell::new(http),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn build_http(headers: &HeaderMap, timeout: Duration) -> reqwest::Result<HttpClient> {
    HttpClient::builder()
        .default_headers(headers.clone())
        .timeout(timeout)
        .build()
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_connect() {
        TransportError::Connect(Box::new(err))
    } else {
        TransportError::Io(Box::new(err))
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = urljoin(&self.base_url, &request.uri);
        let http = self.http.borrow();
        let mut builder = http.request(request.method.into(), &url);
        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(body.clone());
        }

        let resp = builder.send().map_err(classify)?;
        let status = resp.status();
        let body = resp.text().map_err(|e| TransportError::Io(Box::new(e)))?;
        trace!(status = status.as_u16(), %body, "raw response");

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }

    fn reconnect(&self) -> Result<(), TransportError> {
        let fresh = build_http(&self.headers, self.timeout)
            .map_err(|e| TransportError::Connect(Box::new(e)))?;
        *self.http.borrow_mut() = fresh;
        Ok(())
    }
}
