//! Transport abstraction consumed by the file-operation core.
//!
//! The core never builds HTTP requests itself. It hands a [`WapiRequest`] to
//! whatever [`Transport`] the caller supplied, which owns the connection pool,
//! credentials and base URL. The production implementation lives in
//! [`crate::http_utils::HttpTransport`]; tests use scripted in-memory transports.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value;
use strum::{Display, EnumString};
use thiserror::Error;

/// Stream of body chunks returned by a streaming download.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Low-level failure reported by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// No connection could be established, or it was reset before a response arrived.
    #[error("connection failed: {0}")]
    Connect(String),
    /// The request timed out before any response was received.
    #[error("request timed out: {0}")]
    Timeout(String),
    /// Anything else the underlying client reported.
    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// HTTP status code if the server produced a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure is worth retrying: gateway errors, or no response at all.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Status { status, .. } => matches!(status, 502..=504),
            TransportError::Connect(_) | TransportError::Timeout(_) => true,
            TransportError::Other(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// A request against the versioned API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct WapiRequest {
    pub method: Method,
    /// Short path relative to the base URL, e.g. `fileop` or an object reference.
    pub path: String,
    pub params: Vec<(String, String)>,
    pub json: Option<Value>,
}

impl WapiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            params: Vec::new(),
            json: None,
        }
    }

    pub fn post(path: impl Into<String>, json: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            params: Vec::new(),
            json: Some(json),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Value of the first query parameter named `key`.
    pub fn param_value(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone, PartialEq)]
pub struct WapiResponse {
    pub status: u16,
    pub body: Bytes,
}

impl WapiResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Authenticated connection to a grid manager.
///
/// Implementations must turn any non-2xx answer into [`TransportError::Status`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Host string the caller configured to reach the grid manager.
    fn grid_mgr(&self) -> &str;

    /// Perform a request against the versioned base URL.
    async fn request(&self, request: WapiRequest) -> Result<WapiResponse, TransportError>;

    /// Multipart POST of `body` to an absolute, server-issued URL.
    async fn upload(
        &self,
        url: &str,
        filename: &str,
        body: Bytes,
    ) -> Result<WapiResponse, TransportError>;

    /// Streaming GET of an absolute, server-issued URL.
    async fn download(&self, url: &str) -> Result<ByteStream, TransportError>;
}
