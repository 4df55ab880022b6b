//! HTTP transport for the grid manager API.
//!
//! This module provides the `reqwest` implementation of [`Transport`]: one
//! pooled client with a cookie store, basic-auth credentials and optional
//! TLS verification, addressing `https://{grid_mgr}/wapi/v{version}/{path}`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::{multipart, Client, RequestBuilder, Response};
use tracing::{debug, trace};
use url::Url;

use crate::transport::{ByteStream, Method, Transport, TransportError, WapiRequest, WapiResponse};

pub const DEFAULT_WAPI_VERSION: &str = "2.12";
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Configuration for HTTP requests with common settings
#[derive(Clone)]
pub struct HttpRequestConfig {
    /// Host name or address of the grid manager
    pub grid_mgr: String,
    /// API version, e.g. `2.12`
    pub wapi_version: String,
    pub username: String,
    pub password: String,
    /// Verify the grid manager's TLS certificate
    pub ssl_verify: bool,
    /// Request timeout in seconds; `None` waits forever, which large backups need
    pub timeout: Option<u64>,
    /// Default headers to include with all requests
    pub default_headers: HashMap<String, String>,
}

impl Default for HttpRequestConfig {
    fn default() -> Self {
        let mut default_headers = HashMap::new();
        default_headers.insert(
            "User-Agent".to_string(),
            concat!("wapictl/", env!("CARGO_PKG_VERSION")).to_string(),
        );

        Self {
            grid_mgr: String::new(),
            wapi_version: DEFAULT_WAPI_VERSION.to_string(),
            username: String::new(),
            password: String::new(),
            ssl_verify: true,
            timeout: None,
            default_headers,
        }
    }
}

impl std::fmt::Debug for HttpRequestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequestConfig")
            .field("grid_mgr", &self.grid_mgr)
            .field("wapi_version", &self.wapi_version)
            .field("username", &self.username)
            .field("password", &"********")
            .field("ssl_verify", &self.ssl_verify)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpRequestConfig {
    pub fn base_url(&self) -> String {
        format!(
            "https://{}/wapi/v{}/",
            self.grid_mgr,
            self.wapi_version.trim_start_matches('v')
        )
    }
}

/// Pooled, authenticated connection to one grid manager.
#[derive(Clone)]
pub struct HttpTransport {
    client: Arc<Client>,
    config: HttpRequestConfig,
}

impl HttpTransport {
    /// Get a reference to the HTTP client configuration
    pub fn config(&self) -> &HttpRequestConfig {
        &self.config
    }

    pub fn new(config: HttpRequestConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(!config.ssl_verify);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let client = builder.build().map_err(classify)?;

        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    /// Absolute URL of a short path such as `fileop` or an object reference.
    pub fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        let url = format!("{}{}", self.config.base_url(), path.trim_start_matches('/'));
        Url::parse(&url).map_err(|e| TransportError::Other(format!("invalid URL {}: {}", url, e)))
    }

    fn authorize(&self, mut request: RequestBuilder) -> RequestBuilder {
        request = request.basic_auth(&self.config.username, Some(&self.config.password));
        for (key, value) in &self.config.default_headers {
            request = request.header(key, value);
        }
        request
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, TransportError> {
        let response = self.authorize(request).send().await.map_err(classify)?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            debug!("Server answered {}: {}", status, body);
            Err(TransportError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn into_wapi_response(response: Response) -> Result<WapiResponse, TransportError> {
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(classify)?;
        trace!("Raw response body: {}", String::from_utf8_lossy(&body));
        Ok(WapiResponse::new(status, body))
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else if let Some(status) = error.status() {
        TransportError::Status {
            status: status.as_u16(),
            body: error.to_string(),
        }
    } else {
        TransportError::Other(error.to_string())
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn grid_mgr(&self) -> &str {
        &self.config.grid_mgr
    }

    async fn request(&self, request: WapiRequest) -> Result<WapiResponse, TransportError> {
        let url = self.endpoint(&request.path)?;
        trace!("{} {}", request.method, url);
        let mut builder = self
            .client
            .request(to_reqwest(request.method), url)
            .query(&request.params);
        if let Some(json) = &request.json {
            builder = builder.json(json);
        }
        let response = self.send(builder).await?;
        Self::into_wapi_response(response).await
    }

    async fn upload(
        &self,
        url: &str,
        filename: &str,
        body: Bytes,
    ) -> Result<WapiResponse, TransportError> {
        let part = multipart::Part::stream(body).file_name(filename.to_string());
        let form = multipart::Form::new().part(UPLOAD_FIELD_NAME, part);
        let response = self.send(self.client.post(url).multipart(form)).await?;
        Self::into_wapi_response(response).await
    }

    async fn download(&self, url: &str) -> Result<ByteStream, TransportError> {
        let response = self.send(self.client.get(url)).await?;
        Ok(Box::pin(response.bytes_stream().map_err(classify)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> HttpRequestConfig {
        HttpRequestConfig {
            grid_mgr: "gm.example.com".to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_http_request_config_default() {
        let config = HttpRequestConfig::default();
        assert_eq!(config.wapi_version, DEFAULT_WAPI_VERSION);
        assert!(config.ssl_verify);
        assert_eq!(config.timeout, None);
        assert!(config.default_headers.contains_key("User-Agent"));
    }

    #[test]
    fn test_base_url() {
        let mut config = config();
        assert_eq!(config.base_url(), "https://gm.example.com/wapi/v2.12/");
        config.wapi_version = "v2.10".to_string();
        assert_eq!(config.base_url(), "https://gm.example.com/wapi/v2.10/");
    }

    #[test]
    fn test_debug_hides_password() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("admin"));
    }

    #[test]
    fn test_endpoint_keeps_object_references() {
        let transport = HttpTransport::new(config()).unwrap();
        assert_eq!(transport.grid_mgr(), "gm.example.com");
        assert_eq!(
            transport.endpoint("record:a").unwrap().as_str(),
            "https://gm.example.com/wapi/v2.12/record:a"
        );
        assert_eq!(
            transport
                .endpoint("csvimporttask/ZG5zLmNzdl9pbXBvcnQ:1")
                .unwrap()
                .as_str(),
            "https://gm.example.com/wapi/v2.12/csvimporttask/ZG5zLmNzdl9pbXBvcnQ:1"
        );
    }
}
