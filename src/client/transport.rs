use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Outbound API call. Cloneable so it can be re-dispatched with a fresh credential.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new<S: Into<String>>(method: Method, path: S) -> Self {
        Self { method, path: path.into(), query: Vec::new(), body: None, bearer: None }
    }

    pub fn get<S: Into<String>>(path: S) -> Self { Self::new(Method::Get, path) }
    pub fn post<S: Into<String>>(path: S) -> Self { Self::new(Method::Post, path) }
    pub fn put<S: Into<String>>(path: S) -> Self { Self::new(Method::Put, path) }
    pub fn delete<S: Into<String>>(path: S) -> Self { Self::new(Method::Delete, path) }

    pub fn json<T: Serialize>(mut self, body: &T) -> AppResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn query<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Copy of this request carrying `token` as its bearer credential.
    pub fn with_bearer(&self, token: &str) -> Self {
        let mut out = self.clone();
        out.bearer = Some(token.to_string());
        out
    }
}

/// Any HTTP response, including non-success statuses.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self { Self { status, body } }
    pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }
    pub fn is_unauthorized(&self) -> bool { self.status == 401 }
}

/// Dispatches requests to the backend. `Err` means no response was received;
/// every HTTP status, 401 included, comes back as `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> AppResult<ApiResponse>;
}

#[derive(Clone)]
pub struct ReqwestTransport {
    base: String,
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new<S: Into<String>>(base: S, timeout: Option<Duration>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::config("http_client".to_string(), e.to_string()))?;
        Ok(Self { base: base.into(), client, timeout })
    }

    pub fn base(&self) -> &str { &self.base }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        let url = self.url_for(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            let mut headers = HeaderMap::new();
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| AppError::credential("malformed_token", "access token is not a valid header value"))?;
            headers.insert(AUTHORIZATION, value);
            builder = builder.headers(headers);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await?;
        // Empty or non-JSON bodies (e.g. a bare 401) become JSON null / a string.
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice::<Value>(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        debug!(target: "nyc360::http", "{} {} -> {}", request.method.as_str(), request.path, status);
        Ok(ApiResponse { status, body })
    }
}
