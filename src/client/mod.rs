//! HTTP plumbing between the console and the backend REST API.

pub mod envelope;
pub mod interceptor;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

pub use envelope::{decode_paged, decode_response, expect_data, expect_success, ApiEnvelope, ApiErrorBody, Page, PagedEnvelope};
pub use interceptor::{send_with_single_retry, AuthInterceptor};
pub use transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport};

use crate::config::Endpoints;
use crate::error::AppResult;
use crate::identity::SessionManager;

/// Handle the typed API modules call through. Every request it sends passes
/// the [`AuthInterceptor`].
#[derive(Clone)]
pub struct ApiClient {
    http: Arc<AuthInterceptor>,
    endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(http: Arc<AuthInterceptor>) -> Self {
        let endpoints = http.session().endpoints().clone();
        Self { http, endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints { &self.endpoints }

    pub fn session(&self) -> &Arc<SessionManager> { self.http.session() }

    pub async fn send(&self, request: ApiRequest) -> AppResult<ApiResponse> { self.http.send(request).await }
}
