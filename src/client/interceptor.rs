//! Bearer attachment and the refresh-then-retry-once protocol applied to every
//! outbound API call.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::config::Endpoints;
use crate::error::AppResult;
use crate::identity::SessionManager;

/// Dispatch `request` through `attempt`, calling it at most twice.
///
/// The first attempt carries `token` when present. If it comes back 401 and
/// the request is not `exempt`, `reauthorize` is awaited once; a new token
/// re-dispatches the original request with it and that outcome is final.
/// No new token means the first 401 is returned unchanged.
pub async fn send_with_single_retry<A, AFut, R, RFut>(
    request: &ApiRequest,
    token: Option<String>,
    exempt: bool,
    attempt: A,
    reauthorize: R,
) -> AppResult<ApiResponse>
where
    A: Fn(ApiRequest) -> AFut,
    AFut: Future<Output = AppResult<ApiResponse>>,
    R: FnOnce() -> RFut,
    RFut: Future<Output = Option<String>>,
{
    let first_request = match token.as_deref() {
        Some(t) => request.with_bearer(t),
        None => request.clone(),
    };
    let first = attempt(first_request).await?;
    if !first.is_unauthorized() || exempt {
        return Ok(first);
    }
    match reauthorize().await {
        Some(fresh) => attempt(request.with_bearer(&fresh)).await,
        None => Ok(first),
    }
}

pub struct AuthInterceptor {
    inner: Arc<dyn Transport>,
    session: Arc<SessionManager>,
    endpoints: Endpoints,
}

impl AuthInterceptor {
    pub fn new(inner: Arc<dyn Transport>, session: Arc<SessionManager>) -> Self {
        let endpoints = session.endpoints().clone();
        Self { inner, session, endpoints }
    }

    pub fn session(&self) -> &Arc<SessionManager> { &self.session }

    /// Refresh with whatever pair is stored right now. On failure the session
    /// is signed out and no token is returned.
    async fn reauthorize(&self) -> Option<String> {
        let (Some(access), Some(refresh)) = (self.session.get_token(), self.session.get_refresh_token()) else {
            debug!(target: "nyc360::http", "401 without a stored token pair; not refreshing");
            return None;
        };
        match self.session.refresh(&access, &refresh).await {
            Ok(pair) => {
                info!(target: "nyc360::http", "access token refreshed; retrying request");
                Some(pair.access_token)
            }
            Err(e) => {
                warn!(target: "nyc360::http", "token refresh failed ({}); signing out", e);
                // A refreshed pair that could not be installed has already signed out.
                if self.session.is_logged_in() || self.session.get_token().is_some() {
                    self.session.logout();
                }
                None
            }
        }
    }

    pub async fn send(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!(
            target: "nyc360::http",
            "api_request",
            %request_id,
            method = request.method.as_str(),
            path = %request.path
        );
        let exempt = self.endpoints.is_retry_exempt(&request.path);
        let token = self.session.get_token();
        let inner = Arc::clone(&self.inner);
        send_with_single_retry(
            &request,
            token,
            exempt,
            move |req| {
                let inner = Arc::clone(&inner);
                async move { inner.send(req).await }
            },
            move || self.reauthorize(),
        )
        .instrument(span)
        .await
    }
}

#[async_trait]
impl Transport for AuthInterceptor {
    async fn send(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        AuthInterceptor::send(self, request).await
    }
}

#[cfg(test)]
#[path = "interceptor_tests.rs"]
mod interceptor_tests;
