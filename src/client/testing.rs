//! Scripted transport for unit tests: answers each request from a closure and
//! records everything it was asked to send.

use async_trait::async_trait;
use parking_lot::Mutex;

use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::error::AppResult;

type Handler = Box<dyn Fn(&ApiRequest) -> AppResult<ApiResponse> + Send + Sync>;

pub struct ScriptedTransport {
    handler: Handler,
    sent: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&ApiRequest) -> AppResult<ApiResponse> + Send + Sync + 'static,
    {
        Self { handler: Box::new(handler), sent: Mutex::new(Vec::new()) }
    }

    pub fn sent(&self) -> Vec<ApiRequest> { self.sent.lock().clone() }

    pub fn count_path(&self, path: &str) -> usize {
        self.sent.lock().iter().filter(|r| r.path == path).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        self.sent.lock().push(request.clone());
        (self.handler)(&request)
    }
}
