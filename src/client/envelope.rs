//! The backend's uniform response envelope and its mapping onto [`AppResult`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::transport::ApiResponse;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    pub is_success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

impl<T> ApiEnvelope<T> {
    pub fn rejection(&self) -> AppError {
        match &self.error {
            Some(e) => AppError::rejected(e.code.clone(), e.message.clone()),
            None => AppError::rejected("request_failed", "The request was not successful."),
        }
    }

    /// Payload of a successful envelope; `Rejected` otherwise. A success with
    /// no payload is `Ok(None)`.
    pub fn into_result(self) -> AppResult<Option<T>> {
        if self.is_success {
            Ok(self.data)
        } else {
            Err(self.rejection())
        }
    }
}

/// List envelope with paging metadata next to `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedEnvelope<T> {
    pub is_success: bool,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u32,
}

impl<T> PagedEnvelope<T> {
    pub fn into_page(self) -> AppResult<Page<T>> {
        if !self.is_success {
            return Err(match self.error {
                Some(e) => AppError::rejected(e.code, e.message),
                None => AppError::rejected("request_failed", "The request was not successful."),
            });
        }
        Ok(Page {
            items: self.data,
            page: self.page,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
        })
    }
}

/// Map status and body onto a typed result.
///
/// 401 is `Unauthorized`. Any status whose body parses as an envelope is
/// judged by `isSuccess` (the backend sends 400s with a populated `error`).
/// Anything else non-2xx is `Http`.
pub fn decode_response<T: DeserializeOwned>(resp: ApiResponse) -> AppResult<ApiEnvelope<T>> {
    if resp.is_unauthorized() {
        return Err(unauthorized_from(&resp.body));
    }
    match serde_json::from_value::<ApiEnvelope<T>>(resp.body.clone()) {
        Ok(env) => Ok(env),
        Err(e) if resp.is_success() => Err(AppError::internal(
            "unexpected_response".to_string(),
            format!("response did not match the expected shape: {}", e),
        )),
        Err(_) => Err(http_error(&resp)),
    }
}

pub fn decode_paged<T: DeserializeOwned>(resp: ApiResponse) -> AppResult<Page<T>> {
    if resp.is_unauthorized() {
        return Err(unauthorized_from(&resp.body));
    }
    match serde_json::from_value::<PagedEnvelope<T>>(resp.body.clone()) {
        Ok(env) => env.into_page(),
        Err(e) if resp.is_success() => Err(AppError::internal(
            "unexpected_response".to_string(),
            format!("response did not match the expected shape: {}", e),
        )),
        Err(_) => Err(http_error(&resp)),
    }
}

/// Shortcut for endpoints whose payload is required.
pub fn expect_data<T: DeserializeOwned>(resp: ApiResponse) -> AppResult<T> {
    decode_response::<T>(resp)?
        .into_result()?
        .ok_or_else(|| AppError::internal("missing_data", "successful response carried no data"))
}

/// Shortcut for endpoints where only success matters.
pub fn expect_success(resp: ApiResponse) -> AppResult<()> {
    decode_response::<Value>(resp)?.into_result().map(|_| ())
}

fn unauthorized_from(body: &Value) -> AppError {
    let message = body
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("Your session has expired. Please log in again.");
    AppError::unauthorized("unauthorized", message)
}

fn http_error(resp: &ApiResponse) -> AppError {
    let detail = match &resp.body {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    AppError::http(format!("http_{}", resp.status), format!("HTTP {} {}", resp.status, detail).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_yields_data() {
        let resp = ApiResponse::new(200, json!({"isSuccess": true, "data": {"n": 1}, "error": null}));
        let v: Value = expect_data(resp).unwrap();
        assert_eq!(v["n"], 1);
    }

    #[test]
    fn logical_failure_is_verbatim() {
        let resp = ApiResponse::new(400, json!({"isSuccess": false, "data": null, "error": {"code": "User.DuplicateEmail", "message": "Email already exists"}}));
        let err = expect_success(resp).unwrap_err();
        assert_eq!(err, AppError::rejected("User.DuplicateEmail", "Email already exists"));
    }

    #[test]
    fn unauthorized_and_http_errors() {
        let err = expect_success(ApiResponse::new(401, Value::Null)).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
        let err = expect_success(ApiResponse::new(500, json!("boom"))).unwrap_err();
        assert_eq!(err.code_str(), "http_500");
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn success_without_payload() {
        let resp = ApiResponse::new(200, json!({"isSuccess": true}));
        assert!(decode_response::<Value>(resp).unwrap().into_result().unwrap().is_none());
        let resp = ApiResponse::new(200, json!({"isSuccess": true}));
        assert_eq!(expect_data::<Value>(resp).unwrap_err().code_str(), "missing_data");
    }

    #[test]
    fn paged_metadata() {
        let resp = ApiResponse::new(200, json!({
            "isSuccess": true, "data": [1, 2], "page": 1, "pageSize": 2, "totalCount": 9, "totalPages": 5, "error": null
        }));
        let page: Page<u32> = decode_paged(resp).unwrap();
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.total_count, 9);
        assert_eq!(page.total_pages, 5);
    }
}
