use super::*;
use crate::client::testing::ScriptedTransport;
use crate::config::ConsoleConfig;
use crate::error::AppError;
use crate::identity::{encode_unsigned, MemoryTokenStore, TokenStore};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

fn token(email: &str, generation: u32) -> String {
    encode_unsigned(&json!({ "email": email, "role": "User", "gen": generation }))
}

struct Harness {
    transport: Arc<ScriptedTransport>,
    store: Arc<MemoryTokenStore>,
    session: Arc<SessionManager>,
    interceptor: AuthInterceptor,
}

fn harness<F>(handler: F, access: Option<&str>, refresh: Option<&str>) -> Harness
where
    F: Fn(&ApiRequest) -> AppResult<ApiResponse> + Send + Sync + 'static,
{
    let transport = Arc::new(ScriptedTransport::new(handler));
    let store = Arc::new(MemoryTokenStore::new());
    if let Some(a) = access {
        store.set("nyc360_token", a).unwrap();
    }
    if let Some(r) = refresh {
        store.set("nyc360_refresh_token", r).unwrap();
    }
    let session = Arc::new(SessionManager::new(transport.clone(), store.clone(), &ConsoleConfig::default()));
    let interceptor = AuthInterceptor::new(transport.clone(), session.clone());
    Harness { transport, store, session, interceptor }
}

fn unauthorized() -> AppResult<ApiResponse> {
    Ok(ApiResponse::new(401, json!({ "isSuccess": false, "data": null, "error": { "code": "Unauthorized", "message": "expired" } })))
}

#[tokio::test]
async fn attaches_bearer_when_token_present() {
    let t1 = token("a@b.com", 1);
    let h = harness(|_| Ok(ApiResponse::new(200, json!({"isSuccess": true}))), Some(&t1), Some("R1"));
    let resp = h.interceptor.send(ApiRequest::get("/posts/list")).await.unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(h.transport.sent()[0].bearer.as_deref(), Some(t1.as_str()));
}

#[tokio::test]
async fn sends_unmodified_without_token() {
    let h = harness(|_| Ok(ApiResponse::new(200, json!({"isSuccess": true}))), None, None);
    h.interceptor.send(ApiRequest::get("/posts/list")).await.unwrap();
    assert!(h.transport.sent()[0].bearer.is_none());
}

#[tokio::test]
async fn refreshes_once_and_retries_with_new_token() {
    let t1 = token("a@b.com", 1);
    let t2 = token("a@b.com", 2);
    let t2c = t2.clone();
    let h = harness(
        move |req| {
            if req.path == "/auth/refresh-token" {
                let body = req.body.as_ref().unwrap();
                assert_eq!(body["refreshToken"], "R1");
                return Ok(ApiResponse::new(200, json!({ "isSuccess": true, "data": { "accessToken": t2c, "refreshToken": "R2" } })));
            }
            if req.bearer.as_deref() == Some(t2c.as_str()) {
                Ok(ApiResponse::new(200, json!({ "isSuccess": true, "data": [1, 2, 3] })))
            } else {
                unauthorized()
            }
        },
        Some(&t1),
        Some("R1"),
    );

    let resp = h.interceptor.send(ApiRequest::get("/users-dashboard/all")).await.unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["data"], json!([1, 2, 3]));
    assert_eq!(h.transport.count_path("/auth/refresh-token"), 1);
    assert_eq!(h.transport.count_path("/users-dashboard/all"), 2);
    let sent = h.transport.sent();
    assert_eq!(sent.last().unwrap().bearer.as_deref(), Some(t2.as_str()));
    assert_eq!(h.session.get_token(), Some(t2));
    assert_eq!(h.session.get_refresh_token().as_deref(), Some("R2"));
}

#[tokio::test]
async fn retry_outcome_is_final_even_when_it_fails() {
    let t1 = token("a@b.com", 1);
    let t2 = token("a@b.com", 2);
    let h = harness(
        move |req| {
            if req.path == "/auth/refresh-token" {
                return Ok(ApiResponse::new(200, json!({ "isSuccess": true, "data": { "accessToken": t2, "refreshToken": "R2" } })));
            }
            unauthorized()
        },
        Some(&t1),
        Some("R1"),
    );
    let resp = h.interceptor.send(ApiRequest::get("/roles-dashboard/all")).await.unwrap();
    assert_eq!(resp.status, 401);
    assert_eq!(h.transport.count_path("/auth/refresh-token"), 1);
    assert_eq!(h.transport.count_path("/roles-dashboard/all"), 2);
}

#[tokio::test]
async fn logical_refresh_failure_logs_out_and_returns_original_401() {
    let t1 = token("a@b.com", 1);
    let h = harness(
        |req| {
            if req.path == "/auth/refresh-token" {
                return Ok(ApiResponse::new(200, json!({ "isSuccess": false, "data": null, "error": { "code": "Auth.RefreshExpired", "message": "refresh expired" } })));
            }
            unauthorized()
        },
        Some(&t1),
        Some("R1"),
    );
    let mut nav = h.session.navigation();
    let resp = h.interceptor.send(ApiRequest::get("/users-dashboard/all")).await.unwrap();
    assert_eq!(resp.status, 401);
    assert_eq!(resp.body["error"]["message"], "expired");
    assert!(h.store.get("nyc360_token").is_none());
    assert!(h.store.get("nyc360_refresh_token").is_none());
    assert!(!h.session.is_logged_in());
    assert_eq!(nav.recv().await.unwrap(), crate::identity::Navigation::Login);
    assert_eq!(h.transport.count_path("/users-dashboard/all"), 1);
}

#[tokio::test]
async fn transport_refresh_failure_logs_out_and_returns_original_401() {
    let t1 = token("a@b.com", 1);
    let h = harness(
        |req| {
            if req.path == "/auth/refresh-token" {
                return Err(AppError::network("connect_failed", "refused"));
            }
            unauthorized()
        },
        Some(&t1),
        Some("R1"),
    );
    let resp = h.interceptor.send(ApiRequest::get("/posts/list")).await.unwrap();
    assert_eq!(resp.status, 401);
    assert!(!h.session.is_logged_in());
}

#[tokio::test]
async fn unreadable_refreshed_token_signs_out_once() {
    let t1 = token("a@b.com", 1);
    let h = harness(
        |req| {
            if req.path == "/auth/refresh-token" {
                return Ok(ApiResponse::new(200, json!({ "isSuccess": true, "data": { "accessToken": "garbage", "refreshToken": "R2" } })));
            }
            unauthorized()
        },
        Some(&t1),
        Some("R1"),
    );
    let mut nav = h.session.navigation();
    let resp = h.interceptor.send(ApiRequest::get("/posts/list")).await.unwrap();
    assert_eq!(resp.status, 401);
    assert!(!h.session.is_logged_in());
    assert!(h.store.get("nyc360_token").is_none());
    assert_eq!(nav.recv().await.unwrap(), crate::identity::Navigation::Login);
    assert!(matches!(nav.try_recv(), Err(tokio::sync::broadcast::error::TryRecvError::Empty)));
}

#[tokio::test]
async fn exempt_endpoints_propagate_401_without_refresh() {
    let t1 = token("a@b.com", 1);
    let h = harness(|_| unauthorized(), Some(&t1), Some("R1"));
    let resp = h.interceptor.send(ApiRequest::post("/auth/login")).await.unwrap();
    assert_eq!(resp.status, 401);
    let resp = h.interceptor.send(ApiRequest::post("/auth/refresh-token")).await.unwrap();
    assert_eq!(resp.status, 401);
    assert_eq!(h.transport.sent().len(), 2);
    assert!(h.session.is_logged_in());
}

#[tokio::test]
async fn missing_refresh_token_skips_refresh() {
    let t1 = token("a@b.com", 1);
    let h = harness(|_| unauthorized(), Some(&t1), None);
    let resp = h.interceptor.send(ApiRequest::get("/posts/list")).await.unwrap();
    assert_eq!(resp.status, 401);
    assert_eq!(h.transport.sent().len(), 1);
    // no refresh attempted, so no forced sign-out either
    assert!(h.session.is_logged_in());
}

#[tokio::test]
async fn non_auth_errors_are_not_retried() {
    let t1 = token("a@b.com", 1);
    let h = harness(|_| Ok(ApiResponse::new(500, json!("boom"))), Some(&t1), Some("R1"));
    let resp = h.interceptor.send(ApiRequest::get("/posts/list")).await.unwrap();
    assert_eq!(resp.status, 500);
    assert_eq!(h.transport.sent().len(), 1);

    let h = harness(|_| Err(AppError::network("connect_failed", "refused")), Some(&t1), Some("R1"));
    let err = h.interceptor.send(ApiRequest::get("/posts/list")).await.unwrap_err();
    assert!(matches!(err, AppError::Network { .. }));
    assert_eq!(h.transport.sent().len(), 1);
}

#[tokio::test]
async fn single_retry_helper_calls_attempt_at_most_twice() {
    let calls = AtomicUsize::new(0);
    let reauths = AtomicUsize::new(0);
    let resp = send_with_single_retry(
        &ApiRequest::get("/x"),
        Some("old".to_string()),
        false,
        |req| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                assert!(req.bearer.is_some());
                Ok(ApiResponse::new(401, serde_json::Value::Null))
            }
        },
        || {
            reauths.fetch_add(1, Ordering::SeqCst);
            async { Some("new".to_string()) }
        },
    )
    .await
    .unwrap();
    assert_eq!(resp.status, 401);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(reauths.load(Ordering::SeqCst), 1);
}
