use super::*;

#[test]
fn http_status_mapping() {
    assert_eq!(AppError::network("network_error", "down").http_status(), 503);
    assert_eq!(AppError::rejected("DuplicateEmail", "taken").http_status(), 400);
    assert_eq!(AppError::unauthorized("unauthorized", "no").http_status(), 401);
    assert_eq!(AppError::http("http_404", "missing").http_status(), 404);
    assert_eq!(AppError::http("weird", "?").http_status(), 502);
    assert_eq!(AppError::credential("malformed_token", "bad").http_status(), 401);
    assert_eq!(AppError::user("bad_input", "oops").http_status(), 400);
    assert_eq!(AppError::internal("internal", "panic").http_status(), 500);
}

#[test]
fn user_message_hides_transport_details() {
    let e = AppError::network("connect_failed", "tcp connect error: refused");
    assert_eq!(e.user_message(), NETWORK_ERROR_MESSAGE);

    let e = AppError::rejected("Role.InUse", "Role is assigned to users");
    assert_eq!(e.user_message(), "Role is assigned to users");
}

#[test]
fn display_joins_code_and_message() {
    let e = AppError::rejected("Auth.Invalid", "Invalid credentials");
    assert_eq!(e.to_string(), "Auth.Invalid: Invalid credentials");
}

#[test]
fn auth_classification() {
    assert!(AppError::unauthorized("unauthorized", "x").is_auth());
    assert!(AppError::from(ClaimError::Structure).is_auth());
    assert!(!AppError::rejected("x", "y").is_auth());
}

#[test]
fn serializes_with_type_tag() {
    let v = serde_json::to_value(AppError::rejected("c", "m")).unwrap();
    assert_eq!(v["type"], "rejected");
    assert_eq!(v["code"], "c");
    assert_eq!(v["message"], "m");
}

#[test]
fn constructors_accept_mixed_code_and_message_types() {
    let e = AppError::user("usage", format!("usage: {}", "verify <code>"));
    assert_eq!(e.code_str(), "usage");
    assert_eq!(e.message(), "usage: verify <code>");
    let e = AppError::http(format!("http_{}", 418), "teapot");
    assert_eq!(e.http_status(), 418);
}
