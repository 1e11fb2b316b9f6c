//! Account lifecycle calls outside sign-in: registration, email confirmation,
//! password recovery and change. Each returns `Ok(())` on `isSuccess` and the
//! server's message verbatim otherwise.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::{expect_success, ApiClient, ApiRequest};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_organization: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub const MIN_PASSWORD_LEN: usize = 6;

static HAS_LOWER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]").expect("static regex"));
static HAS_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").expect("static regex"));

/// At least six characters including one lowercase letter and one digit.
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN || !HAS_LOWER.is_match(password) || !HAS_DIGIT.is_match(password) {
        return Err(AppError::user(
            "weak_password",
            "Password must be at least 6 characters and contain a lowercase letter and a digit.",
        ));
    }
    Ok(())
}

/// Emailed links carry tokens whose `+` arrives as a space once the query
/// string is decoded.
pub fn repair_link_token(token: &str) -> String { token.replace(' ', "+") }

/// Both link parameters are required; a missing one means a broken link.
pub fn link_params(email: Option<&str>, token: Option<&str>) -> AppResult<(String, String)> {
    match (email.map(str::trim).filter(|s| !s.is_empty()), token.filter(|s| !s.is_empty())) {
        (Some(e), Some(t)) => Ok((e.to_string(), repair_link_token(t))),
        _ => Err(AppError::user("invalid_link", "Invalid link. Email or token is missing.")),
    }
}

pub async fn register(client: &ApiClient, request: &RegisterRequest) -> AppResult<()> {
    validate_password(&request.password)?;
    let req = ApiRequest::post(client.endpoints().register.clone()).json(request)?;
    expect_success(client.send(req).await?)?;
    info!(target: "nyc360::account", "registered {}", request.email);
    Ok(())
}

pub async fn confirm_email(client: &ApiClient, email: &str, token: &str) -> AppResult<()> {
    let body = serde_json::json!({ "email": email, "token": repair_link_token(token) });
    let req = ApiRequest::post(client.endpoints().confirm_email.clone()).json(&body)?;
    expect_success(client.send(req).await?)
}

pub async fn forgot_password(client: &ApiClient, email: &str) -> AppResult<()> {
    if email.trim().is_empty() {
        return Err(AppError::user("missing_email", "Email is required."));
    }
    let req = ApiRequest::post(client.endpoints().forgot_password.clone())
        .json(&serde_json::json!({ "email": email.trim() }))?;
    expect_success(client.send(req).await?)
}

/// `confirm_password` must equal `request.new_password`; checked before sending.
pub async fn reset_password(client: &ApiClient, request: &ResetPasswordRequest, confirm_password: &str) -> AppResult<()> {
    if request.new_password != confirm_password {
        return Err(AppError::user("password_mismatch", "Passwords do not match."));
    }
    if request.new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::user("weak_password", "Password must be at least 6 characters."));
    }
    let body = ResetPasswordRequest { token: repair_link_token(&request.token), ..request.clone() };
    let req = ApiRequest::post(client.endpoints().password_reset.clone()).json(&body)?;
    expect_success(client.send(req).await?)
}

pub async fn change_password(client: &ApiClient, request: &ChangePasswordRequest) -> AppResult<()> {
    validate_password(&request.new_password)?;
    let req = ApiRequest::post(client.endpoints().change_password.clone()).json(request)?;
    expect_success(client.send(req).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_rule() {
        assert!(validate_password("abc123").is_ok());
        assert!(validate_password("ABC123").is_err());
        assert!(validate_password("abcdef").is_err());
        assert!(validate_password("ab1").is_err());
    }

    #[test]
    fn link_tokens_recover_plus_signs() {
        assert_eq!(repair_link_token("CfDJ8 abc def"), "CfDJ8+abc+def");
        let (e, t) = link_params(Some("a@b.com"), Some("x y")).unwrap();
        assert_eq!((e.as_str(), t.as_str()), ("a@b.com", "x+y"));
        assert_eq!(link_params(None, Some("t")).unwrap_err().code_str(), "invalid_link");
        assert_eq!(link_params(Some("a@b.com"), Some("")).unwrap_err().code_str(), "invalid_link");
    }
}
