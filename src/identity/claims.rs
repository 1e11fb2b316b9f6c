//! Access-token claim decoding.
//!
//! Tokens are compact JWTs. Only the payload segment is read; the signature is
//! the backend's concern. Each logical claim is looked up through a fixed alias
//! table, short key first, then the legacy long-form claim URIs the backend
//! has issued in the past.

use std::collections::BTreeSet;

use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use super::principal::{Identity, RoleClaim};

pub const EMAIL_KEYS: &[&str] = &[
    "email",
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress",
];

pub const ROLE_KEYS: &[&str] = &[
    "role",
    "http://schemas.microsoft.com/ws/2008/06/identity/claims/role",
];

pub const USERNAME_KEYS: &[&str] = &[
    "username",
    "unique_name",
    "sub",
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name",
];

pub const PERMISSION_KEYS: &[&str] = &["permissions", "Permissions"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    #[error("token is not a three-part compact JWT")]
    Structure,
    #[error("token payload is not valid base64url: {0}")]
    Encoding(String),
    #[error("token payload is not a JSON object")]
    Payload,
    #[error("required claim '{0}' is missing")]
    MissingClaim(&'static str),
    #[error("claim '{0}' has an unexpected shape")]
    InvalidClaim(&'static str),
}

/// First alias present in the claim set.
fn lookup<'a>(claims: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| claims.get(*k).filter(|v| !v.is_null()))
}

fn string_claim(claims: &Map<String, Value>, keys: &[&str], name: &'static str) -> Result<Option<String>, ClaimError> {
    match lookup(claims, keys) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ClaimError::InvalidClaim(name)),
    }
}

fn string_list(v: &Value, name: &'static str) -> Result<Vec<String>, ClaimError> {
    match v {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|i| i.as_str().map(str::to_string).ok_or(ClaimError::InvalidClaim(name)))
            .collect(),
        _ => Err(ClaimError::InvalidClaim(name)),
    }
}

/// Decode the payload segment of a compact JWT into its JSON claim map.
pub fn decode_payload(token: &str) -> Result<Map<String, Value>, ClaimError> {
    let parts: Vec<&str> = token.trim().split('.').collect();
    if parts.len() != 3 || parts[1].is_empty() {
        return Err(ClaimError::Structure);
    }
    // Some issuers pad the segment; the URL-safe engine here does not accept padding.
    let segment = parts[1].trim_end_matches('=');
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| ClaimError::Encoding(e.to_string()))?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(ClaimError::Payload),
    }
}

/// Build an [`Identity`] from an access token.
pub fn decode_identity(token: &str) -> Result<Identity, ClaimError> {
    let claims = decode_payload(token)?;

    let email = string_claim(&claims, EMAIL_KEYS, "email")?.ok_or(ClaimError::MissingClaim("email"))?;

    let role = match lookup(&claims, ROLE_KEYS) {
        None => RoleClaim::default(),
        Some(Value::String(s)) => RoleClaim::Single(s.clone()),
        Some(v @ Value::Array(_)) => RoleClaim::Many(string_list(v, "role")?),
        Some(_) => return Err(ClaimError::InvalidClaim("role")),
    };

    let username = string_claim(&claims, USERNAME_KEYS, "username")?;

    let permissions: BTreeSet<String> = match lookup(&claims, PERMISSION_KEYS) {
        None => BTreeSet::new(),
        Some(v) => string_list(v, "permissions")?.into_iter().collect(),
    };

    let expires_at = match claims.get("exp") {
        None | Some(Value::Null) => None,
        Some(v) => {
            // NumericDate may carry a fraction; whole seconds are enough here.
            let secs = v
                .as_i64()
                .or_else(|| v.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .ok_or(ClaimError::InvalidClaim("exp"))?;
            Some(DateTime::<Utc>::from_timestamp(secs, 0).ok_or(ClaimError::InvalidClaim("exp"))?)
        }
    };

    Ok(Identity { email, role, username, permissions, expires_at })
}

/// Unsigned token carrying `claims`, for tests and local fixtures.
pub fn encode_unsigned(claims: &Value) -> String {
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = engine.encode(claims.to_string().as_bytes());
    format!("{}.{}.sig", header, payload)
}
