//! Session & authorization state for one running console.
//!
//! A [`SessionManager`] is constructed once per process and handed to whatever
//! needs it (request interceptor, route guard, CLI). It owns the persisted token
//! pair and the identity decoded from the access token, and publishes every
//! identity change on a watch channel.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::authorizer;
use super::claims::decode_identity;
use super::principal::Identity;
use super::store::TokenStore;
use crate::client::envelope::decode_response;
use crate::client::transport::{ApiRequest, Transport};
use crate::config::{ConsoleConfig, Endpoints};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// `data` of a sign-in response. Tokens are absent when a second factor is pending.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInData {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    two_factor_required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated(Identity),
    /// Credentials accepted; a one-time code must be verified for `email`.
    TwoFactorRequired { email: String },
}

/// Where the UI should go after a session change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Login,
    Home,
}

pub struct SessionManager {
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
    endpoints: Endpoints,
    access_key: String,
    refresh_key: String,
    identity: watch::Sender<Option<Identity>>,
    navigation: broadcast::Sender<Navigation>,
}

impl SessionManager {
    /// Build the session and hydrate it from any previously persisted access token.
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn TokenStore>, cfg: &ConsoleConfig) -> Self {
        let (identity, _) = watch::channel(None);
        let (navigation, _) = broadcast::channel(16);
        let sm = Self {
            transport,
            store,
            endpoints: cfg.endpoints.clone(),
            access_key: cfg.access_token_key.clone(),
            refresh_key: cfg.refresh_token_key.clone(),
            identity,
            navigation,
        };
        sm.restore();
        sm
    }

    fn restore(&self) {
        let Some(token) = self.get_token() else {
            debug!(target: "nyc360::session", "no persisted access token");
            return;
        };
        match decode_identity(&token) {
            Ok(id) => {
                info!(target: "nyc360::session", "restored session for {}", id.email);
                self.identity.send_replace(Some(id));
            }
            Err(e) => {
                warn!(target: "nyc360::session", "persisted access token is unreadable ({}); signing out", e);
                self.logout();
            }
        }
    }

    pub fn endpoints(&self) -> &Endpoints { &self.endpoints }

    // --- observation ---

    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> { self.identity.subscribe() }

    pub fn navigation(&self) -> broadcast::Receiver<Navigation> { self.navigation.subscribe() }

    pub fn identity(&self) -> Option<Identity> { self.identity.borrow().clone() }

    // --- predicates ---

    pub fn is_logged_in(&self) -> bool { self.identity.borrow().is_some() }

    pub fn has_role(&self, name: &str) -> bool { authorizer::has_role(self.identity.borrow().as_ref(), name) }

    pub fn has_permission(&self, name: &str) -> bool {
        authorizer::has_permission(self.identity.borrow().as_ref(), name)
    }

    // --- raw token access ---

    pub fn get_token(&self) -> Option<String> {
        if !self.store.is_available() {
            return None;
        }
        self.store.get(&self.access_key).filter(|t| !t.is_empty())
    }

    pub fn get_refresh_token(&self) -> Option<String> {
        if !self.store.is_available() {
            return None;
        }
        self.store.get(&self.refresh_key).filter(|t| !t.is_empty())
    }

    // --- mutations ---

    /// Replace both tokens and the identity. A token that does not decode, or a
    /// pair that cannot be stored, signs the session out instead.
    fn install_tokens(&self, access: &str, refresh: &str) -> AppResult<Identity> {
        let identity = match decode_identity(access) {
            Ok(id) => id,
            Err(e) => {
                warn!(target: "nyc360::session", "issued access token is unreadable ({}); signing out", e);
                self.logout();
                return Err(e.into());
            }
        };
        if !self.store.is_available() {
            debug!(target: "nyc360::session", "no client-side storage; tokens for {} not kept", identity.email);
            return Ok(identity);
        }
        if let Err(e) = self.store.set_many(&[(self.access_key.as_str(), access), (self.refresh_key.as_str(), refresh)]) {
            warn!(target: "nyc360::session", "could not store tokens for {} ({}); signing out", identity.email, e);
            self.logout();
            return Err(e);
        }
        self.identity.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_in(&self, request: ApiRequest, email_hint: Option<&str>) -> AppResult<LoginOutcome> {
        let resp = self.transport.send(request).await?;
        let envelope = decode_response::<SignInData>(resp)?;
        let data = envelope.into_result()?.unwrap_or_default();
        match (data.access_token, data.refresh_token) {
            (Some(access), Some(refresh)) if !data.two_factor_required && !access.is_empty() => {
                let identity = self.install_tokens(&access, &refresh)?;
                info!(target: "nyc360::session", "signed in as {}", identity.email);
                let _ = self.navigation.send(Navigation::Home);
                Ok(LoginOutcome::Authenticated(identity))
            }
            _ if !data.two_factor_required => {
                warn!(target: "nyc360::session", "sign-in succeeded without issuing tokens");
                Err(AppError::rejected("missing_tokens", "Sign-in succeeded but no session was issued."))
            }
            _ => {
                let email = email_hint.unwrap_or_default().to_string();
                info!(target: "nyc360::session", "second factor required for {}", email);
                Ok(LoginOutcome::TwoFactorRequired { email })
            }
        }
    }

    pub async fn login(&self, credentials: &LoginRequest) -> AppResult<LoginOutcome> {
        let request = ApiRequest::post(self.endpoints.login.clone()).json(credentials)?;
        self.sign_in(request, Some(&credentials.email)).await
    }

    pub async fn verify_two_factor(&self, email: &str, code: &str) -> AppResult<LoginOutcome> {
        let request = ApiRequest::post(self.endpoints.two_factor_verify.clone())
            .json(&serde_json::json!({ "email": email, "code": code }))?;
        match self.sign_in(request, Some(email)).await? {
            LoginOutcome::Authenticated(id) => Ok(LoginOutcome::Authenticated(id)),
            LoginOutcome::TwoFactorRequired { .. } => Err(AppError::rejected(
                "two_factor_incomplete",
                "Verification succeeded but no session was issued.",
            )),
        }
    }

    /// Exchange a third-party identity token (Google) for local tokens.
    pub async fn login_with_external_provider(&self, provider_token: &str) -> AppResult<LoginOutcome> {
        let request = ApiRequest::post(self.endpoints.external_google.clone())
            .json(&serde_json::json!({ "idToken": provider_token }))?;
        self.sign_in(request, None).await
    }

    /// Trade the current pair for a new one. Failure is returned to the
    /// caller; deciding to sign out is theirs.
    pub async fn refresh(&self, access_token: &str, refresh_token: &str) -> AppResult<TokenPair> {
        let body = TokenPair { access_token: access_token.to_string(), refresh_token: refresh_token.to_string() };
        let request = ApiRequest::post(self.endpoints.refresh_token.clone()).json(&body)?;
        let resp = self.transport.send(request).await?;
        let pair = decode_response::<TokenPair>(resp)?
            .into_result()?
            .ok_or_else(|| AppError::rejected("refresh_failed", "Token refresh returned no tokens."))?;
        let identity = self.install_tokens(&pair.access_token, &pair.refresh_token)?;
        debug!(target: "nyc360::session", "refreshed tokens for {}", identity.email);
        Ok(pair)
    }

    /// Clear both tokens and the identity, then ask the UI to show the login view.
    /// Safe to call when already signed out.
    pub fn logout(&self) {
        if let Err(e) = self.store.remove(&self.access_key) {
            warn!(target: "nyc360::session", "failed to clear access token: {}", e);
        }
        if let Err(e) = self.store.remove(&self.refresh_key) {
            warn!(target: "nyc360::session", "failed to clear refresh token: {}", e);
        }
        let previous = self.identity.send_replace(None);
        if let Some(id) = previous {
            info!(target: "nyc360::session", "signed out {}", id.email);
        }
        // No receivers is fine: nothing is listening for navigation.
        let _ = self.navigation.send(Navigation::Login);
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
