use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::{decode_paged, expect_success, ApiClient, ApiRequest, Page};
use crate::error::AppResult;

/// Row of the admin user list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Single-role shape used by some list responses.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub email_confirmed: bool,
    #[serde(default)]
    pub lockout_end: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl UserSummary {
    /// Primary role, whichever shape the backend sent.
    pub fn primary_role(&self) -> Option<&str> {
        self.role.as_deref().or_else(|| self.roles.first().map(String::as_str))
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.role.as_deref() == Some(name) || self.roles.iter().any(|r| r == name)
    }

    pub fn display_name(&self) -> String {
        if let Some(full) = self.full_name.as_deref().filter(|s| !s.is_empty()) {
            return full.to_string();
        }
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()].into_iter().flatten().collect();
        if parts.is_empty() { self.email.clone() } else { parts.join(" ") }
    }
}

pub async fn list_users(client: &ApiClient, page: u32, page_size: u32, search: Option<&str>) -> AppResult<Page<UserSummary>> {
    let mut req = ApiRequest::get(format!("{}/all", client.endpoints().users_dashboard))
        .query("page", page)
        .query("pageSize", page_size);
    if let Some(s) = search.map(str::trim).filter(|s| !s.is_empty()) {
        req = req.query("search", s);
    }
    decode_paged(client.send(req).await?)
}

/// Users hold a single role; this replaces it.
pub async fn update_user_role(client: &ApiClient, user_id: i64, role_name: &str) -> AppResult<()> {
    let req = ApiRequest::put(format!("{}/{}/roles", client.endpoints().users_dashboard, user_id))
        .json(&serde_json::json!({ "roleName": role_name }))?;
    expect_success(client.send(req).await?)?;
    info!(target: "nyc360::admin", "user {} now has role {}", user_id, role_name);
    Ok(())
}

pub async fn delete_user(client: &ApiClient, user_id: i64) -> AppResult<()> {
    let req = ApiRequest::delete(format!("{}/delete/{}", client.endpoints().users_dashboard, user_id));
    expect_success(client.send(req).await?)?;
    info!(target: "nyc360::admin", "deleted user {}", user_id);
    Ok(())
}
