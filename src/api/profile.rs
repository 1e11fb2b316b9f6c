use serde::{Deserialize, Serialize};

use crate::client::{expect_data, expect_success, ApiClient, ApiRequest};
use crate::error::AppResult;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_two_factor_enabled: bool,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .iter()
            .flatten()
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Public profile by username; the name is percent-encoded into the path.
pub async fn get_profile(client: &ApiClient, username: &str) -> AppResult<UserProfile> {
    let path = format!("{}/profile/{}", client.endpoints().users, urlencoding::encode(username));
    expect_data(client.send(ApiRequest::get(path)).await?)
}

pub async fn toggle_two_factor(client: &ApiClient, enable: bool) -> AppResult<()> {
    let path = format!("{}/me/toggle-2fa", client.endpoints().users);
    let req = ApiRequest::post(path).json(&serde_json::json!({ "enable": enable }))?;
    expect_success(client.send(req).await?)
}
