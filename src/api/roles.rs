use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::{decode_response, expect_success, ApiClient, ApiRequest};
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

pub async fn list_roles(client: &ApiClient) -> AppResult<Vec<Role>> {
    let req = ApiRequest::get(format!("{}/all", client.endpoints().roles_dashboard));
    Ok(decode_response::<Vec<Role>>(client.send(req).await?)?.into_result()?.unwrap_or_default())
}

/// The backend refuses to delete a role still assigned to users; that
/// rejection comes back as its message.
pub async fn delete_role(client: &ApiClient, role_id: i64) -> AppResult<()> {
    let req = ApiRequest::delete(format!("{}/delete/{}", client.endpoints().roles_dashboard, role_id));
    expect_success(client.send(req).await?)?;
    info!(target: "nyc360::admin", "deleted role {}", role_id);
    Ok(())
}
