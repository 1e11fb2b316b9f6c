use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::{decode_response, expect_data, expect_success, ApiClient, ApiRequest};
use crate::error::AppResult;

/// Post and RSS categories as the backend numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostCategory {
    Art = 0,
    Community = 1,
    Culture = 2,
    Education = 3,
    Events = 4,
    Lifestyle = 5,
    Media = 6,
    News = 7,
    Recruitment = 8,
    Social = 9,
    Tv = 10,
}

impl PostCategory {
    pub const ALL: [PostCategory; 11] = [
        PostCategory::Art,
        PostCategory::Community,
        PostCategory::Culture,
        PostCategory::Education,
        PostCategory::Events,
        PostCategory::Lifestyle,
        PostCategory::Media,
        PostCategory::News,
        PostCategory::Recruitment,
        PostCategory::Social,
        PostCategory::Tv,
    ];

    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| *c as i64 == id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PostCategory::Art => "Art",
            PostCategory::Community => "Community",
            PostCategory::Culture => "Culture",
            PostCategory::Education => "Education",
            PostCategory::Events => "Events",
            PostCategory::Lifestyle => "Lifestyle",
            PostCategory::Media => "Media",
            PostCategory::News => "News",
            PostCategory::Recruitment => "Recruitment",
            PostCategory::Social => "Social",
            PostCategory::Tv => "TV",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Post {
    pub fn category(&self) -> Option<PostCategory> { PostCategory::from_id(self.category) }
}

pub async fn list_posts(client: &ApiClient) -> AppResult<Vec<Post>> {
    let req = ApiRequest::get(format!("{}/list", client.endpoints().posts));
    Ok(decode_response::<Vec<Post>>(client.send(req).await?)?.into_result()?.unwrap_or_default())
}

pub async fn get_post(client: &ApiClient, post_id: i64) -> AppResult<Post> {
    let req = ApiRequest::get(format!("{}/{}", client.endpoints().posts_dashboard, post_id));
    expect_data(client.send(req).await?)
}

pub async fn delete_post(client: &ApiClient, post_id: i64) -> AppResult<()> {
    let req = ApiRequest::delete(format!("{}/delete", client.endpoints().posts_dashboard))
        .json(&serde_json::json!({ "postId": post_id }))?;
    expect_success(client.send(req).await?)?;
    info!(target: "nyc360::admin", "deleted post {}", post_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_ids() {
        assert_eq!(PostCategory::from_id(7), Some(PostCategory::News));
        assert_eq!(PostCategory::from_id(10).map(|c| c.name()), Some("TV"));
        assert_eq!(PostCategory::from_id(11), None);
    }
}
