use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use super::repo_types::VideoRow;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 2048, message = "Video URL is required"))]
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 60))]
    pub category: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideoRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    #[validate(length(max = 5000))]
    pub description: Option<Option<String>>,
    #[validate(length(min = 1, max = 2048))]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    pub thumbnail_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    #[validate(length(min = 1, max = 60))]
    pub category: Option<Option<String>>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoFilter {
    pub published: Option<bool>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub category: Option<String>,
    pub is_published: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<VideoRow> for VideoResponse {
    fn from(r: VideoRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            url: r.url,
            thumbnail_url: r.thumbnail_url,
            category: r.category,
            is_published: r.is_published,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
