use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use super::repo_types::TestimonialRow;

fn default_rating() -> i32 {
    5
}

/// Image fields are opaque strings (URLs or data URLs).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestimonialRequest {
    #[validate(length(min = 1, max = 120, message = "Client name is required"))]
    pub client_name: String,
    #[validate(length(min = 1, max = 5000, message = "Content is required"))]
    pub content: String,
    #[serde(default = "default_rating")]
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub before_image: Option<String>,
    #[serde(default)]
    pub after_image: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTestimonialRequest {
    #[validate(length(min = 1, max = 120))]
    pub client_name: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub content: Option<String>,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i32>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    pub avatar_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    pub before_image: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    pub after_image: Option<Option<String>>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TestimonialFilter {
    pub published: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialResponse {
    pub id: Uuid,
    pub client_name: String,
    pub content: String,
    pub rating: i32,
    pub avatar_url: Option<String>,
    pub before_image: Option<String>,
    pub after_image: Option<String>,
    pub is_published: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<TestimonialRow> for TestimonialResponse {
    fn from(r: TestimonialRow) -> Self {
        Self {
            id: r.id,
            client_name: r.client_name,
            content: r.content,
            rating: r.rating,
            avatar_url: r.avatar_url,
            before_image: r.before_image,
            after_image: r.after_image,
            is_published: r.is_published,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
