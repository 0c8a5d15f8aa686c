use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use super::repo_types::HomeContentRow;

/// Partial content; `heroTitle` becomes mandatory only when no row exists yet.
/// Every other field can be cleared with an explicit `null`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HomeContentRequest {
    #[validate(length(min = 1, max = 200, message = "Hero title must not be empty"))]
    pub hero_title: Option<String>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    #[validate(length(max = 500))]
    pub hero_subtitle: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    pub hero_image: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    #[validate(length(max = 200))]
    pub about_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    #[validate(length(max = 10000))]
    pub about_text: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    #[validate(length(max = 120))]
    pub cta_text: Option<Option<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeContentResponse {
    pub id: Uuid,
    pub hero_title: String,
    pub hero_subtitle: Option<String>,
    pub hero_image: Option<String>,
    pub about_title: Option<String>,
    pub about_text: Option<String>,
    pub cta_text: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<HomeContentRow> for HomeContentResponse {
    fn from(r: HomeContentRow) -> Self {
        Self {
            id: r.id,
            hero_title: r.hero_title,
            hero_subtitle: r.hero_subtitle,
            hero_image: r.hero_image,
            about_title: r.about_title,
            about_text: r.about_text,
            cta_text: r.cta_text,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
