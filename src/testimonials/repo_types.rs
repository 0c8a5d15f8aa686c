use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct TestimonialRow {
    pub id: Uuid,
    pub client_name: String,
    pub content: String,
    pub rating: i32,
    pub avatar_url: Option<String>,
    pub before_image: Option<String>,
    pub after_image: Option<String>,
    pub is_published: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
