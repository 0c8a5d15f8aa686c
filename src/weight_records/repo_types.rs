use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct WeightRecordRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub weight: f64,
    pub recorded_at: OffsetDateTime,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Default)]
pub struct WeightRecordChanges {
    pub weight: Option<f64>,
    pub recorded_at: Option<OffsetDateTime>,
    pub notes: Option<String>,
}
