use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use super::repo_types::WeightRecordRow;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWeightRecordRequest {
    /// Omitted by clients logging for themselves.
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[validate(range(exclusive_min = 0.0, max = 500.0, message = "Weight must be in (0, 500] kg"))]
    pub weight: f64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub recorded_at: Option<OffsetDateTime>,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWeightRecordRequest {
    #[serde(default)]
    #[validate(range(exclusive_min = 0.0, max = 500.0, message = "Weight must be in (0, 500] kg"))]
    pub weight: Option<f64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub recorded_at: Option<OffsetDateTime>,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightRecordFilter {
    pub client_id: Option<Uuid>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub from: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub to: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightRecordResponse {
    pub id: Uuid,
    pub client_id: Uuid,
    pub weight: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<WeightRecordRow> for WeightRecordResponse {
    fn from(r: WeightRecordRow) -> Self {
        Self {
            id: r.id,
            client_id: r.client_id,
            weight: r.weight,
            recorded_at: r.recorded_at,
            notes: r.notes,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub id: Uuid,
    pub weight: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

#[derive(Debug, Default, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeightStats {
    pub count: i64,
    pub start_weight: Option<f64>,
    pub current_weight: Option<f64>,
    pub change: Option<f64>,
    pub min_weight: Option<f64>,
    pub max_weight: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct WeightChart {
    pub points: Vec<ChartPoint>,
    pub stats: WeightStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn weight_bounds() {
        let ok: CreateWeightRecordRequest =
            serde_json::from_value(json!({ "weight": 500 })).unwrap();
        assert!(ok.validate().is_ok());
        assert!(ok.recorded_at.is_none());

        for bad in [0.0, -1.0, 500.5] {
            let req: CreateWeightRecordRequest =
                serde_json::from_value(json!({ "weight": bad })).unwrap();
            assert!(req.validate().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn recorded_at_parses_rfc3339() {
        let req: CreateWeightRecordRequest = serde_json::from_value(json!({
            "weight": 72.4,
            "recordedAt": "2024-03-01T07:30:00Z"
        }))
        .unwrap();
        assert_eq!(req.recorded_at.unwrap().unix_timestamp(), 1_709_278_200);
    }
}
