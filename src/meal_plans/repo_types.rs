use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct MealPlanRow {
    pub id: Uuid,
    pub name: String,
    pub client_id: Uuid,
    pub total_calories: f64,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct MealPlanSummaryRow {
    pub id: Uuid,
    pub name: String,
    pub client_id: Uuid,
    pub client_name: String,
    pub total_calories: f64,
    pub notes: Option<String>,
    pub meal_count: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct MealRow {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub name: String,
    pub meal_time: Option<String>,
    pub meal_order: i32,
    pub total_calories: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MealFoodRow {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub name: String,
    pub quantity: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub food_order: i32,
}
