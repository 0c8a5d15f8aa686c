use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use super::repo_types::{MealFoodRow, MealPlanSummaryRow};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MealFoodInput {
    #[validate(length(min = 1, max = 120, message = "Food name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 60))]
    pub quantity: Option<String>,
    #[validate(range(min = 0.0, max = 10000.0))]
    pub calories: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1000.0))]
    pub protein: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1000.0))]
    pub carbs: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1000.0))]
    pub fat: f64,
}

/// A meal as submitted; `totalCalories` is derived and never read from the payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MealInput {
    #[validate(length(min = 1, max = 80, message = "Meal name is required"))]
    pub name: String,
    #[serde(default, alias = "time")]
    #[validate(length(max = 20))]
    pub meal_time: Option<String>,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub foods: Vec<MealFoodInput>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealPlanRequest {
    #[validate(length(min = 1, max = 200, message = "Plan name is required"))]
    pub name: String,
    pub client_id: Uuid,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub meals: Vec<MealInput>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMealPlanRequest {
    #[validate(length(min = 1, max = 200, message = "Plan name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub meals: Vec<MealInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateMealPlanRequest {
    pub target_client_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanFilter {
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct MacroTotals {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealFoodResponse {
    pub id: Uuid,
    pub name: String,
    pub quantity: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub food_order: i32,
}

impl From<MealFoodRow> for MealFoodResponse {
    fn from(r: MealFoodRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            quantity: r.quantity,
            calories: r.calories,
            protein: r.protein,
            carbs: r.carbs,
            fat: r.fat,
            food_order: r.food_order,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealResponse {
    pub id: Uuid,
    pub name: String,
    pub meal_time: Option<String>,
    pub meal_order: i32,
    pub total_calories: f64,
    pub macros: MacroTotals,
    pub notes: Option<String>,
    pub foods: Vec<MealFoodResponse>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanResponse {
    pub id: Uuid,
    pub name: String,
    pub client_id: Uuid,
    pub total_calories: f64,
    pub macros: MacroTotals,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub meals: Vec<MealResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanListItem {
    pub id: Uuid,
    pub name: String,
    pub client_id: Uuid,
    pub client_name: String,
    pub total_calories: f64,
    pub notes: Option<String>,
    pub meal_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<MealPlanSummaryRow> for MealPlanListItem {
    fn from(r: MealPlanSummaryRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            client_id: r.client_id,
            client_name: r.client_name,
            total_calories: r.total_calories,
            notes: r.notes,
            meal_count: r.meal_count,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
