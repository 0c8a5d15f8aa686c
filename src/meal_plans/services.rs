use std::collections::HashMap;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{
    dto::{
        CreateMealPlanRequest, MacroTotals, MealFoodInput, MealFoodResponse, MealInput,
        MealPlanResponse, MealResponse, UpdateMealPlanRequest,
    },
    repo::{self, NewMealPlan},
    repo_types::{MealFoodRow, MealPlanRow, MealRow},
};
use crate::error::{AppError, AppResult};

pub fn meal_calories(meal: &MealInput) -> f64 {
    meal.foods.iter().map(|f| f.calories).sum()
}

pub fn plan_calories(meals: &[MealInput]) -> f64 {
    meals.iter().map(meal_calories).sum()
}

pub fn food_macros(foods: &[MealFoodResponse]) -> MacroTotals {
    foods.iter().fold(MacroTotals::default(), |acc, f| MacroTotals {
        protein: acc.protein + f.protein,
        carbs: acc.carbs + f.carbs,
        fat: acc.fat + f.fat,
    })
}

fn sum_macros<'a>(items: impl Iterator<Item = &'a MacroTotals>) -> MacroTotals {
    items.fold(MacroTotals::default(), |acc, m| MacroTotals {
        protein: acc.protein + m.protein,
        carbs: acc.carbs + m.carbs,
        fat: acc.fat + m.fat,
    })
}

/// Groups flat meal and food rows (ordered within their parent) into plan trees.
pub fn assemble_plans(
    plans: Vec<MealPlanRow>,
    meals: Vec<MealRow>,
    foods: Vec<MealFoodRow>,
) -> Vec<MealPlanResponse> {
    let mut foods_by_meal: HashMap<Uuid, Vec<MealFoodResponse>> = HashMap::new();
    for f in foods {
        foods_by_meal
            .entry(f.meal_id)
            .or_default()
            .push(MealFoodResponse::from(f));
    }

    let mut meals_by_plan: HashMap<Uuid, Vec<MealResponse>> = HashMap::new();
    for m in meals {
        let foods = foods_by_meal.remove(&m.id).unwrap_or_default();
        meals_by_plan.entry(m.plan_id).or_default().push(MealResponse {
            id: m.id,
            name: m.name,
            meal_time: m.meal_time,
            meal_order: m.meal_order,
            total_calories: m.total_calories,
            macros: food_macros(&foods),
            notes: m.notes,
            foods,
        });
    }

    plans
        .into_iter()
        .map(|p| {
            let meals = meals_by_plan.remove(&p.id).unwrap_or_default();
            MealPlanResponse {
                id: p.id,
                name: p.name,
                client_id: p.client_id,
                total_calories: p.total_calories,
                macros: sum_macros(meals.iter().map(|m| &m.macros)),
                notes: p.notes,
                created_by: p.created_by,
                created_at: p.created_at,
                updated_at: p.updated_at,
                meals,
            }
        })
        .collect()
}

/// Converts a stored tree back into write inputs, dropping ids and derived totals.
pub fn plan_to_inputs(plan: &MealPlanResponse) -> Vec<MealInput> {
    plan.meals
        .iter()
        .map(|m| MealInput {
            name: m.name.clone(),
            meal_time: m.meal_time.clone(),
            notes: m.notes.clone(),
            foods: m
                .foods
                .iter()
                .map(|f| MealFoodInput {
                    name: f.name.clone(),
                    quantity: f.quantity.clone(),
                    calories: f.calories,
                    protein: f.protein,
                    carbs: f.carbs,
                    fat: f.fat,
                })
                .collect(),
        })
        .collect()
}

pub async fn load_plans(db: &PgPool, plans: Vec<MealPlanRow>) -> AppResult<Vec<MealPlanResponse>> {
    if plans.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = plans.iter().map(|p| p.id).collect();
    let meals = repo::list_meals(db, &ids).await?;
    let foods = repo::list_foods(db, &ids).await?;
    Ok(assemble_plans(plans, meals, foods))
}

pub async fn load_plan(db: &PgPool, id: Uuid) -> AppResult<Option<MealPlanResponse>> {
    let Some(plan) = repo::find_plan(db, id).await? else {
        return Ok(None);
    };
    Ok(load_plans(db, vec![plan]).await?.into_iter().next())
}

async fn load_existing(db: &PgPool, id: Uuid) -> AppResult<MealPlanResponse> {
    load_plan(db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Meal plan"))
}

pub async fn create_plan(
    db: &PgPool,
    created_by: Uuid,
    req: &CreateMealPlanRequest,
) -> AppResult<MealPlanResponse> {
    let mut tx = db.begin().await?;
    let plan = repo::insert_plan_tx(
        &mut tx,
        &NewMealPlan {
            name: req.name.trim(),
            client_id: req.client_id,
            total_calories: plan_calories(&req.meals),
            notes: req.notes.as_deref(),
            created_by: Some(created_by),
        },
    )
    .await?;
    repo::insert_meals_tx(&mut tx, plan.id, &req.meals).await?;
    tx.commit().await?;

    info!(plan_id = %plan.id, client_id = %plan.client_id, meals = req.meals.len(), "meal plan created");
    load_existing(db, plan.id).await
}

/// Rewrites the header and replaces all meals wholesale, atomically.
pub async fn replace_plan(
    db: &PgPool,
    id: Uuid,
    req: &UpdateMealPlanRequest,
) -> AppResult<MealPlanResponse> {
    let mut tx = db.begin().await?;
    let plan = repo::update_plan_header_tx(
        &mut tx,
        id,
        req.name.trim(),
        plan_calories(&req.meals),
        req.notes.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::not_found("Meal plan"))?;
    let removed = repo::delete_meals_tx(&mut tx, plan.id).await?;
    repo::insert_meals_tx(&mut tx, plan.id, &req.meals).await?;
    tx.commit().await?;

    info!(plan_id = %plan.id, removed_meals = removed, meals = req.meals.len(), "meal plan replaced");
    load_existing(db, plan.id).await
}

pub async fn duplicate_plan(
    db: &PgPool,
    source: &MealPlanResponse,
    target_client_id: Uuid,
    created_by: Uuid,
) -> AppResult<MealPlanResponse> {
    let meals = plan_to_inputs(source);

    let mut tx = db.begin().await?;
    let plan = repo::insert_plan_tx(
        &mut tx,
        &NewMealPlan {
            name: &source.name,
            client_id: target_client_id,
            total_calories: plan_calories(&meals),
            notes: source.notes.as_deref(),
            created_by: Some(created_by),
        },
    )
    .await?;
    repo::insert_meals_tx(&mut tx, plan.id, &meals).await?;
    tx.commit().await?;

    info!(source_id = %source.id, plan_id = %plan.id, %target_client_id, "meal plan duplicated");
    load_existing(db, plan.id).await
}
