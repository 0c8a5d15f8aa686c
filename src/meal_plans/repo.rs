use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{
    dto::MealInput,
    repo_types::{MealFoodRow, MealPlanRow, MealPlanSummaryRow, MealRow},
    services::meal_calories,
};

const PLAN_COLUMNS: &str =
    "id, name, client_id, total_calories, notes, created_by, created_at, updated_at";

pub struct NewMealPlan<'a> {
    pub name: &'a str,
    pub client_id: Uuid,
    pub total_calories: f64,
    pub notes: Option<&'a str>,
    pub created_by: Option<Uuid>,
}

// ---- Writes (transactional) ----

pub async fn insert_plan_tx(
    tx: &mut Transaction<'_, Postgres>,
    plan: &NewMealPlan<'_>,
) -> anyhow::Result<MealPlanRow> {
    let sql = format!(
        r#"
        INSERT INTO meal_plans (name, client_id, total_calories, notes, created_by)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {PLAN_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, MealPlanRow>(&sql)
        .bind(plan.name)
        .bind(plan.client_id)
        .bind(plan.total_calories)
        .bind(plan.notes)
        .bind(plan.created_by)
        .fetch_one(&mut **tx)
        .await
        .context("insert meal plan")?;
    Ok(row)
}

pub async fn update_plan_header_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    name: &str,
    total_calories: f64,
    notes: Option<&str>,
) -> anyhow::Result<Option<MealPlanRow>> {
    let sql = format!(
        r#"
        UPDATE meal_plans
           SET name = $2, total_calories = $3, notes = $4, updated_at = now()
         WHERE id = $1
        RETURNING {PLAN_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, MealPlanRow>(&sql)
        .bind(id)
        .bind(name)
        .bind(total_calories)
        .bind(notes)
        .fetch_optional(&mut **tx)
        .await
        .context("update meal plan")?;
    Ok(row)
}

/// Removes every meal of a plan; foods go with them via cascade.
pub async fn delete_meals_tx(
    tx: &mut Transaction<'_, Postgres>,
    plan_id: Uuid,
) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM meals WHERE plan_id = $1")
        .bind(plan_id)
        .execute(&mut **tx)
        .await
        .context("delete meals")?;
    Ok(res.rows_affected())
}

/// Inserts meals and foods in array order, storing each meal's derived calorie total.
pub async fn insert_meals_tx(
    tx: &mut Transaction<'_, Postgres>,
    plan_id: Uuid,
    meals: &[MealInput],
) -> anyhow::Result<()> {
    for (meal_idx, meal) in meals.iter().enumerate() {
        let meal_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO meals (plan_id, name, meal_time, meal_order, total_calories, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(plan_id)
        .bind(meal.name.trim())
        .bind(meal.meal_time.as_deref())
        .bind(meal_idx as i32 + 1)
        .bind(meal_calories(meal))
        .bind(meal.notes.as_deref())
        .fetch_one(&mut **tx)
        .await
        .context("insert meal")?;

        for (food_idx, food) in meal.foods.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO meal_foods
                    (meal_id, name, quantity, calories, protein, carbs, fat, food_order)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(meal_id)
            .bind(food.name.trim())
            .bind(food.quantity.as_deref())
            .bind(food.calories)
            .bind(food.protein)
            .bind(food.carbs)
            .bind(food.fat)
            .bind(food_idx as i32 + 1)
            .execute(&mut **tx)
            .await
            .context("insert meal food")?;
        }
    }
    Ok(())
}

pub async fn delete_plan(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM meal_plans WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete meal plan")?;
    Ok(res.rows_affected() > 0)
}

// ---- Queries ----

pub async fn find_plan(db: &PgPool, id: Uuid) -> anyhow::Result<Option<MealPlanRow>> {
    let sql = format!("SELECT {PLAN_COLUMNS} FROM meal_plans WHERE id = $1");
    let row = sqlx::query_as::<_, MealPlanRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find meal plan")?;
    Ok(row)
}

pub async fn list_plans_by_client(db: &PgPool, client_id: Uuid) -> anyhow::Result<Vec<MealPlanRow>> {
    let sql = format!(
        "SELECT {PLAN_COLUMNS} FROM meal_plans WHERE client_id = $1 ORDER BY created_at DESC"
    );
    let rows = sqlx::query_as::<_, MealPlanRow>(&sql)
        .bind(client_id)
        .fetch_all(db)
        .await
        .context("list meal plans by client")?;
    Ok(rows)
}

pub async fn list_plan_summaries(
    db: &PgPool,
    client_id: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<MealPlanSummaryRow>> {
    let rows = sqlx::query_as::<_, MealPlanSummaryRow>(
        r#"
        SELECT p.id, p.name, p.client_id, u.full_name AS client_name,
               p.total_calories, p.notes, p.created_at, p.updated_at,
               (SELECT COUNT(*) FROM meals m WHERE m.plan_id = p.id) AS meal_count
          FROM meal_plans p
          JOIN users u ON u.id = p.client_id
         WHERE ($1::uuid IS NULL OR p.client_id = $1)
         ORDER BY p.created_at DESC
         LIMIT $2 OFFSET $3
        "#,
    )
    .bind(client_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list meal plans")?;
    Ok(rows)
}

pub async fn count_plans(db: &PgPool, client_id: Option<Uuid>) -> anyhow::Result<i64> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM meal_plans WHERE ($1::uuid IS NULL OR client_id = $1)",
    )
    .bind(client_id)
    .fetch_one(db)
    .await
    .context("count meal plans")?;
    Ok(total)
}

pub async fn list_meals(db: &PgPool, plan_ids: &[Uuid]) -> anyhow::Result<Vec<MealRow>> {
    let rows = sqlx::query_as::<_, MealRow>(
        r#"
        SELECT id, plan_id, name, meal_time, meal_order, total_calories, notes
          FROM meals
         WHERE plan_id = ANY($1)
         ORDER BY plan_id, meal_order
        "#,
    )
    .bind(plan_ids)
    .fetch_all(db)
    .await
    .context("list meals")?;
    Ok(rows)
}

pub async fn list_foods(db: &PgPool, plan_ids: &[Uuid]) -> anyhow::Result<Vec<MealFoodRow>> {
    let rows = sqlx::query_as::<_, MealFoodRow>(
        r#"
        SELECT f.id, f.meal_id, f.name, f.quantity, f.calories, f.protein, f.carbs, f.fat, f.food_order
          FROM meal_foods f
          JOIN meals m ON m.id = f.meal_id
         WHERE m.plan_id = ANY($1)
         ORDER BY f.meal_id, f.food_order
        "#,
    )
    .bind(plan_ids)
    .fetch_all(db)
    .await
    .context("list meal foods")?;
    Ok(rows)
}
