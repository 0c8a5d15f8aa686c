mod common;

use axum::http::{Method, StatusCode};
use fitcoach::auth::Role;
use serde_json::{json, Value};
use uuid::Uuid;

fn two_day_plan(client_id: Uuid) -> Value {
    json!({
        "name": "Week A",
        "clientId": client_id,
        "weekNumber": 3,
        "days": [
            { "dayName": "Sunday", "isRestDay": true },
            {
                "dayName": "Monday",
                "exercises": [{
                    "name": "Bench Press",
                    "restSeconds": 90,
                    "sets": [
                        { "targetReps": 10, "actualReps": 10, "weight": 50 },
                        { "targetReps": 8, "actualReps": 8, "weight": 55 },
                        { "targetReps": 6 }
                    ]
                }]
            }
        ]
    })
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn created_plan_reads_back_in_order() {
    let app = common::setup().await;
    let (_, admin) = app.user(Role::Admin).await;
    let (client, client_token) = app.user(Role::Client).await;

    let (status, created) = app
        .call(Method::POST, "/api/v1/workout-plans", Some(&admin), Some(two_day_plan(client.id)))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap();

    let (status, plan) = app
        .call(Method::GET, &format!("/api/v1/workout-plans/{id}"), Some(&client_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let days = plan["days"].as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["exercises"].as_array().unwrap().len(), 0);
    assert_eq!(days[1]["exercises"].as_array().unwrap().len(), 1);

    let sets = days[1]["exercises"][0]["sets"].as_array().unwrap();
    let numbers: Vec<i64> = sets.iter().map(|s| s["setNumber"].as_i64().unwrap()).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(sets[1]["targetReps"], 8);
    assert_eq!(sets[0]["volume"], 500.0);
    assert_eq!(sets[2]["volume"], 0.0);
    assert_eq!(plan["totalVolume"], 940.0);
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn update_replaces_children_exactly() {
    let app = common::setup().await;
    let (_, admin) = app.user(Role::Admin).await;
    let (client, client_token) = app.user(Role::Client).await;

    let (_, created) = app
        .call(Method::POST, "/api/v1/workout-plans", Some(&admin), Some(two_day_plan(client.id)))
        .await;
    let id = created["id"].as_str().unwrap();

    let replacement = json!({
        "name": "Week B",
        "weekNumber": 4,
        "startDate": created["startDate"],
        "days": [{
            "dayName": "Friday",
            "exercises": [
                { "name": "Deadlift", "sets": [{ "targetReps": 5 }] },
                { "name": "Row", "sets": [{ "targetReps": 12 }, { "targetReps": 12 }] }
            ]
        }]
    });
    let (status, updated) = app
        .call(Method::PUT, &format!("/api/v1/workout-plans/{id}"), Some(&client_token), Some(replacement))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, plan) = app
        .call(Method::GET, &format!("/api/v1/workout-plans/{id}"), Some(&client_token), None)
        .await;
    assert_eq!(plan, updated);
    assert_eq!(plan["name"], "Week B");
    let days = plan["days"].as_array().unwrap();
    assert_eq!(days.len(), 1);
    let names: Vec<&str> = days[0]["exercises"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Deadlift", "Row"]);
    assert_eq!(days[0]["exercises"][1]["sets"].as_array().unwrap().len(), 2);
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn clients_only_reach_their_own_plans() {
    let app = common::setup().await;
    let (_, admin) = app.user(Role::Admin).await;
    let (owner, owner_token) = app.user(Role::Client).await;
    let (_, other_token) = app.user(Role::Client).await;

    let (_, created) = app
        .call(Method::POST, "/api/v1/workout-plans", Some(&admin), Some(two_day_plan(owner.id)))
        .await;
    let uri = format!("/api/v1/workout-plans/{}", created["id"].as_str().unwrap());

    let (status, _) = app.call(Method::GET, &uri, Some(&other_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .call(Method::PUT, &uri, Some(&other_token), Some(json!({ "name": "hijack", "days": [] })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.call(Method::DELETE, &uri, Some(&other_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.call(Method::GET, &uri, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .call(Method::GET, &format!("/api/v1/workout-plans/{}", Uuid::new_v4()), Some(&other_token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn duplicate_deep_copies_for_target_client() {
    let app = common::setup().await;
    let (_, admin) = app.user(Role::Admin).await;
    let (source_client, _) = app.user(Role::Client).await;
    let (target_client, _) = app.user(Role::Client).await;

    let (_, source) = app
        .call(Method::POST, "/api/v1/workout-plans", Some(&admin), Some(two_day_plan(source_client.id)))
        .await;
    let (status, copy) = app
        .call(
            Method::POST,
            &format!("/api/v1/workout-plans/{}/duplicate", source["id"].as_str().unwrap()),
            Some(&admin),
            Some(json!({ "targetClientId": target_client.id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(copy["id"], source["id"]);
    assert_eq!(copy["clientId"], json!(target_client.id));
    assert_eq!(copy["weekNumber"], 1);
    assert_eq!(strip_ids(&copy["days"]), strip_ids(&source["days"]));
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn deleting_a_plan_removes_its_tree() {
    let app = common::setup().await;
    let (_, admin) = app.user(Role::Admin).await;
    let (client, _) = app.user(Role::Client).await;

    let (_, created) = app
        .call(Method::POST, "/api/v1/workout-plans", Some(&admin), Some(two_day_plan(client.id)))
        .await;
    let id: Uuid = created["id"].as_str().unwrap().parse().unwrap();
    let exercise_id = created["days"][1]["exercises"][0]["id"].as_str().unwrap().to_owned();

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/v1/workout-plans/{id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let days: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workout_days WHERE plan_id = $1")
        .bind(id)
        .fetch_one(&app.state.db)
        .await
        .unwrap();
    assert_eq!(days, 0);

    let (status, _) = app
        .call(Method::GET, &format!("/api/v1/exercises/{exercise_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn meal_plan_totals_follow_foods() {
    let app = common::setup().await;
    let (_, admin) = app.user(Role::Admin).await;
    let (client, client_token) = app.user(Role::Client).await;

    let body = json!({
        "name": "Cut",
        "clientId": client.id,
        "meals": [
            { "name": "Breakfast", "totalCalories": 1, "foods": [
                { "name": "Eggs", "calories": 140, "protein": 12, "fat": 10 },
                { "name": "Toast", "calories": 80.5, "carbs": 15 }
            ]},
            { "name": "Snack", "foods": [] }
        ]
    });
    let (status, plan) = app
        .call(Method::POST, "/api/v1/meal-plans", Some(&admin), Some(body))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(plan["meals"][0]["totalCalories"], 220.5);
    assert_eq!(plan["meals"][1]["totalCalories"], 0.0);
    assert_eq!(plan["totalCalories"], 220.5);
    assert_eq!(plan["macros"]["protein"], 12.0);

    let id = plan["id"].as_str().unwrap();
    let update = json!({
        "name": "Cut v2",
        "meals": [{ "name": "Dinner", "foods": [{ "name": "Soup", "calories": 300 }] }]
    });
    let (status, plan) = app
        .call(Method::PUT, &format!("/api/v1/meal-plans/{id}"), Some(&client_token), Some(update))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["meals"].as_array().unwrap().len(), 1);
    assert_eq!(plan["totalCalories"], 300.0);
}

fn two_meal_plan(client_id: Uuid) -> Value {
    json!({
        "name": "Lean bulk",
        "clientId": client_id,
        "notes": "High protein",
        "meals": [
            { "name": "Breakfast", "mealTime": "07:00", "foods": [
                { "name": "Oats", "quantity": "80g", "calories": 300, "carbs": 54, "protein": 10 },
                { "name": "Whey", "calories": 120, "protein": 24 }
            ]},
            { "name": "Lunch", "foods": [{ "name": "Rice and chicken", "calories": 650, "protein": 45 }] }
        ]
    })
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn clients_only_reach_their_own_meal_plans() {
    let app = common::setup().await;
    let (_, admin) = app.user(Role::Admin).await;
    let (owner, owner_token) = app.user(Role::Client).await;
    let (_, other_token) = app.user(Role::Client).await;

    let (status, created) = app
        .call(Method::POST, "/api/v1/meal-plans", Some(&admin), Some(two_meal_plan(owner.id)))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/v1/meal-plans/{}", created["id"].as_str().unwrap());

    let (status, _) = app.call(Method::GET, &uri, Some(&other_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .call(Method::PUT, &uri, Some(&other_token), Some(json!({ "name": "hijack", "meals": [] })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.call(Method::DELETE, &uri, Some(&other_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, plan) = app.call(Method::GET, &uri, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["name"], "Lean bulk");
    assert_eq!(plan["meals"].as_array().unwrap().len(), 2);

    let (status, _) = app
        .call(Method::PUT, &uri, Some(&owner_token), Some(json!({ "name": "Mine", "meals": [] })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.call(Method::DELETE, &uri, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.call(Method::GET, &uri, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn deleting_a_meal_plan_removes_meals_and_foods() {
    let app = common::setup().await;
    let (_, admin) = app.user(Role::Admin).await;
    let (client, _) = app.user(Role::Client).await;

    let (_, created) = app
        .call(Method::POST, "/api/v1/meal-plans", Some(&admin), Some(two_meal_plan(client.id)))
        .await;
    let id: Uuid = created["id"].as_str().unwrap().parse().unwrap();
    let meal_ids: Vec<Uuid> = created["meals"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap().parse().unwrap())
        .collect();
    assert_eq!(meal_ids.len(), 2);

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/v1/meal-plans/{id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let meals: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM meals WHERE plan_id = $1")
        .bind(id)
        .fetch_one(&app.state.db)
        .await
        .unwrap();
    assert_eq!(meals, 0);
    let foods: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM meal_foods WHERE meal_id = ANY($1)")
        .bind(&meal_ids)
        .fetch_one(&app.state.db)
        .await
        .unwrap();
    assert_eq!(foods, 0);
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn meal_plan_duplicate_deep_copies_for_target_client() {
    let app = common::setup().await;
    let (_, admin) = app.user(Role::Admin).await;
    let (source_client, source_token) = app.user(Role::Client).await;
    let (target_client, target_token) = app.user(Role::Client).await;

    let (_, source) = app
        .call(Method::POST, "/api/v1/meal-plans", Some(&admin), Some(two_meal_plan(source_client.id)))
        .await;
    let dup_uri = format!("/api/v1/meal-plans/{}/duplicate", source["id"].as_str().unwrap());

    let (status, _) = app
        .call(
            Method::POST,
            &dup_uri,
            Some(&source_token),
            Some(json!({ "targetClientId": target_client.id })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, copy) = app
        .call(Method::POST, &dup_uri, Some(&admin), Some(json!({ "targetClientId": target_client.id })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(copy["id"], source["id"]);
    assert_eq!(copy["clientId"], json!(target_client.id));
    assert_eq!(copy["totalCalories"], source["totalCalories"]);
    assert_eq!(copy["totalCalories"], 1070.0);
    assert_eq!(strip_ids(&copy["meals"]), strip_ids(&source["meals"]));

    let (status, _) = app
        .call(
            Method::GET,
            &format!("/api/v1/meal-plans/{}", copy["id"].as_str().unwrap()),
            Some(&target_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, source_again) = app
        .call(
            Method::GET,
            &format!("/api/v1/meal-plans/{}", source["id"].as_str().unwrap()),
            Some(&source_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(strip_ids(&source_again["meals"]), strip_ids(&source["meals"]));
}

fn strip_ids(v: &Value) -> Value {
    match v {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| k.as_str() != "id")
                .map(|(k, v)| (k.clone(), strip_ids(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_ids).collect()),
        other => other.clone(),
    }
}
