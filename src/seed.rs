//! Demo data for local development.
//!
//! Every step checks for existing rows first, so running the seeder
//! repeatedly never duplicates anything.

use anyhow::Context;
use serde_json::json;
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::{
        password::hash_password,
        repo_types::{NewUser, Role, User},
    },
    contact_info::{self, dto::ContactInfoRequest},
    home_content::{self, dto::HomeContentRequest},
    meal_plans::{self, dto::CreateMealPlanRequest},
    testimonials::{self, dto::CreateTestimonialRequest},
    videos::{self, dto::CreateVideoRequest},
    weight_records,
    workout_plans::{self, dto::CreateWorkoutPlanRequest},
};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@fitcoach.local";
pub const CLIENT_USERNAME: &str = "client";
pub const CLIENT_EMAIL: &str = "client@fitcoach.local";

#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub admin_password: String,
    pub client_password: String,
}

impl SeedConfig {
    pub fn from_env() -> Self {
        Self {
            admin_password: std::env::var("SEED_ADMIN_PASSWORD")
                .unwrap_or_else(|_| "admin12345".into()),
            client_password: std::env::var("SEED_CLIENT_PASSWORD")
                .unwrap_or_else(|_| "client12345".into()),
        }
    }
}

/// What a seeding run actually inserted.
#[derive(Debug, Default)]
pub struct SeedReport {
    pub users: usize,
    pub workout_plans: usize,
    pub meal_plans: usize,
    pub weight_records: usize,
    pub testimonials: usize,
    pub videos: usize,
    pub contact_info: bool,
    pub home_content: bool,
}

pub async fn run(db: &PgPool, cfg: &SeedConfig) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();

    let admin = ensure_user(
        db,
        &mut report,
        ADMIN_USERNAME,
        ADMIN_EMAIL,
        &cfg.admin_password,
        "Coach Admin",
        Role::Admin,
    )
    .await?;
    let client = ensure_user(
        db,
        &mut report,
        CLIENT_USERNAME,
        CLIENT_EMAIL,
        &cfg.client_password,
        "Demo Client",
        Role::Client,
    )
    .await?;

    if workout_plans::repo::list_plans_by_client(db, client.id).await?.is_empty() {
        let req = sample_workout_plan(client.id)?;
        workout_plans::services::create_plan(db, admin.id, &req).await?;
        report.workout_plans += 1;
    }

    if meal_plans::repo::list_plans_by_client(db, client.id).await?.is_empty() {
        let req = sample_meal_plan(client.id)?;
        meal_plans::services::create_plan(db, admin.id, &req).await?;
        report.meal_plans += 1;
    }

    if weight_records::repo::list_by_client(db, client.id).await?.is_empty() {
        let now = OffsetDateTime::now_utc();
        for (weeks_ago, weight) in [(4, 72.5), (3, 71.8), (2, 71.2), (1, 70.9), (0, 70.4)] {
            weight_records::repo::insert(db, client.id, weight, now - Duration::weeks(weeks_ago), None)
                .await?;
            report.weight_records += 1;
        }
    }

    if testimonials::repo::count(db, None).await? == 0 {
        for t in sample_testimonials() {
            testimonials::repo::insert(db, &t).await?;
            report.testimonials += 1;
        }
    }

    if videos::repo::count(db, None, None).await? == 0 {
        for v in sample_videos() {
            videos::repo::insert(db, &v).await?;
            report.videos += 1;
        }
    }

    if contact_info::repo::latest(db).await?.is_none() {
        let req = ContactInfoRequest {
            phone: Some(Some("+84 900 000 000".into())),
            email: Some(Some("coach@fitcoach.local".into())),
            address: Some(Some("District 1, Ho Chi Minh City".into())),
            facebook: Some(Some("https://facebook.com/fitcoach".into())),
            instagram: Some(Some("https://instagram.com/fitcoach".into())),
            zalo: Some(Some("0900000000".into())),
            working_hours: Some(Some("Mon-Sat 06:00-21:00".into())),
        };
        contact_info::services::upsert(db, &req).await?;
        report.contact_info = true;
    }

    if home_content::repo::latest(db).await?.is_none() {
        let req = HomeContentRequest {
            hero_title: Some("Train with a plan that fits you".into()),
            hero_subtitle: Some(Some(
                "Personal workouts, meal plans and progress tracking".into(),
            )),
            hero_image: None,
            about_title: Some(Some("About your coach".into())),
            about_text: Some(Some("Ten years of strength and nutrition coaching.".into())),
            cta_text: Some(Some("Start today".into())),
        };
        home_content::services::upsert(db, &req).await?;
        report.home_content = true;
    }

    info!(?report, "seed finished");
    Ok(report)
}

async fn ensure_user(
    db: &PgPool,
    report: &mut SeedReport,
    username: &str,
    email: &str,
    password: &str,
    full_name: &str,
    role: Role,
) -> anyhow::Result<User> {
    if let Some(user) = User::find_by_username(db, username).await? {
        if user.role != role {
            return User::set_role(db, user.id, role)
                .await?
                .with_context(|| format!("user {username} vanished while seeding"));
        }
        return Ok(user);
    }

    let password_hash = hash_password(password)?;
    let user = User::create(
        db,
        &NewUser {
            username,
            email,
            password_hash: &password_hash,
            full_name,
            phone: None,
            role,
        },
    )
    .await?;
    report.users += 1;
    info!(user_id = %user.id, %username, ?role, "seed user created");
    Ok(user)
}

fn sample_workout_plan(client_id: Uuid) -> anyhow::Result<CreateWorkoutPlanRequest> {
    let req = serde_json::from_value(json!({
        "name": "Foundation Week",
        "clientId": client_id,
        "weekNumber": 1,
        "notes": "Focus on form before load.",
        "days": [
            {
                "dayName": "Monday",
                "exercises": [
                    { "name": "Back Squat", "restSeconds": 120, "sets": [
                        { "targetReps": 8, "actualReps": 8, "weight": 60 },
                        { "targetReps": 8, "actualReps": 7, "weight": 60 },
                        { "targetReps": 8 }
                    ]},
                    { "name": "Push-up", "restSeconds": 60, "sets": [
                        { "targetReps": 12 },
                        { "targetReps": 12 }
                    ]}
                ]
            },
            { "dayName": "Tuesday", "isRestDay": true },
            {
                "dayName": "Wednesday",
                "exercises": [
                    { "name": "Romanian Deadlift", "restSeconds": 90, "sets": [
                        { "targetReps": 10 },
                        { "targetReps": 10 },
                        { "targetReps": 10 }
                    ]}
                ]
            }
        ]
    }))
    .context("build sample workout plan")?;
    Ok(req)
}

fn sample_meal_plan(client_id: Uuid) -> anyhow::Result<CreateMealPlanRequest> {
    let req = serde_json::from_value(json!({
        "name": "Lean Start",
        "clientId": client_id,
        "notes": "Drink 2L of water daily.",
        "meals": [
            { "name": "Breakfast", "mealTime": "07:00", "foods": [
                { "name": "Oatmeal", "quantity": "80g", "calories": 300, "protein": 10, "carbs": 54, "fat": 5 },
                { "name": "Banana", "quantity": "1", "calories": 105, "protein": 1.3, "carbs": 27, "fat": 0.4 }
            ]},
            { "name": "Lunch", "mealTime": "12:30", "foods": [
                { "name": "Chicken breast", "quantity": "150g", "calories": 248, "protein": 46, "carbs": 0, "fat": 5.4 },
                { "name": "Brown rice", "quantity": "1 cup", "calories": 216, "protein": 5, "carbs": 45, "fat": 1.8 }
            ]},
            { "name": "Dinner", "mealTime": "19:00", "foods": [
                { "name": "Salmon", "quantity": "120g", "calories": 250, "protein": 25, "carbs": 0, "fat": 16 },
                { "name": "Broccoli", "quantity": "100g", "calories": 34, "protein": 2.8, "carbs": 7, "fat": 0.4 }
            ]}
        ]
    }))
    .context("build sample meal plan")?;
    Ok(req)
}

fn sample_testimonials() -> Vec<CreateTestimonialRequest> {
    vec![
        CreateTestimonialRequest {
            client_name: "Minh Tran".into(),
            content: "Lost 8kg in three months without ever feeling hungry.".into(),
            rating: 5,
            avatar_url: None,
            before_image: None,
            after_image: None,
            is_published: true,
        },
        CreateTestimonialRequest {
            client_name: "Hoa Le".into(),
            content: "The weekly plans kept me consistent for the first time.".into(),
            rating: 4,
            avatar_url: None,
            before_image: None,
            after_image: None,
            is_published: true,
        },
    ]
}

fn sample_videos() -> Vec<CreateVideoRequest> {
    vec![
        CreateVideoRequest {
            title: "Squat technique basics".into(),
            description: Some("Stance, depth and bracing.".into()),
            url: "https://www.youtube.com/watch?v=ultWZbUMPL8".into(),
            thumbnail_url: None,
            category: Some("technique".into()),
            is_published: true,
        },
        CreateVideoRequest {
            title: "10 minute mobility routine".into(),
            description: None,
            url: "https://www.youtube.com/watch?v=L_xrDAtykMI".into(),
            thumbnail_url: None,
            category: Some("mobility".into()),
            is_published: true,
        },
    ]
}
