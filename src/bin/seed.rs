use fitcoach::{
    app::init_tracing,
    seed::{self, SeedConfig},
    state::{AppState, MIGRATOR},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let state = AppState::init().await?;
    MIGRATOR.run(&state.db).await?;

    let report = seed::run(&state.db, &SeedConfig::from_env()).await?;
    tracing::info!(
        users = report.users,
        workout_plans = report.workout_plans,
        meal_plans = report.meal_plans,
        weight_records = report.weight_records,
        testimonials = report.testimonials,
        videos = report.videos,
        "database seeded"
    );
    Ok(())
}
