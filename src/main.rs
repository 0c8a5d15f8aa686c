use fitcoach::{
    app::{build_app, init_tracing, serve},
    state::{AppState, MIGRATOR},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let app_state = AppState::init().await?;

    MIGRATOR.run(&app_state.db).await?;
    tracing::info!("migrations applied");

    let server = app_state.config.server.clone();
    let app = build_app(app_state);
    serve(app, &server).await
}
