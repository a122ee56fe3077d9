use anyhow::Result;

use sahyadri_backend::{app, config, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let settings = config::Settings::from_env()?;

    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        model = %settings.groq_model,
        "Starting Sahyadri backend"
    );

    let state = app::AppState::from_settings(settings.clone())?;

    // Optionally check model gateway health (non-blocking)
    tokio::spawn({
        let gateway = state.gateway.clone();
        async move {
            match gateway.health_check().await {
                Ok(()) => tracing::info!("Model gateway is reachable"),
                Err(e) => tracing::warn!(error = %e, "Model gateway health check failed - will retry on first request"),
            }
        }
    });

    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
