use crate::components::google_calendar::{GoogleCalendarClient, TokenManager};
use crate::config::Config;
use crate::error::Error;
use crate::server;
use crate::shutdown;
use crate::skill::SkillContext;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,hyper=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Arc<Config>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(config)),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Wire the calendar client and its credentials into a skill context
pub fn build_context(config: Arc<Config>) -> miette::Result<SkillContext> {
    let client = reqwest::Client::new();
    let token_manager = TokenManager::from_config(&config, client.clone())?;
    let calendar = GoogleCalendarClient::new(client, token_manager, &config.calendar_api_base);

    info!(
        "Using calendar {} in timezone {}",
        config.google_calendar_id, config.timezone
    );
    Ok(SkillContext::new(config, Arc::new(calendar)))
}

/// Serve the skill endpoint until a shutdown signal arrives
pub async fn start_server(ctx: SkillContext) -> miette::Result<()> {
    let addr = ctx.config.listen_addr.clone();
    let listener = TcpListener::bind(&addr).await.map_err(Error::from)?;
    info!("Listening on {}", addr);

    axum::serve(listener, server::router(ctx))
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await
        .map_err(Error::from)?;

    info!("Server stopped");
    Ok(())
}
