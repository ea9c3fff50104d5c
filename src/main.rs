use tracing::info;
use voice_calendar::startup;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting voice calendar skill");

    // Load configuration
    let config = startup::load_config()?;

    let ctx = startup::build_context(config)?;

    // Start the skill server
    startup::start_server(ctx).await
}
