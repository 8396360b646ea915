//! Beehive Lodge form server

use lodge_forms::{
    build_app, config,
    handlers::AppState,
    mail,
    storage::AppendLog,
    validation::{SpamFilter, WeekdayAvailability},
};
use std::sync::Arc;
use tokio::fs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lodge_forms=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Starting {} form server", config.site.name);
    tracing::info!("Environment: {:?}", config.environment);

    // Ensure log directory exists
    fs::create_dir_all(&config.log_dir).await?;
    tracing::info!("Submission logs: {:?}", config.log_dir);

    let mailer = mail::mail_sender_from_config(&config.mail)?;

    // Create application state
    let state = AppState {
        site: Arc::new(config.site.clone()),
        mail: Arc::new(config.mail.clone()),
        mailer,
        logs: Arc::new(AppendLog::new(config.log_dir.clone())),
        spam: Arc::new(SpamFilter::new(&config.site.domain)?),
        availability: Arc::new(WeekdayAvailability::default()),
        is_production: config.is_production(),
    };

    let app = build_app(state, &config);

    // Start server
    let addr = config.server_addr();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
