use chrono::Utc;
use meetup_concierge_bot::{
    config::BotConfig, db::PgContent, error::StartupError, service::ConversationService, telegram,
};
use meetup_concierge_conversation::{Engine, InMemorySessionStore, SessionStore};
use rootcause::prelude::Report;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use teloxide::Bot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Bot failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<StartupError>> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Failed to read .env file"),
    }

    let config = BotConfig::from_env()?;
    tracing::info!("Loaded configuration");

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| StartupError::DatabaseUnavailable {
            details: e.to_string(),
        })?;
    tracing::info!("Connected to database");

    let content = Arc::new(PgContent::new(db_pool));
    let sessions = Arc::new(InMemorySessionStore::new());

    // Spawn periodic idle session cleanup task
    let cleanup_sessions = Arc::clone(&sessions);
    let cleanup_interval_secs = config.conversation.cleanup_interval_seconds;
    let idle_minutes = config.conversation.session_idle_minutes;
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(cleanup_interval_secs));
        loop {
            interval.tick().await;
            let cutoff = Utc::now() - chrono::Duration::minutes(idle_minutes);
            match cleanup_sessions.purge_idle(cutoff).await {
                Ok(count) if count > 0 => {
                    tracing::debug!(purged_sessions = count, "Periodic session cleanup");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to purge idle sessions");
                }
            }
        }
    });

    let service = Arc::new(ConversationService::new(
        Engine::new(content),
        sessions,
        config.conversation.notify_speakers,
    ));

    let bot = Bot::new(config.telegram_bot_token);
    telegram::run(bot, service).await;
    Ok(())
}
