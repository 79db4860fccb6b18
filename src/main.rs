use anyhow::{Context, Result};
use livechat_moderator::config::Config;
use livechat_moderator::moderator::{ModerationSettings, Moderator};
use livechat_moderator::profanity::Filter;
use livechat_moderator::retry::{with_retry_if, RetryConfig};
use livechat_moderator::youtube::{YouTubeClient, YouTubeError};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("livechat_moderator=info".parse()?),
        )
        .init();

    info!("Starting live chat moderator");

    let config = Config::from_env()?;
    config.require_moderation_ready()?;

    // Build the filter before touching the network so a bad database fails fast
    let min_severity = config.min_severity()?;
    let filter = Filter::from_file(&config.profanity_database, min_severity)
        .with_context(|| format!("Failed to load {}", config.profanity_database))?;
    info!(
        "Loaded {} words across {} languages from {} ({} checked at min severity {})",
        filter.database().word_count(),
        filter.database().language_count(),
        config.profanity_database,
        filter.effective_word_count(),
        min_severity
    );

    let mut client = YouTubeClient::from_config(&config)?;

    if client.live_chat_id().is_empty() {
        if let Some(video_id) = &config.video_id {
            let live_chat_id = with_retry_if(
                &RetryConfig::startup(),
                "Resolve live chat id",
                || client.get_live_chat_id(video_id),
                YouTubeError::is_retryable,
            )
            .await
            .with_context(|| format!("Failed to find the live chat for video {}", video_id))?;
            client.set_live_chat_id(&live_chat_id);
        }
    }

    let moderator = Moderator::new(
        client,
        Arc::new(filter),
        ModerationSettings::from_config(&config),
    );

    moderator
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(())
}
