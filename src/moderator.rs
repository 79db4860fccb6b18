use crate::config::Config;
use crate::profanity::Filter;
use crate::retry::{with_retry_if, RetryConfig};
use crate::youtube::{ChatMessage, YouTubeClient, YouTubeError};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What to do with flagged messages.
#[derive(Debug, Clone)]
pub struct ModerationSettings {
    pub delete_messages: bool,
    /// `{author}` is replaced with the flagged author's display name.
    pub warning_message: Option<String>,
    /// Lower bound between polls; the server may ask for longer.
    pub polling_interval: Duration,
}

impl ModerationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            delete_messages: config.delete_messages,
            warning_message: config.warning_message.clone(),
            polling_interval: config.polling_interval(),
        }
    }

    fn render_warning(&self, author: &str) -> Option<String> {
        self.warning_message
            .as_ref()
            .map(|template| template.replace("{author}", author))
    }
}

/// Counters for one poll (or, summed, for a whole session).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Text messages that were classified.
    pub scanned: usize,
    pub flagged: usize,
    pub deleted: usize,
    pub warned: usize,
    /// Delay before the next poll.
    pub next_poll: Duration,
    /// The broadcast is over; no further messages will arrive.
    pub chat_ended: bool,
}

impl PollSummary {
    fn absorb(&mut self, other: &PollSummary) {
        self.scanned += other.scanned;
        self.flagged += other.flagged;
        self.deleted += other.deleted;
        self.warned += other.warned;
    }
}

/// Polls a live chat and acts on messages the filter flags.
pub struct Moderator {
    client: YouTubeClient,
    filter: Arc<Filter>,
    settings: ModerationSettings,
    page_token: Option<String>,
    started_at: DateTime<Utc>,
    totals: PollSummary,
}

impl Moderator {
    pub fn new(client: YouTubeClient, filter: Arc<Filter>, settings: ModerationSettings) -> Self {
        Self {
            client,
            filter,
            settings,
            page_token: None,
            started_at: Utc::now(),
            totals: PollSummary::default(),
        }
    }

    /// Messages published before this instant are not moderated.
    ///
    /// The first page of a live chat replays recent history; by default only
    /// messages sent after the moderator was created are acted on.
    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }

    pub fn page_token(&self) -> Option<&str> {
        self.page_token.as_deref()
    }

    pub fn totals(&self) -> &PollSummary {
        &self.totals
    }

    /// Fetch one page of chat messages and moderate it.
    pub async fn poll_once(&mut self) -> Result<PollSummary> {
        let client = &self.client;
        let page_token = self.page_token.clone();

        let page = with_retry_if(
            &RetryConfig::chat_poll(),
            "Fetch live chat messages",
            || client.get_messages(page_token.as_deref()),
            YouTubeError::is_retryable,
        )
        .await
        .context("Failed to fetch live chat messages")?;

        if let Some(token) = page.next_page_token.as_deref().filter(|t| !t.is_empty()) {
            self.page_token = Some(token.to_string());
        }

        let mut summary = PollSummary {
            next_poll: page
                .polling_interval()
                .map_or(self.settings.polling_interval, |server| {
                    server.max(self.settings.polling_interval)
                }),
            chat_ended: page.offline_at.is_some(),
            ..Default::default()
        };

        for message in &page.items {
            self.moderate(message, &mut summary).await;
        }

        self.totals.absorb(&summary);
        Ok(summary)
    }

    async fn moderate(&self, message: &ChatMessage, summary: &mut PollSummary) {
        if message
            .snippet
            .published_at
            .is_some_and(|published| published < self.started_at)
        {
            return;
        }

        let Some(text) = message.text() else {
            return;
        };
        if message.from_chat_staff() {
            debug!("Not moderating message {} from chat staff", message.id);
            return;
        }
        summary.scanned += 1;

        let Some(hit) = self.filter.find_match(text) else {
            return;
        };
        summary.flagged += 1;

        info!(
            "Flagged message {} from {} ({} word \"{}\")",
            message.id,
            message.author_name(),
            hit.language,
            hit.word
        );

        if self.settings.delete_messages {
            let result = with_retry_if(
                &RetryConfig::chat_action(),
                "Delete chat message",
                || self.client.delete_message(&message.id),
                YouTubeError::is_retryable,
            )
            .await;

            match result {
                Ok(()) => {
                    summary.deleted += 1;
                    debug!("Deleted message {}", message.id);
                }
                Err(e) => warn!("Failed to delete message {}: {}", message.id, e),
            }
        }

        if let Some(warning) = self.settings.render_warning(message.author_name()) {
            let result = with_retry_if(
                &RetryConfig::chat_action(),
                "Send chat warning",
                || self.client.send_message(&warning),
                YouTubeError::is_retryable,
            )
            .await;

            match result {
                Ok(()) => summary.warned += 1,
                Err(e) => warn!("Failed to warn {}: {}", message.author_name(), e),
            }
        }
    }

    /// Poll until `shutdown` resolves or the broadcast ends.
    ///
    /// Transient poll failures are logged and retried on the next interval.
    /// A permanent failure (unknown chat, revoked access) ends the session
    /// with an error.
    pub async fn run<F>(mut self, shutdown: F) -> Result<PollSummary>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            "Moderating live chat {} (min severity: {}, polling every {:?})",
            self.client.live_chat_id(),
            self.filter.min_severity(),
            self.settings.polling_interval
        );

        loop {
            let polled = tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                polled = self.poll_once() => polled,
            };

            let delay = match polled {
                Ok(summary) if summary.chat_ended => {
                    info!("Live chat has ended");
                    break;
                }
                Ok(summary) => {
                    if summary.flagged > 0 {
                        info!(
                            "Scanned {} messages: {} flagged, {} deleted, {} warned",
                            summary.scanned, summary.flagged, summary.deleted, summary.warned
                        );
                    } else {
                        debug!("Scanned {} messages, none flagged", summary.scanned);
                    }
                    summary.next_poll
                }
                Err(e) => {
                    let api_error = e.downcast_ref::<YouTubeError>();
                    if api_error.is_some_and(YouTubeError::is_chat_ended) {
                        info!("Live chat has ended");
                        break;
                    }
                    if api_error.is_some_and(|err| !err.is_retryable()) {
                        error!("Giving up on live chat {}: {:#}", self.client.live_chat_id(), e);
                        self.log_totals();
                        return Err(e);
                    }
                    error!("Poll failed: {:#}", e);
                    self.settings.polling_interval
                }
            };

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.log_totals();
        Ok(self.totals)
    }

    fn log_totals(&self) {
        info!(
            "✓ Moderation stopped: {} scanned, {} flagged, {} deleted, {} warned",
            self.totals.scanned, self.totals.flagged, self.totals.deleted, self.totals.warned
        );
    }
}
