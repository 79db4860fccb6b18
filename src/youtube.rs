use crate::config::Config;
use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TEXT_MESSAGE_EVENT: &str = "textMessageEvent";

/// Errors from the YouTube Data API.
#[derive(Debug, thiserror::Error)]
pub enum YouTubeError {
    #[error("Request to YouTube API failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("YouTube API error ({status}): {body}")]
    Api { status: StatusCode, body: String },

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Video {0} is not a live stream or live chat is not available")]
    ChatUnavailable(String),
}

impl YouTubeError {
    /// Transport failures, rate limiting and server errors are worth retrying.
    /// Everything else (bad key, missing permission, bad ids) will fail again.
    pub fn is_retryable(&self) -> bool {
        match self {
            YouTubeError::Request(e) => !e.is_decode() && !e.is_builder(),
            YouTubeError::Api { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            YouTubeError::VideoNotFound(_) | YouTubeError::ChatUnavailable(_) => false,
        }
    }

    /// The API rejects polls on a finished broadcast with 403 `liveChatEnded`
    /// instead of returning a page with `offlineAt`.
    pub fn is_chat_ended(&self) -> bool {
        matches!(
            self,
            YouTubeError::Api { status, body }
                if *status == StatusCode::FORBIDDEN && body.contains("liveChatEnded")
        )
    }
}

// Live chat API types
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    #[serde(default)]
    pub items: Vec<ChatMessage>,
    pub next_page_token: Option<String>,
    /// How long the server asks clients to wait before the next poll.
    pub polling_interval_millis: Option<u64>,
    /// Set once the broadcast has ended.
    pub offline_at: Option<DateTime<Utc>>,
}

impl MessagePage {
    pub fn polling_interval(&self) -> Option<Duration> {
        self.polling_interval_millis.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub snippet: MessageSnippet,
    #[serde(default)]
    pub author_details: AuthorDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSnippet {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub published_at: Option<DateTime<Utc>>,
    pub display_message: Option<String>,
    pub text_message_details: Option<TextMessageDetails>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMessageDetails {
    #[serde(default)]
    pub message_text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDetails {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub is_chat_owner: bool,
    #[serde(default)]
    pub is_chat_moderator: bool,
}

impl ChatMessage {
    /// The text typed by the author, or `None` for non-text events
    /// (super chats without a comment, membership events, ...).
    pub fn text(&self) -> Option<&str> {
        if let Some(details) = &self.snippet.text_message_details {
            return Some(details.message_text.as_str());
        }
        if self.snippet.kind == TEXT_MESSAGE_EVENT {
            return self.snippet.display_message.as_deref();
        }
        None
    }

    pub fn author_name(&self) -> &str {
        &self.author_details.display_name
    }

    /// Sent by the broadcaster or one of the chat moderators.
    pub fn from_chat_staff(&self) -> bool {
        self.author_details.is_chat_owner || self.author_details.is_chat_moderator
    }
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<Video>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Video {
    live_streaming_details: Option<LiveStreamingDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveStreamingDetails {
    active_live_chat_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct InsertMessageRequest {
    snippet: InsertSnippet,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertSnippet {
    live_chat_id: String,
    #[serde(rename = "type")]
    kind: &'static str,
    text_message_details: TextMessageDetails,
}

/// Thin wrapper around the YouTube Data API v3 live chat endpoints.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    oauth_token: Option<String>,
    live_chat_id: String,
}

impl YouTubeClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        oauth_token: Option<&str>,
        live_chat_id: &str,
    ) -> Result<Self, YouTubeError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            oauth_token: oauth_token.map(str::to_string),
            live_chat_id: live_chat_id.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, YouTubeError> {
        Self::new(
            &config.api_base_url,
            &config.youtube_api_key,
            config.oauth_access_token.as_deref(),
            &config.live_chat_id,
        )
    }

    pub fn live_chat_id(&self) -> &str {
        &self.live_chat_id
    }

    pub fn set_live_chat_id(&mut self, live_chat_id: &str) {
        self.live_chat_id = live_chat_id.to_string();
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self
            .http
            .request(method, format!("{}/youtube/v3/{}", self.base_url, path));

        if !self.api_key.is_empty() {
            request = request.query(&[("key", self.api_key.as_str())]);
        }
        if let Some(token) = &self.oauth_token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn send(request: RequestBuilder) -> Result<reqwest::Response, YouTubeError> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(YouTubeError::Api { status, body });
        }

        Ok(response)
    }

    /// Look up the active live chat id of a live stream.
    pub async fn get_live_chat_id(&self, video_id: &str) -> Result<String, YouTubeError> {
        let request = self
            .request(Method::GET, "videos")
            .query(&[("part", "liveStreamingDetails"), ("id", video_id)]);

        let videos: VideoListResponse = Self::send(request).await?.json().await?;

        let video = videos
            .items
            .into_iter()
            .next()
            .ok_or_else(|| YouTubeError::VideoNotFound(video_id.to_string()))?;

        let chat_id = video
            .live_streaming_details
            .and_then(|details| details.active_live_chat_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| YouTubeError::ChatUnavailable(video_id.to_string()))?;

        info!("Resolved live chat {} for video {}", chat_id, video_id);
        Ok(chat_id)
    }

    /// Fetch the next page of live chat messages.
    ///
    /// Pass the previous page's `next_page_token` to receive only newer
    /// messages; without a token the API replays recent chat history.
    pub async fn get_messages(&self, page_token: Option<&str>) -> Result<MessagePage, YouTubeError> {
        let mut request = self.request(Method::GET, "liveChat/messages").query(&[
            ("liveChatId", self.live_chat_id.as_str()),
            ("part", "snippet,authorDetails"),
        ]);

        if let Some(token) = page_token.filter(|t| !t.is_empty()) {
            request = request.query(&[("pageToken", token)]);
        }

        let page: MessagePage = Self::send(request).await?.json().await?;
        debug!(
            "Fetched {} chat messages (next token: {:?})",
            page.items.len(),
            page.next_page_token
        );

        Ok(page)
    }

    /// Delete a chat message. Requires moderator privileges.
    pub async fn delete_message(&self, message_id: &str) -> Result<(), YouTubeError> {
        let request = self
            .request(Method::DELETE, "liveChat/messages")
            .query(&[("id", message_id)]);

        Self::send(request).await?;
        Ok(())
    }

    /// Post a text message to the live chat.
    pub async fn send_message(&self, text: &str) -> Result<(), YouTubeError> {
        let body = InsertMessageRequest {
            snippet: InsertSnippet {
                live_chat_id: self.live_chat_id.clone(),
                kind: TEXT_MESSAGE_EVENT,
                text_message_details: TextMessageDetails {
                    message_text: text.to_string(),
                },
            },
        };

        let request = self
            .request(Method::POST, "liveChat/messages")
            .query(&[("part", "snippet")])
            .json(&body);

        Self::send(request).await?;
        Ok(())
    }
}
