use crate::profanity::Severity;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_PROFANITY_DATABASE: &str = "data/profanity.json";
pub const DEFAULT_MIN_SEVERITY: &str = "mild";
pub const DEFAULT_POLLING_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // YouTube
    #[serde(default)]
    pub youtube_api_key: String,
    /// OAuth access token with moderator scope; required to delete or send messages.
    #[serde(default)]
    pub oauth_access_token: Option<String>,
    #[serde(default)]
    pub live_chat_id: String,
    /// Used to look up the active live chat when `live_chat_id` is empty.
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub api_base_url: String,

    // Filtering
    #[serde(default)]
    pub profanity_database: String,
    #[serde(default)]
    pub min_severity: String,

    // Polling (seconds)
    #[serde(default)]
    pub polling_interval: u64,

    // Moderation actions
    #[serde(default = "default_delete_messages")]
    pub delete_messages: bool,
    /// Sent to chat after a flagged message. `{author}` is replaced by the author's name.
    #[serde(default)]
    pub warning_message: Option<String>,
}

fn default_delete_messages() -> bool {
    true
}

impl Config {
    /// Load configuration from a JSON file, then apply defaults and
    /// environment overrides.
    ///
    /// `YOUTUBE_API_KEY` and `YOUTUBE_OAUTH_TOKEN` take precedence over the
    /// file so secrets can stay out of it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        let config = config.with_env_overrides().with_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Load from `CONFIG_PATH`, falling back to `config.json`.
    pub fn from_env() -> Result<Self> {
        let path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("YOUTUBE_API_KEY") {
            self.youtube_api_key = key;
        }
        if let Ok(token) = std::env::var("YOUTUBE_OAUTH_TOKEN") {
            self.oauth_access_token = Some(token);
        }
        self
    }

    fn with_defaults(mut self) -> Self {
        if self.polling_interval == 0 {
            self.polling_interval = DEFAULT_POLLING_INTERVAL_SECS;
        }
        if self.min_severity.is_empty() {
            self.min_severity = DEFAULT_MIN_SEVERITY.to_string();
        }
        if self.profanity_database.is_empty() {
            self.profanity_database = DEFAULT_PROFANITY_DATABASE.to_string();
        }
        if self.api_base_url.is_empty() {
            self.api_base_url = DEFAULT_API_BASE_URL.to_string();
        }
        // Treat blank optional strings as unset
        self.oauth_access_token = self.oauth_access_token.filter(|t| !t.trim().is_empty());
        self.video_id = self.video_id.filter(|v| !v.trim().is_empty());
        self.warning_message = self.warning_message.filter(|m| !m.trim().is_empty());
        self
    }

    fn validate(&self) -> Result<()> {
        self.min_severity()?;
        Ok(())
    }

    /// The configured threshold as a typed severity.
    pub fn min_severity(&self) -> Result<Severity> {
        self.min_severity
            .parse::<Severity>()
            .with_context(|| format!("Invalid min_severity in config: '{}'", self.min_severity))
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval)
    }

    /// Check that the API key is configured.
    pub fn require_api_key(&self) -> Result<()> {
        if self.youtube_api_key.is_empty() {
            anyhow::bail!(
                "youtube_api_key not set. Add it to the config file or set YOUTUBE_API_KEY."
            );
        }
        Ok(())
    }

    /// Check that there is a live chat to watch.
    pub fn require_chat_target(&self) -> Result<()> {
        if self.live_chat_id.is_empty() && self.video_id.is_none() {
            anyhow::bail!("Neither live_chat_id nor video_id is set in the config file");
        }
        Ok(())
    }

    /// Check that moderation actions can be authorized.
    pub fn require_oauth_for_actions(&self) -> Result<()> {
        let acts = self.delete_messages || self.warning_message.is_some();
        if acts && self.oauth_access_token.is_none() {
            anyhow::bail!(
                "Deleting or sending chat messages requires oauth_access_token \
                 (or YOUTUBE_OAUTH_TOKEN). Set delete_messages to false and remove \
                 warning_message to run in report-only mode."
            );
        }
        Ok(())
    }

    /// Everything the moderator daemon needs before it touches the network.
    ///
    /// A missing OAuth token is fatal while deletes or warnings are enabled,
    /// since every action would be rejected by the API.
    pub fn require_moderation_ready(&self) -> Result<()> {
        self.require_api_key()?;
        self.require_chat_target()?;
        self.require_oauth_for_actions()
    }
}
