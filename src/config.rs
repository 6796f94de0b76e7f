//! Configuration management

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Agent configuration, built once at process entry and passed into the
/// dispatcher's dependencies. The generator keys are the only mandatory
/// credentials; tool credentials are optional and gate which capabilities
/// the invoker wires up.
#[derive(Debug, Clone)]
pub struct Config {
    /// Groq API key for the Small Mind (fast generation)
    pub groq_api_key: String,

    /// Anthropic API key for the Big Mind (tool-selection grade)
    pub anthropic_api_key: String,

    /// Telegram bot credentials for Send_Message (optional)
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,

    /// Meta Marketing API credentials for Post_Video_Ad / Campaign_Insight (optional)
    pub meta_ad_account_id: Option<String>,
    pub meta_access_token: Option<String>,

    /// fal.ai key for Create_Ad_from_Image (optional)
    pub fal_api_key: Option<String>,

    /// Append-only interaction log file
    pub log_path: PathBuf,

    /// Video generation poll budget
    pub video_poll_max_attempts: u32,
    pub video_poll_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let groq_api_key =
            std::env::var("GROQ_API_KEY").context("GROQ_API_KEY not set - Small Mind unavailable")?;
        let anthropic_api_key = std::env::var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY not set - Big Mind unavailable")?;

        let telegram_bot_token = std::env::var("TELEGRAM_BOT_TOKEN").ok();
        let telegram_chat_id = std::env::var("TELEGRAM_CHAT_ID").ok();
        let meta_ad_account_id = std::env::var("META_AD_ACCOUNT_ID").ok();
        let meta_access_token = std::env::var("META_ACCESS_TOKEN").ok();
        let fal_api_key = std::env::var("FAL_KEY").ok();

        let log_path = std::env::var("CMO_LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("interactions.log"));

        let video_poll_max_attempts = std::env::var("CMO_VIDEO_POLL_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let video_poll_interval = std::env::var("CMO_VIDEO_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));

        Ok(Self {
            groq_api_key,
            anthropic_api_key,
            telegram_bot_token,
            telegram_chat_id,
            meta_ad_account_id,
            meta_access_token,
            fal_api_key,
            log_path,
            video_poll_max_attempts,
            video_poll_interval,
        })
    }
}
