//! Tool Registry and Invoker
//!
//! Static, read-only table of the known side-effecting capabilities plus the
//! uniform dispatch from `(tool_name, parameters)` to a concrete tool and
//! back to a [`ToolResult`]. The registry drives both the natural-language
//! tool descriptions fed to the minds and the mandatory-parameter check
//! performed before any tool function runs.

pub mod meta_ads;
pub mod report;
pub mod telegram;
pub mod video;

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::config::Config;
use crate::generation::TextGenerator;
use meta_ads::MetaAdsClient;
use report::ReportWriter;
use telegram::TelegramSender;
use video::FalVideoClient;

/// Closed set of registered tool identifiers.
///
/// Wire names keep the `Snake_Case` form the original prompts trained the
/// minds on; anything outside this set is handled by the explicit unknown
/// fallback in [`ToolInvoker::invoke`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    WriteReport,
    SendMessage,
    CreateAdFromImage,
    PostVideoAd,
    CampaignInsight,
}

impl ToolName {
    pub const ALL: [ToolName; 5] = [
        Self::WriteReport,
        Self::SendMessage,
        Self::CreateAdFromImage,
        Self::PostVideoAd,
        Self::CampaignInsight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WriteReport => "Write_Report",
            Self::SendMessage => "Send_Message",
            Self::CreateAdFromImage => "Create_Ad_from_Image",
            Self::PostVideoAd => "Post_Video_Ad",
            Self::CampaignInsight => "Campaign_Insight",
        }
    }

    pub fn from_str(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }

    /// One-line description fed verbatim into both minds' system prompts.
    pub fn description(&self) -> &'static str {
        match self {
            Self::WriteReport => "Creates a detailed marketing report on a given topic",
            Self::SendMessage => "Sends a text notification to the team via Telegram",
            Self::CreateAdFromImage => {
                "Creates a video advertisement from a source image and a video description"
            }
            Self::PostVideoAd => {
                "Publishes a remote video asset to the Meta ad account as an ad video"
            }
            Self::CampaignInsight => {
                "Retrieves campaign performance metrics (impressions, clicks, spend) for a date range"
            }
        }
    }

    /// Mandatory parameter keys, checked before dispatch.
    pub fn required_params(&self) -> &'static [&'static str] {
        match self {
            Self::WriteReport => &["topic"],
            Self::SendMessage => &["message"],
            Self::CreateAdFromImage => &["image_path", "video_description"],
            Self::PostVideoAd => &["remote_file_path", "file_name", "title", "description"],
            Self::CampaignInsight => &["start_date", "end_date"],
        }
    }
}

/// Registered tool entry: name, description, required parameter list.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required_parameters: &'static [&'static str],
}

/// The static tool registry. Read-only at run time, safe to share across
/// the synchronous and background paths.
pub static REGISTRY: Lazy<Vec<ToolSpec>> = Lazy::new(|| {
    ToolName::ALL
        .iter()
        .map(|tool| ToolSpec {
            name: tool.as_str(),
            description: tool.description(),
            required_parameters: tool.required_params(),
        })
        .collect()
});

/// Uniform envelope returned by every tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub success: bool,
    pub details: Value,
}

impl ToolResult {
    pub fn ok(details: impl Into<Value>) -> Self {
        Self {
            success: true,
            details: details.into(),
        }
    }

    pub fn fail(details: impl Into<Value>) -> Self {
        Self {
            success: false,
            details: details.into(),
        }
    }
}

/// Dispatches validated tool calls to the concrete capability wrappers.
///
/// Unconfigured capabilities stay `None`; invoking them yields a failed
/// `ToolResult` rather than an error. Tool functions never raise - every
/// failure folds into the envelope.
pub struct ToolInvoker {
    report: ReportWriter,
    telegram: Option<TelegramSender>,
    video: Option<FalVideoClient>,
    ads: Option<MetaAdsClient>,
}

impl ToolInvoker {
    /// Bare invoker with only the report capability wired up.
    pub fn new(report_generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            report: ReportWriter::new(report_generator),
            telegram: None,
            video: None,
            ads: None,
        }
    }

    /// Wire up every capability the config carries credentials for.
    pub fn from_config(config: &Config, report_generator: Arc<dyn TextGenerator>) -> Self {
        let telegram = match (&config.telegram_bot_token, &config.telegram_chat_id) {
            (Some(token), Some(chat_id)) => Some(TelegramSender::new(token, chat_id)),
            _ => None,
        };
        let video = config.fal_api_key.as_deref().map(|key| {
            FalVideoClient::new(key)
                .with_poll_budget(config.video_poll_max_attempts, config.video_poll_interval)
        });
        let ads = match (&config.meta_ad_account_id, &config.meta_access_token) {
            (Some(account), Some(token)) => Some(MetaAdsClient::new(account, token)),
            _ => None,
        };

        Self {
            report: ReportWriter::new(report_generator),
            telegram,
            video,
            ads,
        }
    }

    /// Execute a named tool with a parameter bag.
    ///
    /// Unknown names and missing required parameters short-circuit before
    /// any concrete tool function (and therefore any external system) is
    /// touched.
    pub async fn invoke(&self, name: &str, params: &Map<String, Value>) -> ToolResult {
        let Some(tool) = ToolName::from_str(name) else {
            return ToolResult::fail("tool not implemented");
        };

        let missing: Vec<&str> = tool
            .required_params()
            .iter()
            .copied()
            .filter(|key| {
                !params
                    .get(*key)
                    .is_some_and(|v| !v.is_null())
            })
            .collect();
        if !missing.is_empty() {
            return ToolResult::fail(format!(
                "missing required parameters: [{}]",
                missing.join(", ")
            ));
        }

        info!("Invoking tool {} with params: {}", tool.as_str(), json!(params));

        match tool {
            ToolName::WriteReport => self.report.write(params).await,
            ToolName::SendMessage => match &self.telegram {
                Some(sender) => sender.run(params).await,
                None => ToolResult::fail("telegram sender not configured"),
            },
            ToolName::CreateAdFromImage => match &self.video {
                Some(client) => client.run(params).await,
                None => ToolResult::fail("video generation not configured"),
            },
            ToolName::PostVideoAd => match &self.ads {
                Some(client) => client.run_upload(params).await,
                None => ToolResult::fail("ad platform not configured"),
            },
            ToolName::CampaignInsight => match &self.ads {
                Some(client) => client.run_insight(params).await,
                None => ToolResult::fail("ad platform not configured"),
            },
        }
    }
}
