//! Image-to-video generation tool
//!
//! Drives the fal.ai Kling image-to-video model through its queue API:
//! upload the source image if it is a local file, submit the generation
//! request, then poll for the result under a bounded retry budget. The
//! budget is the only thing standing between us and an unbounded hang on
//! a stuck render, so exhaustion is a hard timeout, never a retry.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::error::AgentError;
use crate::tools::ToolResult;

const FAL_QUEUE_URL: &str = "https://queue.fal.run";
const FAL_STORAGE_INITIATE_URL: &str = "https://rest.alpha.fal.ai/storage/upload/initiate";
const KLING_MODEL_PATH: &str = "fal-ai/kling-video/v1.6/pro/image-to-video";

const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 30;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_DURATION: &str = "5";
const DEFAULT_ASPECT_RATIO: &str = "16:9";

/// Poll `poll` up to `max_attempts` times, sleeping `interval` between
/// attempts. `Ok(None)` means "not ready yet"; exhausting the budget is
/// [`AgentError::Timeout`].
pub(crate) async fn poll_with_budget<T, F, Fut>(
    max_attempts: u32,
    interval: Duration,
    mut poll: F,
) -> Result<T, AgentError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Option<T>, AgentError>>,
{
    for attempt in 1..=max_attempts {
        if let Some(value) = poll(attempt).await? {
            return Ok(value);
        }
        if attempt < max_attempts {
            tokio::time::sleep(interval).await;
        }
    }
    Err(AgentError::Timeout {
        attempts: max_attempts,
    })
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    request_id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct InitiateUploadResponse {
    upload_url: String,
    file_url: String,
}

pub struct FalVideoClient {
    client: Client,
    api_key: String,
    queue_url: String,
    max_poll_attempts: u32,
    poll_interval: Duration,
}

impl FalVideoClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            queue_url: FAL_QUEUE_URL.to_string(),
            max_poll_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_budget(mut self, max_attempts: u32, interval: Duration) -> Self {
        self.max_poll_attempts = max_attempts;
        self.poll_interval = interval;
        self
    }

    /// Generate a video, returning the URL of the produced asset.
    pub async fn create_video(
        &self,
        image_ref: &str,
        prompt: &str,
        duration: &str,
        aspect_ratio: &str,
    ) -> Result<String, AgentError> {
        let image_url = if image_ref.starts_with("http://") || image_ref.starts_with("https://") {
            image_ref.to_string()
        } else {
            self.upload_image(image_ref).await?
        };

        let request_id = self.submit(&image_url, prompt, duration, aspect_ratio).await?;
        info!("Video generation submitted: request_id={}", request_id);

        poll_with_budget(self.max_poll_attempts, self.poll_interval, |attempt| {
            let request_id = request_id.clone();
            async move {
                debug!(
                    "Checking video result (attempt {}/{})",
                    attempt, self.max_poll_attempts
                );
                if self.is_completed(&request_id).await? {
                    self.fetch_video_url(&request_id).await.map(Some)
                } else {
                    Ok(None)
                }
            }
        })
        .await
    }

    /// Push a local image into fal storage and return its public URL.
    async fn upload_image(&self, path: &str) -> Result<String, AgentError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AgentError::ExternalCall(format!("failed to read image {path}: {e}")))?;

        let file_name = path.rsplit('/').next().unwrap_or("image");
        let content_type = if file_name.ends_with(".png") {
            "image/png"
        } else {
            "image/jpeg"
        };

        let initiate: InitiateUploadResponse = self
            .client
            .post(FAL_STORAGE_INITIATE_URL)
            .header("Authorization", format!("Key {}", self.api_key))
            .json(&json!({ "file_name": file_name, "content_type": content_type }))
            .send()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("fal upload initiate failed: {e}")))?
            .json()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("fal upload initiate decode failed: {e}")))?;

        let put = self
            .client
            .put(&initiate.upload_url)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("fal image upload failed: {e}")))?;

        if !put.status().is_success() {
            return Err(AgentError::ExternalCall(format!(
                "fal image upload failed with status {}",
                put.status()
            )));
        }

        debug!("Image uploaded to {}", initiate.file_url);
        Ok(initiate.file_url)
    }

    async fn submit(
        &self,
        image_url: &str,
        prompt: &str,
        duration: &str,
        aspect_ratio: &str,
    ) -> Result<String, AgentError> {
        let url = format!("{}/{}", self.queue_url, KLING_MODEL_PATH);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Key {}", self.api_key))
            .json(&json!({
                "prompt": prompt,
                "image_url": image_url,
                "duration": duration,
                "aspect_ratio": aspect_ratio,
            }))
            .send()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("fal submit failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AgentError::ExternalCall(format!(
                "fal submit error {status}: {text}"
            )));
        }

        let submit: SubmitResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("fal submit decode failed: {e}")))?;
        Ok(submit.request_id)
    }

    async fn is_completed(&self, request_id: &str) -> Result<bool, AgentError> {
        let url = format!(
            "{}/{}/requests/{}/status",
            self.queue_url, KLING_MODEL_PATH, request_id
        );
        let status: StatusResponse = self
            .client
            .get(&url)
            .header("Authorization", format!("Key {}", self.api_key))
            .send()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("fal status check failed: {e}")))?
            .json()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("fal status decode failed: {e}")))?;

        Ok(status.status == "COMPLETED")
    }

    async fn fetch_video_url(&self, request_id: &str) -> Result<String, AgentError> {
        let url = format!(
            "{}/{}/requests/{}",
            self.queue_url, KLING_MODEL_PATH, request_id
        );
        let body: Value = self
            .client
            .get(&url)
            .header("Authorization", format!("Key {}", self.api_key))
            .send()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("fal result fetch failed: {e}")))?
            .json()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("fal result decode failed: {e}")))?;

        body.get("video")
            .and_then(|v| v.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AgentError::ExternalCall(format!("missing video URL in response: {body}")))
    }

    pub async fn run(&self, params: &Map<String, Value>) -> ToolResult {
        let Some(image_path) = params.get("image_path").and_then(Value::as_str) else {
            return ToolResult::fail("parameter 'image_path' must be a string");
        };
        let Some(description) = params.get("video_description").and_then(Value::as_str) else {
            return ToolResult::fail("parameter 'video_description' must be a string");
        };
        let duration = params
            .get("duration")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_DURATION);
        let aspect_ratio = params
            .get("aspect_ratio")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_ASPECT_RATIO);

        match self
            .create_video(image_path, description, duration, aspect_ratio)
            .await
        {
            Ok(video_url) => ToolResult::ok(json!({ "video_url": video_url })),
            Err(e) => ToolResult::fail(format!("video generation failed: {e}")),
        }
    }
}
