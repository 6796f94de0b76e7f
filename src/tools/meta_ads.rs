//! Meta Marketing API tools
//!
//! Two capabilities against the Graph API: publishing a video asset to the
//! ad account (download the remote file, re-upload as multipart form data)
//! and pulling campaign performance metrics for a date range.

use reqwest::multipart;
use reqwest::Client;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::error::AgentError;
use crate::tools::ToolResult;

const GRAPH_API_URL: &str = "https://graph.facebook.com/v20.0";
const INSIGHT_FIELDS: &str = "campaign_id,campaign_name,impressions,clicks,spend";

pub struct MetaAdsClient {
    client: Client,
    ad_account_id: String,
    access_token: String,
    graph_url: String,
}

impl MetaAdsClient {
    pub fn new(ad_account_id: &str, access_token: &str) -> Self {
        Self {
            client: Client::new(),
            ad_account_id: ad_account_id.to_string(),
            access_token: access_token.to_string(),
            graph_url: GRAPH_API_URL.to_string(),
        }
    }

    pub fn with_graph_url(mut self, graph_url: &str) -> Self {
        self.graph_url = graph_url.trim_end_matches('/').to_string();
        self
    }

    /// Publish a remote video to the ad account, returning the created
    /// asset id.
    pub async fn upload_video(
        &self,
        remote_file_path: &str,
        file_name: &str,
        title: &str,
        description: &str,
    ) -> Result<String, AgentError> {
        debug!("Downloading video from {}", remote_file_path);
        let download = self
            .client
            .get(remote_file_path)
            .send()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("video download failed: {e}")))?;

        if !download.status().is_success() {
            return Err(AgentError::ExternalCall(format!(
                "video download failed with status {}",
                download.status()
            )));
        }

        let data = download
            .bytes()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("video download failed: {e}")))?
            .to_vec();

        let part = multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str("video/mp4")
            .map_err(|e| AgentError::ExternalCall(format!("invalid upload part: {e}")))?;
        let form = multipart::Form::new()
            .part("source", part)
            .text("title", title.to_string())
            .text("description", description.to_string());

        let url = format!("{}/act_{}/advideos", self.graph_url, self.ad_account_id);
        info!("Uploading ad video '{}' to account {}", title, self.ad_account_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("ad video upload failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AgentError::ExternalCall(format!(
                "ad video upload error {status}: {text}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("ad video upload decode failed: {e}")))?;

        body.get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AgentError::ExternalCall(format!("missing video id in response: {body}")))
    }

    /// Aggregate campaign performance rows for a date range.
    pub async fn campaign_insight(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Value, AgentError> {
        let time_range = json!({ "since": start_date, "until": end_date }).to_string();
        let url = format!("{}/act_{}/insights", self.graph_url, self.ad_account_id);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("fields", INSIGHT_FIELDS),
                ("level", "campaign"),
                ("time_range", &time_range),
                ("access_token", &self.access_token),
            ])
            .send()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("insights request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AgentError::ExternalCall(format!(
                "insights error {status}: {text}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("insights decode failed: {e}")))
    }

    pub async fn run_upload(&self, params: &Map<String, Value>) -> ToolResult {
        let get = |key: &str| params.get(key).and_then(Value::as_str);
        let (Some(remote), Some(file_name), Some(title), Some(description)) = (
            get("remote_file_path"),
            get("file_name"),
            get("title"),
            get("description"),
        ) else {
            return ToolResult::fail("upload parameters must be strings");
        };

        match self.upload_video(remote, file_name, title, description).await {
            Ok(video_id) => ToolResult::ok(json!({ "video_id": video_id })),
            Err(e) => ToolResult::fail(format!("ad video upload failed: {e}")),
        }
    }

    pub async fn run_insight(&self, params: &Map<String, Value>) -> ToolResult {
        let (Some(start), Some(end)) = (
            params.get("start_date").and_then(Value::as_str),
            params.get("end_date").and_then(Value::as_str),
        ) else {
            return ToolResult::fail("date parameters must be 'YYYY-MM-DD' strings");
        };

        match self.campaign_insight(start, end).await {
            Ok(rows) => ToolResult::ok(rows),
            Err(e) => ToolResult::fail(format!("campaign insight failed: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> MetaAdsClient {
        MetaAdsClient::new("123", "graph-token").with_graph_url(&server.uri())
    }

    fn insight_params(start: &str, end: &str) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("start_date".to_string(), Value::from(start));
        params.insert("end_date".to_string(), Value::from(end));
        params
    }

    #[tokio::test]
    async fn test_insight_returns_campaign_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/act_123/insights"))
            .and(query_param("level", "campaign"))
            .and(query_param(
                "time_range",
                r#"{"since":"2026-08-01","until":"2026-08-21"}"#,
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data": [{"campaign_id": "c1", "campaign_name": "Launch", "impressions": "900", "clicks": "31", "spend": "12.50"}]}"#,
            ))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .run_insight(&insight_params("2026-08-01", "2026-08-21"))
            .await;
        assert!(result.success);
        assert_eq!(result.details["data"][0]["campaign_name"], "Launch");
    }

    #[tokio::test]
    async fn test_insight_error_status_folds_to_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/act_123/insights"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"error": {"message": "Invalid parameter"}}"#,
            ))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .run_insight(&insight_params("2026-08-21", "2026-08-01"))
            .await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_upload_downloads_then_publishes_video() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assets/promo.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 64]))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/act_123/advideos"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id": "999"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let mut params = Map::new();
        let remote = format!("{}/assets/promo.mp4", server.uri());
        params.insert("remote_file_path".to_string(), Value::from(remote));
        params.insert("file_name".to_string(), Value::from("promo.mp4"));
        params.insert("title".to_string(), Value::from("Summer launch"));
        params.insert("description".to_string(), Value::from("30s cut"));

        let result = client_for(&server).run_upload(&params).await;
        assert!(result.success);
        assert_eq!(result.details["video_id"], "999");
    }
}
