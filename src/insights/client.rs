//! Text-generation API client.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::models::AnalysisResult;

const SYSTEM_PROMPT: &str = "You are a productivity analyst. Reply only with a JSON object \
containing the arrays patterns, completionInsights, failureReasons and recommendations, \
each holding 2-3 short strings.";

/// A prompt-in, text-out completion service.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Chat-completions client authenticated with a bearer key.
pub struct OpenAiClient {
    model: String,
    endpoint: String,
    api_key: String,
    http: reqwest::Client,
}

impl OpenAiClient {
    /// Returns `Ok(None)` when no API key is configured.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| Error::ExternalService(format!("failed to build HTTP client: {e}")))?;

        Ok(Some(Self {
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            api_key,
            http,
        }))
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1/chat/completions",
            self.endpoint.trim_end_matches('/')
        );

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "temperature": 0.7,
                "messages": [
                    { "role": "system", "content": SYSTEM_PROMPT },
                    { "role": "user", "content": prompt }
                ]
            }))
            .send()
            .await
            .map_err(|e| Error::ExternalService(format!("request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::ExternalService(format!("read body failed: {e}")))?;
        if !status.is_success() {
            return Err(Error::ExternalService(format!(
                "API returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let json: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| Error::ExternalService(format!("response is not JSON: {e}")))?;
        json.get("choices")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|v| v.get("message"))
            .and_then(|v| v.get("content"))
            .and_then(|v| v.as_str())
            .map(ToString::to_string)
            .ok_or_else(|| {
                Error::ExternalService("response missing choices[0].message.content".to_string())
            })
    }
}

/// Pull the analysis object out of a free-text model reply.
///
/// The object is taken from the first `{` to the last `}`; anything that does
/// not deserialize into all four arrays is rejected.
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult> {
    let json = extract_json_object(raw)?;
    serde_json::from_str(json)
        .map_err(|e| Error::ExternalService(format!("reply JSON does not match analysis shape: {e}")))
}

fn extract_json_object(raw: &str) -> Result<&str> {
    let start = raw
        .find('{')
        .ok_or_else(|| Error::ExternalService("reply did not contain a JSON object".to_string()))?;
    let end = raw
        .rfind('}')
        .ok_or_else(|| Error::ExternalService("reply did not contain a JSON object".to_string()))?;
    if end <= start {
        return Err(Error::ExternalService(
            "reply JSON bounds are invalid".to_string(),
        ));
    }
    Ok(&raw[start..=end])
}
