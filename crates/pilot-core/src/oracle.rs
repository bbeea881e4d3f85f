//! The decision oracle boundary: one blocking multimodal request per cycle.
//!
//! `OracleClient` is the seam the episode driver depends on; the concrete
//! `ClaudeOracle` speaks an Anthropic-style messages endpoint. No retry or
//! backoff lives here: a caller wanting resilience wraps the trait.

use std::future::Future;
use std::pin::Pin;
use std::{error::Error, fmt};

use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Protocol version header value sent with every request.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Transport or service failure contacting the oracle. Fatal to the episode
/// unless a wrapping policy supplies retries; parsing failures of a
/// *successful* response body are handled downstream by the interpreter.
#[derive(Debug)]
pub struct OracleUnavailable(pub String);

impl fmt::Display for OracleUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "oracle unavailable: {}", self.0)
    }
}

impl Error for OracleUnavailable {}

/// Boundary the episode driver uses to ask for the next plan.
pub trait OracleClient: Send + Sync {
    /// Sends one frame plus prompts and returns the raw response text.
    fn decide<'a>(
        &'a self,
        system_prompt: String,
        task_prompt: String,
        image_png_base64: String,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;
}

/// Config for an Anthropic-style messages endpoint.
#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    /// Full endpoint URL, e.g. `https://api.anthropic.com/v1/messages`.
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            api_key: String::new(),
            model: "claude-3-5-sonnet-20240620".to_string(),
            max_tokens: 4096,
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Image { source: ImageSource },
    Text { text: String },
}

#[derive(Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: &'static str,
    data: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
struct ResponseBlock {
    #[serde(default)]
    text: String,
}

fn vision_request(
    cfg: &ClaudeConfig,
    system_prompt: String,
    task_prompt: String,
    image_png_base64: String,
) -> MessagesRequest {
    MessagesRequest {
        model: cfg.model.clone(),
        max_tokens: cfg.max_tokens,
        system: system_prompt,
        messages: vec![Message {
            role: "user",
            content: vec![
                ContentBlock::Image {
                    source: ImageSource {
                        kind: "base64",
                        media_type: "image/png",
                        data: image_png_base64,
                    },
                },
                ContentBlock::Text { text: task_prompt },
            ],
        }],
    }
}

/// Oracle client for a hosted Claude-style multimodal reasoning service.
pub struct ClaudeOracle {
    client: Client,
    cfg: ClaudeConfig,
}

impl ClaudeOracle {
    pub fn new(cfg: ClaudeConfig) -> Self {
        Self {
            client: Client::new(),
            cfg,
        }
    }

    async fn send(
        &self,
        system_prompt: String,
        task_prompt: String,
        image_png_base64: String,
    ) -> anyhow::Result<String> {
        let request = vision_request(&self.cfg, system_prompt, task_prompt, image_png_base64);

        let res = self
            .client
            .post(&self.cfg.endpoint)
            .header("x-api-key", &self.cfg.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| OracleUnavailable(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| OracleUnavailable(format!("non-2xx response: {e}")))?
            .json::<MessagesResponse>()
            .await
            .map_err(|e| OracleUnavailable(format!("response decode failed: {e}")))?;

        let first = res
            .content
            .into_iter()
            .next()
            .ok_or_else(|| OracleUnavailable("response had no content blocks".to_string()))?;
        Ok(first.text)
    }
}

impl OracleClient for ClaudeOracle {
    fn decide<'a>(
        &'a self,
        system_prompt: String,
        task_prompt: String,
        image_png_base64: String,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move { self.send(system_prompt, task_prompt, image_png_base64).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_image_then_text() {
        let cfg = ClaudeConfig {
            model: "m".to_string(),
            ..ClaudeConfig::default()
        };
        let req = vision_request(
            &cfg,
            "system".to_string(),
            "Your next moves:".to_string(),
            "cGl4ZWxz".to_string(),
        );
        let v = serde_json::to_value(&req).unwrap();

        assert_eq!(v["model"], "m");
        assert_eq!(v["max_tokens"], 4096);
        assert_eq!(v["system"], "system");
        let content = &v["messages"][0]["content"];
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["type"], "base64");
        assert_eq!(content[0]["source"]["media_type"], "image/png");
        assert_eq!(content[0]["source"]["data"], "cGl4ZWxz");
        assert_eq!(content[1]["type"], "text");
        assert_eq!(content[1]["text"], "Your next moves:");
    }

    #[test]
    fn unavailable_error_is_downcastable() {
        let err = anyhow::Error::new(OracleUnavailable("boom".to_string()));
        assert!(err.is::<OracleUnavailable>());
        assert!(format!("{err}").contains("oracle unavailable: boom"));
    }
}
