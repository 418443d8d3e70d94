// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! AI step descriptions.
//!
//! Sends the flattened step image to an OpenAI-compatible chat
//! completions endpoint and returns the generated description. The
//! request blocks, so callers run it on a worker thread.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};
use thiserror::Error;

const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";

const PROMPT: &str = "This screenshot is one step of a software tutorial. \
Describe the action the user should take in this step, in one or two \
concise imperative sentences. Mention the relevant UI elements by name. \
Reply with the description only.";

#[derive(Debug, Error)]
pub enum DescribeError {
    #[error("no API key configured (set STEPSCRIBE_API_KEY)")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] Box<ureq::Error>),

    #[error("failed to read response: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected response shape: no description in reply")]
    BadResponse,
}

/// Endpoint configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct DescribeConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

impl DescribeConfig {
    /// Build a configuration from `STEPSCRIBE_API_KEY`,
    /// `STEPSCRIBE_API_URL` and `STEPSCRIBE_MODEL`. Only the key is
    /// required.
    pub fn from_env() -> Result<Self, DescribeError> {
        let api_key = std::env::var("STEPSCRIBE_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(DescribeError::MissingApiKey)?;
        Ok(Self {
            api_key,
            api_url: std::env::var("STEPSCRIBE_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            model: std::env::var("STEPSCRIBE_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        })
    }
}

/// Request a description for a flattened step image (JPEG bytes).
pub fn describe_step_image(
    config: &DescribeConfig,
    jpeg: &[u8],
) -> Result<String, DescribeError> {
    let body = request_body(&config.model, jpeg);
    let response = ureq::post(&config.api_url)
        .set("Authorization", &format!("Bearer {}", config.api_key))
        .send_json(body)
        .map_err(Box::new)?;
    let reply: Value = response.into_json()?;
    extract_description(&reply)
}

fn request_body(model: &str, jpeg: &[u8]) -> Value {
    json!({
        "model": model,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "text", "text": PROMPT },
                {
                    "type": "image_url",
                    "image_url": {
                        "url": format!("data:image/jpeg;base64,{}", BASE64.encode(jpeg)),
                    },
                },
            ],
        }],
    })
}

/// Pull the assistant text out of a chat completions reply.
fn extract_description(reply: &Value) -> Result<String, DescribeError> {
    let content = reply["choices"][0]["message"]["content"]
        .as_str()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or(DescribeError::BadResponse)?;
    Ok(content.to_string())
}
