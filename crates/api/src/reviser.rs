use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use copydesk_core::reviser::{Reviser, ReviserError};

use crate::config::AppConfig;

/// `Reviser` backed by an OpenAI-compatible chat-completions endpoint.
/// The core owns prompt assembly and output cleaning; this client owns
/// transport only.
pub struct HttpReviser {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpReviser {
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.reviser_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: config.reviser_url.clone(),
            model: config.reviser_model.clone(),
            api_key: config.reviser_api_key.clone(),
        })
    }
}

#[async_trait]
impl Reviser for HttpReviser {
    async fn revise(&self, prompt: &str) -> Result<String, ReviserError> {
        let mut request = self.client.post(&self.url).json(&json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                ReviserError::Timeout
            } else {
                ReviserError::Upstream(err.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(ReviserError::Upstream(format!(
                "reviser endpoint returned {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| ReviserError::Upstream(err.to_string()))?;

        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        if content.trim().is_empty() {
            return Err(ReviserError::EmptyOutput);
        }
        Ok(content)
    }
}
