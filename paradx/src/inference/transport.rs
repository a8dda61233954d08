//! Transport seam between [`InferenceClient`](super::InferenceClient) and the network.

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use crate::config::InferenceConfig;
use crate::inference::InferenceError;
use crate::inference::models::{ChatCompletionResponse, CreateChatCompletionRequest};

/// Sends one chat-completion request. One call is one attempt; retries and timeouts live in
/// the client.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &CreateChatCompletionRequest) -> Result<ChatCompletionResponse, InferenceError>;
}

/// HTTP transport for OpenAI-compatible `/chat/completions` endpoints.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &InferenceConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: completions_endpoint(&config.base_url)?,
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// `{base_url}/chat/completions`, tolerating a trailing slash on the base.
fn completions_endpoint(base_url: &Url) -> anyhow::Result<Url> {
    let base = base_url.as_str().trim_end_matches('/');
    Ok(Url::parse(&format!("{base}/chat/completions"))?)
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, request: &CreateChatCompletionRequest) -> Result<ChatCompletionResponse, InferenceError> {
        let mut builder = self.client.post(self.endpoint.clone()).json(request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| InferenceError::MalformedResponse(e.to_string()))
    }
}
