use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::config::InferenceConfig;
use crate::inference::models::{ChatCompletionResponse, CreateChatCompletionRequest, PromptRequest};
use crate::inference::retry::{FixedBackoff, RetryPolicy};
use crate::inference::transport::{ChatTransport, HttpTransport};
use crate::inference::InferenceError;

/// Instruction sent as the system message on every call.
pub const SYSTEM_PROMPT: &str = "You are a medical assistant specialized in detecting facial and speech paralysis.";

/// Retrying chat-completion client.
///
/// [`complete`](Self::complete) never fails: once retries are exhausted it returns an empty string.
#[derive(Clone)]
pub struct InferenceClient {
    transport: Arc<dyn ChatTransport>,
    policy: Arc<dyn RetryPolicy>,
    timeout: Duration,
    max_tokens: u32,
    temperature: f32,
}

impl std::fmt::Debug for InferenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceClient")
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl InferenceClient {
    /// Client backed by [`HttpTransport`].
    pub fn new(config: &InferenceConfig) -> anyhow::Result<Self> {
        let transport = HttpTransport::new(config)?;
        debug!(endpoint = %transport.endpoint(), "Inference transport ready");
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    pub fn with_transport(transport: Arc<dyn ChatTransport>, config: &InferenceConfig) -> Self {
        Self {
            transport,
            policy: Arc::new(FixedBackoff::from(&config.retry)),
            timeout: config.timeout,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    pub fn build_request(&self, prompt: &str, model: &str) -> CreateChatCompletionRequest {
        PromptRequest {
            system_message: SYSTEM_PROMPT.to_string(),
            user_message: prompt.to_string(),
            model: model.to_string(),
        }
        .into_request(self.max_tokens, self.temperature)
    }

    /// Send `prompt` to `model` with the configured retry policy and timeout.
    pub async fn complete(&self, prompt: &str, model: &str) -> String {
        self.complete_with(prompt, model, self.policy.as_ref(), self.timeout)
            .await
    }

    /// Trimmed reply text, or `""` when every attempt failed.
    #[instrument(skip(self, prompt, policy), fields(prompt_len = prompt.len()))]
    pub async fn complete_with(&self, prompt: &str, model: &str, policy: &dyn RetryPolicy, timeout: Duration) -> String {
        let request = self.build_request(prompt, model);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match self.attempt(&request, timeout).await {
                Ok(reply) => {
                    debug!(attempt, reply_len = reply.len(), "Inference succeeded");
                    return reply;
                }
                Err(e) => e,
            };

            if !policy.should_retry(attempt, &error) {
                warn!(attempt, error = %error, "Inference failed, giving up");
                return String::new();
            }

            let delay = policy.delay_for(attempt);
            warn!(attempt, error = %error, retry_in = ?delay, "Inference attempt failed");
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt(&self, request: &CreateChatCompletionRequest, timeout: Duration) -> Result<String, InferenceError> {
        let response = tokio::time::timeout(timeout, self.transport.send(request))
            .await
            .map_err(|_| InferenceError::Timeout(timeout))??;
        extract_reply(&response)
    }
}

fn extract_reply(response: &ChatCompletionResponse) -> Result<String, InferenceError> {
    response
        .first_content()
        .map(|content| content.trim().to_string())
        .ok_or_else(|| InferenceError::MalformedResponse("missing choices[0].message.content".to_string()))
}
