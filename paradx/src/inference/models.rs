//! Wire types for the OpenAI-compatible chat-completion API.
//!
//! The request body is async-openai's [`CreateChatCompletionRequest`]. Replies are read into a
//! narrower local type: providers routed through OpenRouter do not always send the `id`,
//! `created` or `object` fields async-openai's response type requires.

use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage, ChatCompletionRequestSystemMessageContent,
    ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent,
};
use serde::{Deserialize, Serialize};

pub use async_openai::types::chat::CreateChatCompletionRequest;

/// A single prompt exchange, built fresh for every call. No history is carried over.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub system_message: String,
    pub user_message: String,
    pub model: String,
}

impl PromptRequest {
    /// POST body for `/chat/completions`: the system turn, then the user turn.
    #[allow(deprecated)]
    pub fn into_request(self, max_tokens: u32, temperature: f32) -> CreateChatCompletionRequest {
        CreateChatCompletionRequest {
            model: self.model,
            messages: vec![
                ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                    content: ChatCompletionRequestSystemMessageContent::Text(self.system_message),
                    name: None,
                }),
                ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                    content: ChatCompletionRequestUserMessageContent::Text(self.user_message),
                    name: None,
                }),
            ],
            // OpenRouter and older OpenAI-compatible servers read `max_tokens`
            max_tokens: Some(max_tokens),
            temperature: Some(temperature),
            ..Default::default()
        }
    }
}

/// Plain text of a system or user turn.
pub fn message_text(message: &ChatCompletionRequestMessage) -> Option<&str> {
    match message {
        ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
            content: ChatCompletionRequestSystemMessageContent::Text(text),
            ..
        })
        | ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(text),
            ..
        }) => Some(text),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Response carrying a single assistant message.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                message: ChoiceMessage {
                    content: Some(content.into()),
                },
            }],
        }
    }

    /// `choices[0].message.content`, if present.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().and_then(|choice| choice.message.content.as_deref())
    }
}
