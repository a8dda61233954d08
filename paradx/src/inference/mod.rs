//! Outbound calls to the chat-completion service.
//!
//! ```text
//! InferenceClient::complete(prompt, model)
//!   ├─ build_request()            // system instruction + user prompt, fixed sampling params
//!   └─ loop:
//!        ├─ timeout(transport.send())
//!        ├─ Ok  → choices[0].message.content, trimmed → return
//!        └─ Err → policy.should_retry()? sleep(policy.delay_for()) : return ""
//! ```
//!
//! Failures never reach the caller: an empty string means "no answer", and handlers substitute
//! a fallback message. The per-attempt cause is only visible in the logs.

pub mod client;
pub mod models;
pub mod retry;
pub mod transport;

pub use client::{InferenceClient, SYSTEM_PROMPT};
pub use retry::{FixedBackoff, RetryPolicy};
pub use transport::{ChatTransport, HttpTransport};

use std::time::Duration;
use thiserror::Error;

/// Why a single attempt failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// No response within the per-attempt timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection, TLS or body transfer failure
    #[error("request error: {0}")]
    Transport(String),

    /// The service answered with something other than 200
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// 200 response without a usable `choices[0].message.content`
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
