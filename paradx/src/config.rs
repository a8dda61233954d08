//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `PARADX_CONFIG`
//! environment variable. A missing file is not an error: every field has a default.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **OPENROUTER_API_KEY** - Special case: sets `inference.api_key` if present
//! 3. **Environment variables** - Variables prefixed with `PARADX_` override everything above
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `PARADX_MEDIA__MAX_DIMENSION=768` sets the `media.max_dimension` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use paradx::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}:{}", config.host, config.port);
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! PARADX_PORT=8080
//! PARADX_SECRET_KEY="change-me"
//! PARADX_INFERENCE__PARALYSIS_MODEL="meta-llama/llama-3.1-70b-instruct"
//! PARADX_INFERENCE__RETRY__MAX_RETRIES=3
//! PARADX_INFERENCE__TIMEOUT=45s
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, time::Duration};
use url::Url;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "PARADX_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have defaults defined in the `Default` implementations, matching the
/// constants the service shipped with before they were made configurable.
///
/// `Debug` output redacts `secret_key` and `inference.api_key`.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Secret key for signing session cookies (required)
    pub secret_key: Option<String>,
    /// Outbound completion API settings
    pub inference: InferenceConfig,
    /// Image/audio snippet preparation
    pub media: MediaConfig,
    /// Where uploads are written and how large they may be
    pub uploads: UploadConfig,
    /// Chatbot topic gate
    pub chat: ChatConfig,
    /// Registration, password rules and session cookie settings
    pub auth: AuthConfig,
}

/// Chat-completion endpoint configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct InferenceConfig {
    /// Base URL of the OpenAI-compatible API; `/chat/completions` is appended
    pub base_url: Url,
    /// Bearer credential for the API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model used for face and voice analysis
    pub paralysis_model: String,
    /// Model used for the chatbot
    pub chatbot_model: String,
    /// Completion token budget per request
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Timeout for a single attempt
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Retry policy applied to failed attempts
    pub retry: RetryConfig,
}

fn redacted(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "<redacted>")
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secret_key", &redacted(&self.secret_key))
            .field("inference", &self.inference)
            .field("media", &self.media)
            .field("uploads", &self.uploads)
            .field("chat", &self.chat)
            .field("auth", &self.auth)
            .finish()
    }
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &redacted(&self.api_key))
            .field("paralysis_model", &self.paralysis_model)
            .field("chatbot_model", &self.chatbot_model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Fixed-delay retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Additional attempts after the first one fails
    pub max_retries: u32,
    /// Sleep between attempts
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
}

/// Snippet preparation limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaConfig {
    /// Longest side an image is downscaled to
    pub max_dimension: u32,
    /// JPEG re-encode quality (1-100)
    pub jpeg_quality: u8,
    /// Hard cap on base64 characters embedded in a prompt
    pub max_snippet_len: usize,
}

/// Upload persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Directory uploads are written to; also served under `/static/uploads`
    pub dir: PathBuf,
    /// Maximum request body size for upload endpoints, in bytes
    pub max_file_size: usize,
}

/// Chatbot allow-list configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChatConfig {
    /// A message must contain at least one of these (case-insensitive) to be forwarded
    pub allowed_keywords: Vec<String>,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Allow new users to self-register
    pub allow_registration: bool,
    /// Password validation rules
    pub password: PasswordConfig,
    /// Session cookie configuration
    pub session: SessionConfig,
}

/// Password validation rules and Argon2id hashing cost.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    /// Minimum password length
    pub min_length: usize,
    /// Maximum password length
    pub max_length: usize,
    /// Argon2 memory cost in KiB
    pub hash_memory_kib: u32,
    /// Argon2 passes over memory
    pub hash_iterations: u32,
    /// Argon2 lanes
    pub hash_parallelism: u32,
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Session lifetime (cookie Max-Age and token expiry)
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Cookie name for session token
    pub cookie_name: String,
    /// Set Secure flag on cookies (HTTPS only)
    pub cookie_secure: bool,
    /// SameSite cookie attribute ("strict", "lax", or "none")
    pub cookie_same_site: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            secret_key: None,
            inference: InferenceConfig::default(),
            media: MediaConfig::default(),
            uploads: UploadConfig::default(),
            chat: ChatConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("https://openrouter.ai/api/v1").expect("default base url is valid"),
            api_key: None,
            paralysis_model: "meta-llama/llama-3.1-8b-instruct".to_string(),
            chatbot_model: "meta-llama/llama-3.1-8b-instruct".to_string(),
            max_tokens: 400,
            temperature: 0.5,
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay: Duration::from_secs(1),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_dimension: 512,
            jpeg_quality: 65,
            max_snippet_len: 3500,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("static/uploads"),
            max_file_size: 10 * 1024 * 1024, // 10 MiB
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            allowed_keywords: ["paralysis", "facial", "speech", "stroke", "therapy", "recovery"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allow_registration: true,
            password: PasswordConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 1,
            max_length: 128,
            hash_memory_kib: 19456, // 19 MiB
            hash_iterations: 2,
            hash_parallelism: 1,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(24 * 60 * 60), // 24 hours
            cookie_name: "paradx_session".to_string(),
            cookie_secure: false,
            cookie_same_site: "lax".to_string(),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.secret_key.as_deref().is_none_or(str::is_empty) {
            return Err(Error::Internal {
                operation: "Config validation: secret_key is not configured. \
                     Please set PARADX_SECRET_KEY environment variable or add secret_key to config file."
                    .to_string(),
            });
        }

        if self.inference.api_key.is_none() {
            tracing::warn!("No inference API key configured - every analysis will fall back to the warning message");
        }

        if !(1..=100).contains(&self.media.jpeg_quality) {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: media.jpeg_quality must be between 1 and 100 (got {})",
                    self.media.jpeg_quality
                ),
            });
        }

        if self.media.max_dimension == 0 {
            return Err(Error::Internal {
                operation: "Config validation: media.max_dimension must be at least 1".to_string(),
            });
        }

        if self.media.max_snippet_len == 0 {
            return Err(Error::Internal {
                operation: "Config validation: media.max_snippet_len must be at least 1".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&self.inference.temperature) {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: inference.temperature must be between 0 and 2 (got {})",
                    self.inference.temperature
                ),
            });
        }

        if self.auth.password.min_length > self.auth.password.max_length {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: Invalid password configuration: min_length ({}) cannot be greater than max_length ({})",
                    self.auth.password.min_length, self.auth.password.max_length
                ),
            });
        }

        let password = &self.auth.password;
        if let Err(e) = argon2::Params::new(password.hash_memory_kib, password.hash_iterations, password.hash_parallelism, None) {
            return Err(Error::Internal {
                operation: format!("Config validation: invalid auth.password hashing cost: {e}"),
            });
        }

        if self.auth.session.timeout.as_secs() < 300 {
            // Less than 5 minutes
            return Err(Error::Internal {
                operation: "Config validation: session timeout is too short (minimum 5 minutes)".to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // The conventional OpenRouter variable fills in the API key
            .merge(
                Env::raw()
                    .only(&["OPENROUTER_API_KEY"])
                    .map(|_| "inference.api_key".into()),
            )
            // Prefixed environment variables override everything; PARADX_CONFIG names the file
            .merge(Env::prefixed("PARADX_").ignore(&["CONFIG"]).split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
