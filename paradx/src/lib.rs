//! # paradx: paralysis screening web service
//!
//! `paradx` lets a registered user upload a face photo or a voice clip and receive an
//! AI-generated impression of possible facial or speech paralysis. A chatbot answers questions,
//! but only ones that mention paralysis-related topics.
//!
//! ## Overview
//!
//! Nothing is analysed locally. Uploads are reduced to a bounded base64 *snippet* (images are
//! decoded, downscaled and re-encoded as JPEG first), the snippet is pasted into a
//! natural-language prompt, and the prompt is sent to an OpenAI-compatible chat-completion API.
//! The reply text is shown to the user as-is, or replaced by a fallback message when the API
//! could not be reached.
//!
//! ### Request Flow
//!
//! ```text
//! POST /upload ──► UploadStore::save ──► MediaEncoder::encode_image ──► prompt
//!                                                                        │
//!            result page ◄── fallback if "" ◄── InferenceClient::complete ◄┘
//! ```
//!
//! ### Core Components
//!
//! - [`media`]: image normalisation and snippet truncation
//! - [`inference`]: the retrying chat-completion client and its transport seam
//! - [`api`]: route handlers for pages, uploads, chat and authentication
//! - [`auth`] and [`db`]: signed session cookies over an in-memory user repository
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use paradx::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = paradx::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     paradx::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config)?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod chat;
pub mod config;
pub mod db;
pub mod errors;
pub mod flash;
pub mod inference;
pub mod media;
pub mod render;
pub mod telemetry;
pub mod uploads;

#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use bon::Builder;
use tokio::net::TcpListener;
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info};

pub use config::Config;

use crate::{
    auth::password::Credentials,
    chat::TopicGate,
    db::handlers::{UserRepository, Users},
    inference::InferenceClient,
    media::MediaEncoder,
    render::Pages,
    uploads::{PUBLIC_PREFIX, UploadStore},
};

/// Application state shared across all request handlers.
///
/// # Fields
///
/// - `config`: Application configuration loaded from file/environment
/// - `users`: Registered identities; in-memory unless another repository is injected
/// - `inference`: Chat-completion client shared by the analysis and chat handlers
/// - `encoder`: Snippet preparation for uploads
/// - `uploads`: Where uploaded files are persisted
/// - `pages`: Compiled page templates
/// - `topic_gate`: Keyword allow-list for the chatbot
/// - `credentials`: Password policy and hashing cost
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config.clone())
///     .users(Arc::new(Users::new()))
///     .inference(Arc::new(InferenceClient::new(&config.inference)?))
///     .pages(Arc::new(Pages::new()?))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub users: UserRepository,
    pub inference: Arc<InferenceClient>,
    pub pages: Arc<Pages>,
    #[builder(default = MediaEncoder::new(&config.media))]
    pub encoder: MediaEncoder,
    #[builder(default = UploadStore::new(&config.uploads))]
    pub uploads: UploadStore,
    #[builder(default = TopicGate::from_config(&config.chat))]
    pub topic_gate: TopicGate,
    #[builder(default = Credentials::new(&config.auth.password))]
    pub credentials: Credentials,
}

/// Build the application router with all routes and layers.
pub fn build_router(state: AppState) -> Router {
    let upload_routes = Router::new()
        .route("/upload", post(api::handlers::analysis::upload))
        .route("/upload_voice", post(api::handlers::analysis::upload_voice))
        .layer(DefaultBodyLimit::max(state.config.uploads.max_file_size));

    let router = Router::new()
        .route("/", get(api::handlers::pages::landing))
        .route(
            "/register",
            get(api::handlers::pages::register_page).post(api::handlers::auth::register),
        )
        .route(
            "/login",
            get(api::handlers::pages::login_page).post(api::handlers::auth::login),
        )
        .route("/logout", get(api::handlers::auth::logout))
        .route("/dashboard", get(api::handlers::pages::dashboard))
        .route("/upload_page", get(api::handlers::pages::upload_page))
        .route("/upload_voice_page", get(api::handlers::pages::upload_voice_page))
        .route("/chatbot", get(api::handlers::pages::chatbot))
        .route("/chat", post(api::handlers::chat::chat))
        .route("/healthz", get(api::handlers::pages::healthz))
        .merge(upload_routes)
        .nest_service(PUBLIC_PREFIX, ServeDir::new(state.uploads.dir()))
        .with_state(state);

    // Add tracing layer
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

/// Main application struct that owns the router and configuration.
///
/// 1. **Create**: [`Application::new`] builds the inference client, templates and state
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown signal resolves, in-flight requests are drained
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with an empty in-memory user repository
    pub fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting paradx with configuration: {:#?}", config);

        let state = AppState::builder()
            .users(Arc::new(Users::new()))
            .inference(Arc::new(InferenceClient::new(&config.inference)?))
            .pages(Arc::new(Pages::new()?))
            .config(config.clone())
            .build();

        Ok(Self::from_state(state))
    }

    /// Create an application around prepared state (custom repository or transport)
    pub fn from_state(state: AppState) -> Self {
        let config = state.config.clone();
        Self {
            router: build_router(state),
            config,
        }
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "paradx listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Server stopped");
        Ok(())
    }
}
