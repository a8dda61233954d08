//! Test utilities shared by unit and handler tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderValue, header};
use axum_test::{TestResponse, TestServer};
use tempfile::TempDir;
use tokio::time::Instant;

use crate::{
    AppState, Application,
    api::models::users::CurrentUser,
    auth::session,
    config::{Config, RetryConfig},
    db::{handlers::Users, models::users::UserDBRecord},
    flash::{FLASH_COOKIE, Flash},
    inference::{
        ChatTransport, InferenceClient, InferenceError,
        models::{ChatCompletionResponse, CreateChatCompletionRequest, message_text},
    },
    render::Pages,
};

/// Password every [`TestApp::login_as`] user is created with.
pub const TEST_PASSWORD: &str = "correct horse battery staple";

pub fn create_test_config() -> Config {
    let mut config = Config {
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        port: 0,
        host: "127.0.0.1".to_string(),
        ..Default::default()
    };
    // Never reached by tests that use a scripted transport
    config.inference.base_url = "http://127.0.0.1:1/v1".parse().expect("valid url");
    config.inference.api_key = Some("sk-test".to_string());
    config.inference.retry = RetryConfig {
        max_retries: 2,
        delay: Duration::from_millis(10),
    };
    // Cheap hashing keeps register and login tests fast
    config.auth.password.hash_memory_kib = 1024;
    config.auth.password.hash_iterations = 1;
    config.uploads.dir = std::env::temp_dir().join(format!("paradx-test-uploads-{}", std::process::id()));
    config
}

/// State over an empty repository and a transport that always answers "No signs detected".
pub fn create_test_state() -> AppState {
    let transport = Arc::new(ScriptedTransport::always(Step::Reply("No signs detected".to_string())));
    build_state(create_test_config(), transport)
}

fn build_state(config: Config, transport: Arc<ScriptedTransport>) -> AppState {
    AppState::builder()
        .users(Arc::new(Users::new()))
        .inference(Arc::new(InferenceClient::with_transport(transport, &config.inference)))
        .pages(Arc::new(Pages::new().expect("templates compile")))
        .config(config)
        .build()
}

/// One scripted outcome of a [`ScriptedTransport::send`] call.
#[derive(Debug, Clone)]
pub enum Step {
    /// 200 with this assistant content
    Reply(String),
    /// 200 with an arbitrary body
    Raw(ChatCompletionResponse),
    /// Non-200 status
    Status(u16),
    Fail(InferenceError),
    /// Sleep before answering, to trip the per-attempt timeout
    Hang(Duration),
}

/// In-process [`ChatTransport`] that replays a script and records every request.
#[derive(Debug)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    fallback: Step,
    requests: Mutex<Vec<CreateChatCompletionRequest>>,
    call_instants: Mutex<Vec<Instant>>,
}

impl ScriptedTransport {
    /// Play `steps` in order, then fail every further call.
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: Mutex::new(steps.into_iter().collect()),
            fallback: Step::Fail(InferenceError::Transport("script exhausted".to_string())),
            requests: Mutex::default(),
            call_instants: Mutex::default(),
        }
    }

    /// Answer every call with `step`.
    pub fn always(step: Step) -> Self {
        Self {
            fallback: step,
            ..Self::new([])
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CreateChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// User turn of every recorded request.
    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| message_text(&request.messages[1]).unwrap().to_string())
            .collect()
    }

    pub fn call_instants(&self) -> Vec<Instant> {
        self.call_instants.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(&self, request: &CreateChatCompletionRequest) -> Result<ChatCompletionResponse, InferenceError> {
        self.requests.lock().unwrap().push(request.clone());
        self.call_instants.lock().unwrap().push(Instant::now());
        let step = self.script.lock().unwrap().pop_front().unwrap_or_else(|| self.fallback.clone());

        match step {
            Step::Reply(content) => Ok(ChatCompletionResponse::with_content(content)),
            Step::Raw(response) => Ok(response),
            Step::Status(status) => Err(InferenceError::Status {
                status,
                body: String::new(),
            }),
            Step::Fail(error) => Err(error),
            Step::Hang(duration) => {
                tokio::time::sleep(duration).await;
                Ok(ChatCompletionResponse::with_content("too late"))
            }
        }
    }
}

/// A router under test with its state, transport and a private upload directory.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub transport: Arc<ScriptedTransport>,
    _upload_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(create_test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let transport = Arc::new(ScriptedTransport::always(Step::Reply("No signs detected".to_string())));
        Self::with_config_and_transport(config, transport)
    }

    pub fn with_transport(transport: Arc<ScriptedTransport>) -> Self {
        Self::with_config_and_transport(create_test_config(), transport)
    }

    pub fn with_config_and_transport(mut config: Config, transport: Arc<ScriptedTransport>) -> Self {
        let upload_dir = tempfile::tempdir().expect("create upload dir");
        config.uploads.dir = upload_dir.path().join("static/uploads");

        let state = build_state(config, transport.clone());
        let server = Application::from_state(state.clone()).into_test_server();

        Self {
            server,
            state,
            transport,
            _upload_dir: upload_dir,
        }
    }

    /// Register `username` (if needed) and return a `Cookie` header value for its session.
    pub async fn login_as(&self, username: &str) -> String {
        let hash = self.state.credentials.hash(TEST_PASSWORD).unwrap();
        self.state.users.put(UserDBRecord::new(username, hash)).await.unwrap();

        let user = CurrentUser {
            username: username.to_string(),
        };
        let token = session::create_session_token(&user, &self.state.config).unwrap();
        format!("{}={}", self.state.config.auth.session.cookie_name, token)
    }
}

fn set_cookie_pairs(response: &TestResponse) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::to_string)
        .collect()
}

/// Flash set by `response`, decoded.
pub fn flash_cookie(response: &TestResponse) -> Option<Flash> {
    let pair = set_cookie_pairs(response)
        .into_iter()
        .find(|pair| pair.starts_with(&format!("{FLASH_COOKIE}=")))?;
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_str(&pair).ok()?);
    Flash::from_headers(&headers)
}

/// Non-empty `paradx_session=<token>` pair set by `response`.
pub fn session_cookie(response: &TestResponse) -> Option<String> {
    set_cookie_pairs(response)
        .into_iter()
        .find(|pair| pair.starts_with("paradx_session=") && pair.len() > "paradx_session=".len())
}
