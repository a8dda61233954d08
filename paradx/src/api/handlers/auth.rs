use axum::{Form, extract::State};

use crate::{
    AppState,
    api::models::{
        auth::{LoginForm, RegisterForm},
        pages::RedirectResponse,
        users::CurrentUser,
    },
    auth::session,
    db::{errors::DbError, models::users::UserDBRecord},
    errors::Error,
    flash::Flash,
};

/// Hash or verify on a blocking thread to avoid stalling the async runtime
async fn blocking<T, F>(operation: &str, f: F) -> Result<T, Error>
where
    F: FnOnce() -> Result<T, Error> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| Error::Internal {
        operation: format!("spawn {operation} task: {e}"),
    })?
}

fn back_to_register(message: impl Into<String>) -> RedirectResponse {
    RedirectResponse::to("/register").with_flash(Flash::danger(message))
}

/// Register a new user account
#[tracing::instrument(skip_all)]
pub async fn register(State(state): State<AppState>, Form(request): Form<RegisterForm>) -> Result<RedirectResponse, Error> {
    if !state.config.auth.allow_registration {
        return Ok(back_to_register("Registration is disabled."));
    }

    let username = request.username.trim().to_string();
    if username.is_empty() {
        return Ok(back_to_register("Username is required."));
    }

    if let Some(problem) = state.credentials.length_problem(&request.password) {
        return Ok(back_to_register(problem));
    }

    // Cheap check first so duplicates don't pay for hashing
    if state.users.get(&username).await?.is_some() {
        return Ok(back_to_register("Username already exists!"));
    }

    let credentials = state.credentials.clone();
    let password = request.password;
    let password_hash = blocking("password hashing", move || credentials.hash(&password)).await?;

    match state.users.create(UserDBRecord::new(username.as_str(), password_hash)).await {
        Ok(_) => {}
        // Lost a race against a concurrent registration
        Err(DbError::UniqueViolation { .. }) => return Ok(back_to_register("Username already exists!")),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(%username, "Registered user");
    Ok(RedirectResponse::to("/login").with_flash(Flash::success("Registration successful. Please log in.")))
}

/// Log in and set the session cookie
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Form(request): Form<LoginForm>) -> Result<RedirectResponse, Error> {
    let username = request.username.trim();
    let invalid = || RedirectResponse::to("/login").with_flash(Flash::danger("Invalid credentials!"));

    let credentials = state.credentials.clone();
    let password = request.password;

    let Some(record) = state.users.get(&username.to_string()).await? else {
        tracing::debug!(%username, "Login for unknown user");
        blocking("password hashing", move || {
            credentials.burn(&password);
            Ok(())
        })
        .await?;
        return Ok(invalid());
    };

    let hash = record.password_hash.clone();
    let is_valid = blocking("password verification", move || credentials.verify(&password, &hash)).await?;
    if !is_valid {
        tracing::debug!(%username, "Login with wrong password");
        return Ok(invalid());
    }

    let user = CurrentUser {
        username: record.username,
    };
    let token = session::create_session_token(&user, &state.config)?;

    tracing::info!(username = %user.username, "User logged in");
    Ok(RedirectResponse::to("/dashboard").with_cookie(session::session_cookie(&token, &state.config)))
}

/// Logout (clear session)
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> RedirectResponse {
    RedirectResponse::to("/")
        .with_cookie(session::clear_session_cookie(&state.config))
        .with_flash(Flash::info("Logged out successfully!"))
}

#[cfg(test)]
mod tests {
    use crate::flash::FlashKind;
    use crate::test_utils::{TestApp, flash_cookie, session_cookie};
    use axum::http::{StatusCode, header};

    #[tokio::test]
    async fn test_register_then_login() {
        let app = TestApp::new();

        let response = app
            .server
            .post("/register")
            .form(&[("username", "alice"), ("password", "hunter2")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/login");
        let flash = flash_cookie(&response).unwrap();
        assert_eq!(flash.kind, FlashKind::Success);
        assert_eq!(flash.message, "Registration successful. Please log in.");

        // Stored hash, never the plaintext
        let record = app.state.users.get(&"alice".to_string()).await.unwrap().unwrap();
        assert!(record.password_hash.starts_with("$argon2id$"));

        let response = app
            .server
            .post("/login")
            .form(&[("username", "alice"), ("password", "hunter2")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/dashboard");
        let cookie = session_cookie(&response).unwrap();

        let response = app.server.get("/dashboard").add_header(header::COOKIE, cookie).await;
        response.assert_status_ok();
        assert!(response.text().contains("Welcome, alice!"));
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let app = TestApp::new();
        app.login_as("alice").await;

        let response = app
            .server
            .post("/register")
            .form(&[("username", "alice"), ("password", "other")])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/register");
        let flash = flash_cookie(&response).unwrap();
        assert_eq!(flash.kind, FlashKind::Danger);
        assert_eq!(flash.message, "Username already exists!");
    }

    #[tokio::test]
    async fn test_register_rejects_long_password() {
        let mut config = crate::test_utils::create_test_config();
        config.auth.password.max_length = 8;
        let app = TestApp::with_config(config);

        let response = app
            .server
            .post("/register")
            .form(&[("username", "bob"), ("password", "much-too-long")])
            .await;

        assert_eq!(response.header(header::LOCATION), "/register");
        assert_eq!(
            flash_cookie(&response).unwrap().message,
            "Password must be no more than 8 characters"
        );
        assert!(app.state.users.get(&"bob".to_string()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_hashes_at_configured_cost() {
        let app = TestApp::new();

        app.server
            .post("/register")
            .form(&[("username", "carol"), ("password", "hunter2")])
            .await
            .assert_status(StatusCode::SEE_OTHER);

        let record = app.state.users.get(&"carol".to_string()).await.unwrap().unwrap();
        assert!(record.password_hash.starts_with("$argon2id$"));
        assert!(record.password_hash.contains("m=1024,t=1,p=1"));
        assert!(app.state.credentials.verify("hunter2", &record.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_disabled() {
        let mut config = crate::test_utils::create_test_config();
        config.auth.allow_registration = false;
        let app = TestApp::with_config(config);

        let response = app
            .server
            .post("/register")
            .form(&[("username", "bob"), ("password", "pw")])
            .await;

        assert_eq!(flash_cookie(&response).unwrap().message, "Registration is disabled.");
        assert!(app.state.users.get(&"bob".to_string()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let app = TestApp::new();
        app.login_as("alice").await;

        let response = app
            .server
            .post("/login")
            .form(&[("username", "alice"), ("password", "wrong")])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/login");
        assert!(session_cookie(&response).is_none());
        let flash = flash_cookie(&response).unwrap();
        assert_eq!(flash.kind, FlashKind::Danger);
        assert_eq!(flash.message, "Invalid credentials!");
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let app = TestApp::new();

        let response = app
            .server
            .post("/login")
            .form(&[("username", "nobody"), ("password", "pw")])
            .await;

        assert_eq!(response.header(header::LOCATION), "/login");
        assert_eq!(flash_cookie(&response).unwrap().message, "Invalid credentials!");
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let app = TestApp::new();
        let session = app.login_as("alice").await;

        let response = app.server.get("/logout").add_header(header::COOKIE, session).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/");
        let cleared = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .any(|c| c.to_str().unwrap().starts_with("paradx_session=;"));
        assert!(cleared);
        let flash = flash_cookie(&response).unwrap();
        assert_eq!(flash.kind, FlashKind::Info);
        assert_eq!(flash.message, "Logged out successfully!");
    }

    #[tokio::test]
    async fn test_login_and_register_pages_render() {
        let app = TestApp::new();
        app.server.get("/login").await.assert_status_ok();
        app.server.get("/register").await.assert_status_ok();
    }
}
