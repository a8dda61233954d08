//! Form payloads for registration and login.

use serde::Deserialize;

/// `POST /register` form body
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
}

/// `POST /login` form body
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}
