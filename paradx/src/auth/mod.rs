//! Authentication: registered users log in with a username and password and receive a signed
//! session cookie.
//!
//! # Session flow
//!
//! - `POST /register` stores an Argon2id hash of the password in the user repository
//! - `POST /login` verifies the hash and sets a JWT session cookie (`paradx_session` by default)
//! - Every later request is identified by [`current_user::CurrentUser`] extraction: the cookie
//!   signature and expiry are checked, then the user must still exist in the repository
//! - `GET /logout` expires the cookie
//!
//! Nothing is stored server-side per session, so restarting the process with the same
//! `secret_key` keeps signatures valid, but the in-memory repository is empty and every
//! session is rejected until the user registers again.
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use paradx::api::models::users::CurrentUser;
//!
//! // Rejects with 401 when not logged in
//! async fn chat(current_user: CurrentUser) -> String {
//!     format!("Hello, {}!", current_user.username)
//! }
//!
//! // Pages that redirect instead
//! async fn dashboard(current_user: Option<CurrentUser>) -> Response { ... }
//! ```
//!
//! # Modules
//!
//! - [`current_user`]: Extractors for getting the authenticated user in handlers
//! - [`password`]: Password hashing and verification using Argon2
//! - [`session`]: Session token and cookie construction
//! - [`utils`]: Cookie header parsing

pub mod current_user;
pub mod password;
pub mod session;
pub mod utils;
