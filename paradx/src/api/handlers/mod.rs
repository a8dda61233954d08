//! HTTP request handlers.
//!
//! # Handler Modules
//!
//! - [`analysis`]: Face photo and voice clip uploads
//! - [`auth`]: Registration, login and logout form posts
//! - [`chat`]: Topic-gated chatbot
//! - [`pages`]: Page rendering, with login redirects for protected pages
//!
//! # Authentication
//!
//! Handlers take [`crate::api::models::users::CurrentUser`] to require a session (401 on
//! failure), or `Option<CurrentUser>` to redirect anonymous visitors to `/login`.
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`], which converts to a status code and a plain,
//! user-safe message.

pub mod analysis;
pub mod auth;
pub mod chat;
pub mod pages;
