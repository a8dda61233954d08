//! API request and response data models.
//!
//! - [`auth`]: Registration and login form payloads
//! - [`chat`]: Chatbot JSON bodies
//! - [`pages`]: Page and redirect responses that carry cookies
//! - [`users`]: The authenticated identity

pub mod auth;
pub mod chat;
pub mod pages;
pub mod users;
