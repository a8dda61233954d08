//! HTTP surface: route handlers and the request/response models they exchange.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Form, JSON and response types
//!
//! # Routes
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /` | [`handlers::pages::landing`] |
//! | `GET, POST /register` | [`handlers::pages::register_page`], [`handlers::auth::register`] |
//! | `GET, POST /login` | [`handlers::pages::login_page`], [`handlers::auth::login`] |
//! | `GET /logout` | [`handlers::auth::logout`] |
//! | `GET /dashboard` | [`handlers::pages::dashboard`] |
//! | `GET /upload_page`, `POST /upload` | [`handlers::pages::upload_page`], [`handlers::analysis::upload`] |
//! | `GET /upload_voice_page`, `POST /upload_voice` | [`handlers::pages::upload_voice_page`], [`handlers::analysis::upload_voice`] |
//! | `GET /chatbot`, `POST /chat` | [`handlers::pages::chatbot`], [`handlers::chat::chat`] |
//! | `GET /static/uploads/*` | persisted uploads |
//! | `GET /healthz` | [`handlers::pages::healthz`] |

pub mod handlers;
pub mod models;
