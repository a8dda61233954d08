//! Data access layer for registered identities.
//!
//! Handlers never touch storage directly: they go through the [`handlers::Repository`]
//! trait, which is injected into [`crate::AppState`] as a trait object. The default
//! implementation ([`handlers::Users`]) keeps records in process memory, so all accounts
//! disappear on restart. Swapping to a persistent store only requires another
//! `Repository` implementation.
//!
//! # Modules
//!
//! - [`handlers`]: Repository trait and implementations
//! - [`models`]: Stored record structures
//! - [`errors`]: Repository error types

pub mod errors;
pub mod handlers;
pub mod models;
