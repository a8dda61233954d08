//! Stored record structures.

pub mod users;
