//! Liao backend library.
//!
//! Exposes the service modules for integration tests and embedding.

pub mod api;
pub mod auth;
pub mod chat;
pub mod config;
pub mod db;
pub mod user;
