//! Berth API service.
//!
//! Manages the TLS certificates attached to apps: upload, list, replace and
//! delete, with every request authenticated by API token and authorized
//! against the app's owner and collaborators.
//!
//! # Configuration
//!
//! See [`config::BerthApiConfig`] for configuration options. Storage is
//! MongoDB by default; an in-memory backend is available for development.

pub mod auth;
pub mod certs;
pub mod config;
pub mod context;
pub mod error;
pub mod server;

pub(crate) mod handlers;
