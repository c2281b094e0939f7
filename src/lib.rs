//! League results server.
//!
//! Serves the league JSON API under `/api`, and in production also the client
//! SPA bundle behind an HTTPS redirect.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;
