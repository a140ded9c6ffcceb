//! Stories Service
//!
//! HTTP façade over a messaging platform's stories feature. Fetches a
//! user's active, pinned, and archived stories through an authenticated
//! session gateway and republishes story media to a temporary file host.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod platform;
pub mod services;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};
