//! Remote session client for the messaging platform
//!
//! All protocol work is delegated to an authenticated session gateway and
//! consumed through the [`StoriesClient`] trait. Gateway wire shapes stop
//! at the aggregator boundary; nothing above it sees this module's raw
//! types except the opaque [`MediaRef`] handle.

mod gateway;

pub use gateway::GatewayClient;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::MediaKind;

/// Errors surfaced by the session client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no account matches the requested username")]
    UserNotFound,

    #[error("gateway returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected gateway payload: {0}")]
    Decode(String),
}

/// Opaque handle for fetching a story's raw media bytes. Only meaningful
/// against the session that produced it; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef(pub String);

/// Story item as returned by a single gateway query, before it is
/// classified and converted into a domain record.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStory {
    pub id: i64,
    /// Epoch seconds, platform-assigned
    pub date: i64,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub media: Option<RawMedia>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMedia {
    pub kind: MediaKind,
    pub file_ref: MediaRef,
}

/// Read-only operations against the shared authenticated session.
///
/// One implementation talks to the real gateway; tests substitute
/// in-memory fakes.
#[async_trait]
pub trait StoriesClient: Send + Sync {
    /// Stories currently visible on the user's profile
    async fn fetch_active(&self, username: &str) -> Result<Vec<RawStory>, ClientError>;

    /// Stories the owner keeps pinned to the profile
    async fn fetch_pinned(&self, username: &str) -> Result<Vec<RawStory>, ClientError>;

    /// Retained stories no longer publicly shown
    async fn fetch_archived(&self, username: &str) -> Result<Vec<RawStory>, ClientError>;

    /// Raw media bytes for a story previously returned by this session
    async fn download_media(&self, username: &str, media: &MediaRef)
        -> Result<Bytes, ClientError>;
}
