/// Data models for stories-service
///
/// This module defines structures for:
/// - StoryRecord: a story fetched from the platform, classified by source
/// - StoryInfo: the public JSON shape of a single story
/// - Response envelopes for the three API endpoints
///
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::MediaRef;
use crate::services::publisher::PublishedStory;

/// Attribution fields carried on every response, success or failure
pub const API_DEV: &str = "@ISmartCoder";
pub const API_CHANNEL: &str = "@abirxdhackz";

/// Retention window of the external file host for uploaded media
pub const LINK_EXPIRY: &str = "60 minutes";

/// Display format for story dates. All dates are rendered in UTC.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ========================================
// Story Models
// ========================================

/// Source category a story was returned under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryCategory {
    Active,
    Pinned,
    Archived,
}

impl StoryCategory {
    /// All categories, in merge-priority order
    pub const ALL: [StoryCategory; 3] = [Self::Active, Self::Pinned, Self::Archived];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Pinned => "Pinned",
            Self::Archived => "Archived",
        }
    }

    /// Merge priority when the same story id is returned under more than
    /// one category: Active > Pinned > Archived. Higher wins.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Active => 2,
            Self::Pinned => 1,
            Self::Archived => 0,
        }
    }
}

/// Kind of media attached to a story
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
    Document,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Document => "document",
        }
    }

    /// File suffix used when staging and naming uploaded media
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Self::Photo => ".jpg",
            Self::Video => ".mp4",
            Self::Document => ".bin",
        }
    }
}

/// Media attached to a story. The ref is only valid against the session
/// that produced it and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryMedia {
    pub kind: MediaKind,
    pub file_ref: MediaRef,
}

/// A story fetched from the platform, classified at fetch time.
/// Immutable after construction; lives for a single request only.
#[derive(Debug, Clone)]
pub struct StoryRecord {
    pub story_id: i64,
    pub category: StoryCategory,
    pub posted_at: DateTime<Utc>,
    pub caption: String,
    pub media: Option<StoryMedia>,
}

impl StoryRecord {
    pub fn has_media(&self) -> bool {
        self.media.is_some()
    }
}

// ========================================
// Response DTOs
// ========================================

/// Public JSON shape of a single story
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryInfo {
    pub story_id: i64,
    #[serde(rename = "type")]
    pub category: StoryCategory,
    pub date: String,
    pub timestamp: i64,
    pub caption: String,
    pub has_media: bool,
}

impl From<&StoryRecord> for StoryInfo {
    fn from(record: &StoryRecord) -> Self {
        StoryInfo {
            story_id: record.story_id,
            category: record.category,
            date: record.posted_at.format(DATE_FORMAT).to_string(),
            timestamp: record.posted_at.timestamp(),
            caption: record.caption.clone(),
            has_media: record.has_media(),
        }
    }
}

/// Response for `/api/current`
#[derive(Debug, Serialize)]
pub struct CurrentStoriesResponse {
    pub success: bool,
    pub username: String,
    pub count: usize,
    pub stories: Vec<StoryInfo>,
    pub api_dev: &'static str,
    pub api_channel: &'static str,
}

impl CurrentStoriesResponse {
    pub fn new(username: &str, records: &[StoryRecord]) -> Self {
        let stories: Vec<StoryInfo> = records.iter().map(StoryInfo::from).collect();
        CurrentStoriesResponse {
            success: true,
            username: username.to_string(),
            count: stories.len(),
            stories,
            api_dev: API_DEV,
            api_channel: API_CHANNEL,
        }
    }
}

/// Response for `/api/all`
#[derive(Debug, Serialize)]
pub struct AllStoriesResponse {
    pub success: bool,
    pub username: String,
    pub total_count: usize,
    pub stories: Vec<StoryInfo>,
    pub api_dev: &'static str,
    pub api_channel: &'static str,
}

impl AllStoriesResponse {
    pub fn new(username: &str, records: &[StoryRecord]) -> Self {
        let stories: Vec<StoryInfo> = records.iter().map(StoryInfo::from).collect();
        AllStoriesResponse {
            success: true,
            username: username.to_string(),
            total_count: stories.len(),
            stories,
            api_dev: API_DEV,
            api_channel: API_CHANNEL,
        }
    }
}

/// Response for `/api/special`
#[derive(Debug, Serialize)]
pub struct PublishedStoryResponse {
    pub success: bool,
    pub username: String,
    pub story_id: i64,
    #[serde(rename = "type")]
    pub category: StoryCategory,
    pub media_type: MediaKind,
    pub date: String,
    pub timestamp: i64,
    pub caption: String,
    pub download_url: String,
    pub expires_in: &'static str,
    pub api_dev: &'static str,
    pub api_channel: &'static str,
}

impl PublishedStoryResponse {
    pub fn new(username: &str, published: &PublishedStory) -> Self {
        let record = &published.record;
        PublishedStoryResponse {
            success: true,
            username: username.to_string(),
            story_id: record.story_id,
            category: record.category,
            media_type: published.media_type,
            date: record.posted_at.format(DATE_FORMAT).to_string(),
            timestamp: record.posted_at.timestamp(),
            caption: record.caption.clone(),
            download_url: published.download_url.clone(),
            expires_in: published.expires_in,
            api_dev: API_DEV,
            api_channel: API_CHANNEL,
        }
    }
}
