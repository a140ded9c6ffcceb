/// Story handlers - HTTP endpoints for the stories API
///
/// Thin translation layer: query parameters in, aggregator/publisher
/// calls out, everything wrapped in the standard envelope. Query fields
/// are optional in the extractor so missing parameters produce the
/// envelope instead of a framework error page.
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::{
    AllStoriesResponse, CurrentStoriesResponse, PublishedStoryResponse, StoryCategory,
    API_CHANNEL, API_DEV,
};
use crate::services::aggregator::StoryAggregator;
use crate::services::publisher::MediaPublisher;

#[derive(Debug, Deserialize)]
pub struct StoriesQuery {
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SpecialQuery {
    pub username: Option<String>,
    pub storyid: Option<String>,
}

fn require_username(raw: &Option<String>) -> Result<&str> {
    match raw.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(AppError::BadRequest(
            "username query parameter is required".to_string(),
        )),
    }
}

/// Service banner and endpoint catalog
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "online",
        "api": "Stories API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/api/current?username={}": "Get current active stories",
            "/api/all?username={}": "Get all stories (active + pinned + archived)",
            "/api/special?username={}&storyid={}": "Download specific story by ID"
        },
        "api_dev": API_DEV,
        "api_channel": API_CHANNEL,
    }))
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
}

/// GET /api/current - a user's currently visible stories
pub async fn current_stories(
    aggregator: web::Data<StoryAggregator>,
    query: web::Query<StoriesQuery>,
) -> Result<HttpResponse> {
    let username = require_username(&query.username)?;
    info!(%username, "fetching current stories");

    let records = aggregator
        .fetch(username, &[StoryCategory::Active])
        .await?;
    Ok(HttpResponse::Ok().json(CurrentStoriesResponse::new(username, &records)))
}

/// GET /api/all - all stories across the three categories
pub async fn all_stories(
    aggregator: web::Data<StoryAggregator>,
    query: web::Query<StoriesQuery>,
) -> Result<HttpResponse> {
    let username = require_username(&query.username)?;
    info!(%username, "fetching all stories");

    let records = aggregator.fetch(username, &StoryCategory::ALL).await?;
    Ok(HttpResponse::Ok().json(AllStoriesResponse::new(username, &records)))
}

/// GET /api/special - publish one story's media to a temporary URL
pub async fn special_story(
    publisher: web::Data<MediaPublisher>,
    query: web::Query<SpecialQuery>,
) -> Result<HttpResponse> {
    let username = require_username(&query.username)?;
    let story_id = query
        .storyid
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AppError::BadRequest("storyid query parameter is required".to_string())
        })?
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest("storyid must be a numeric story id".to_string()))?;

    info!(%username, story_id, "publishing story media");

    let published = publisher.publish(username, story_id).await?;
    Ok(HttpResponse::Ok().json(PublishedStoryResponse::new(username, &published)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_trimmed_and_required() {
        assert_eq!(require_username(&Some(" alice ".to_string())).unwrap(), "alice");
        assert!(require_username(&Some("   ".to_string())).is_err());
        assert!(require_username(&None).is_err());
    }
}
