//! Reqwest adapter over the session gateway's REST surface
//!
//! Holds the one authenticated session shared by every request. The
//! gateway paginates archived stories; the paging loop stays in here so
//! callers always see the full list.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{ClientError, MediaRef, RawStory, StoriesClient};
use crate::config::SessionConfig;

/// Page size the gateway uses for pinned and archived story queries
const PAGE_LIMIT: usize = 100;

pub struct GatewayClient {
    http: Client,
    base_url: String,
    session_token: String,
}

impl GatewayClient {
    /// Build the shared session client from configuration
    pub fn from_config(cfg: &SessionConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: cfg.api_base.trim_end_matches('/').to_string(),
            session_token: cfg.token.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn check(resp: Response) -> Result<Response, ClientError> {
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::UserNotFound);
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp)
    }

    async fn fetch_page(
        &self,
        source: &str,
        username: &str,
        offset_id: i64,
    ) -> Result<StoriesPage, ClientError> {
        let offset = offset_id.to_string();
        let limit = PAGE_LIMIT.to_string();
        let resp = self
            .http
            .get(self.endpoint(&format!("stories/{source}")))
            .bearer_auth(&self.session_token)
            .query(&[
                ("username", username),
                ("offset_id", offset.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let page: StoriesPage = Self::check(resp).await?.json().await?;
        debug!(%username, source, offset_id, count = page.stories.len(), "fetched stories page");
        Ok(page)
    }
}

#[derive(Debug, Deserialize)]
struct StoriesPage {
    #[serde(default)]
    stories: Vec<RawStory>,
}

#[async_trait]
impl StoriesClient for GatewayClient {
    async fn fetch_active(&self, username: &str) -> Result<Vec<RawStory>, ClientError> {
        let resp = self
            .http
            .get(self.endpoint("stories/active"))
            .bearer_auth(&self.session_token)
            .query(&[("username", username)])
            .send()
            .await?;

        let page: StoriesPage = Self::check(resp).await?.json().await?;
        Ok(page.stories)
    }

    async fn fetch_pinned(&self, username: &str) -> Result<Vec<RawStory>, ClientError> {
        Ok(self.fetch_page("pinned", username, 0).await?.stories)
    }

    async fn fetch_archived(&self, username: &str) -> Result<Vec<RawStory>, ClientError> {
        let mut all = Vec::new();
        let mut offset_id: i64 = 0;

        loop {
            let page = self.fetch_page("archive", username, offset_id).await?;
            if page.stories.is_empty() {
                break;
            }

            let count = page.stories.len();
            offset_id = page.stories.last().map(|s| s.id).unwrap_or(offset_id);
            all.extend(page.stories);

            if count < PAGE_LIMIT {
                break;
            }
        }

        Ok(all)
    }

    async fn download_media(
        &self,
        username: &str,
        media: &MediaRef,
    ) -> Result<Bytes, ClientError> {
        let resp = self
            .http
            .get(self.endpoint("stories/media"))
            .bearer_auth(&self.session_token)
            .query(&[("username", username), ("ref", media.0.as_str())])
            .send()
            .await?;

        let bytes = Self::check(resp).await?.bytes().await?;
        debug!(%username, size = bytes.len(), "downloaded story media");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;

    fn config(api_base: &str) -> SessionConfig {
        SessionConfig {
            token: "test-session-token".to_string(),
            api_base: api_base.to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn endpoint_normalizes_trailing_slash() {
        let client = GatewayClient::from_config(&config("http://localhost:8443/v1/")).unwrap();
        assert_eq!(
            client.endpoint("stories/active"),
            "http://localhost:8443/v1/stories/active"
        );

        let client = GatewayClient::from_config(&config("http://localhost:8443/v1")).unwrap();
        assert_eq!(
            client.endpoint("stories/media"),
            "http://localhost:8443/v1/stories/media"
        );
    }

    #[test]
    fn stories_page_tolerates_missing_fields() {
        let page: StoriesPage = serde_json::from_str(
            r#"{"stories": [{"id": 9, "date": 1767830400},
                            {"id": 7, "date": 1767744000, "caption": "hi",
                             "media": {"kind": "photo", "file_ref": "abc123"}}]}"#,
        )
        .unwrap();

        assert_eq!(page.stories.len(), 2);
        assert!(page.stories[0].caption.is_none());
        assert!(page.stories[0].media.is_none());

        let media = page.stories[1].media.as_ref().unwrap();
        assert_eq!(media.kind, crate::models::MediaKind::Photo);
        assert_eq!(media.file_ref, MediaRef("abc123".to_string()));
    }

    #[test]
    fn empty_page_deserializes() {
        let page: StoriesPage = serde_json::from_str("{}").unwrap();
        assert!(page.stories.is_empty());
    }
}
