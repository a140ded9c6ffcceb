/// Story aggregation across the three source categories
///
/// Collects a user's stories from each requested category, classifies
/// them, and merges them into one deduplicated, ordered list.
use chrono::{DateTime, Utc};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::error::{AppError, Result};
use crate::models::{StoryCategory, StoryMedia, StoryRecord};
use crate::platform::{ClientError, RawStory, StoriesClient};

#[derive(Clone)]
pub struct StoryAggregator {
    client: Arc<dyn StoriesClient>,
}

impl StoryAggregator {
    pub fn new(client: Arc<dyn StoriesClient>) -> Self {
        Self { client }
    }

    /// Fetch and merge stories for `username` across `categories`.
    ///
    /// A story id returned under more than one category keeps the
    /// highest-priority classification (Active > Pinned > Archived). The
    /// merged list is sorted by posting time descending; equal timestamps
    /// fall back to the higher story id.
    ///
    /// A single category query failing contributes zero records and the
    /// merge continues, unless the account itself cannot be resolved.
    /// Every requested category failing means the upstream is unreachable
    /// and the whole fetch fails.
    pub async fn fetch(
        &self,
        username: &str,
        categories: &[StoryCategory],
    ) -> Result<Vec<StoryRecord>> {
        let mut by_id: HashMap<i64, StoryRecord> = HashMap::new();
        let mut failures = 0;
        let mut last_error = None;

        for &category in categories {
            let raw = match self.query(username, category).await {
                Ok(raw) => raw,
                Err(ClientError::UserNotFound) => {
                    return Err(AppError::UserNotFound(username.to_string()));
                }
                Err(err) => {
                    warn!(%username, category = category.as_str(), %err,
                        "category query failed, skipping");
                    failures += 1;
                    last_error = Some(err);
                    continue;
                }
            };

            for story in raw {
                let record = to_record(story, category);
                match by_id.entry(record.story_id) {
                    Entry::Occupied(mut slot) => {
                        if record.category.priority() > slot.get().category.priority() {
                            slot.insert(record);
                        }
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(record);
                    }
                }
            }
        }

        if failures == categories.len() {
            if let Some(err) = last_error {
                return Err(AppError::Upstream(err.to_string()));
            }
        }

        let mut records: Vec<StoryRecord> = by_id.into_values().collect();
        records.sort_by(|a, b| {
            b.posted_at
                .cmp(&a.posted_at)
                .then(b.story_id.cmp(&a.story_id))
        });
        Ok(records)
    }

    /// Locate one story by id, checking categories in priority order so a
    /// duplicate keeps its highest-priority classification.
    pub async fn find(&self, username: &str, story_id: i64) -> Result<StoryRecord> {
        let mut failures = 0;
        let mut last_error = None;

        for category in StoryCategory::ALL {
            let raw = match self.query(username, category).await {
                Ok(raw) => raw,
                Err(ClientError::UserNotFound) => {
                    return Err(AppError::UserNotFound(username.to_string()));
                }
                Err(err) => {
                    warn!(%username, category = category.as_str(), %err,
                        "category query failed, skipping");
                    failures += 1;
                    last_error = Some(err);
                    continue;
                }
            };

            if let Some(story) = raw.into_iter().find(|s| s.id == story_id) {
                return Ok(to_record(story, category));
            }
        }

        if failures == StoryCategory::ALL.len() {
            if let Some(err) = last_error {
                return Err(AppError::Upstream(err.to_string()));
            }
        }

        Err(AppError::StoryNotFound)
    }

    async fn query(
        &self,
        username: &str,
        category: StoryCategory,
    ) -> std::result::Result<Vec<RawStory>, ClientError> {
        match category {
            StoryCategory::Active => self.client.fetch_active(username).await,
            StoryCategory::Pinned => self.client.fetch_pinned(username).await,
            StoryCategory::Archived => self.client.fetch_archived(username).await,
        }
    }
}

/// Convert a gateway story into the domain record, classified by the
/// query it came from. Gateway types stop here.
fn to_record(raw: RawStory, category: StoryCategory) -> StoryRecord {
    StoryRecord {
        story_id: raw.id,
        category,
        posted_at: DateTime::<Utc>::from_timestamp(raw.date, 0).unwrap_or_default(),
        caption: raw.caption.unwrap_or_default(),
        media: raw.media.map(|m| StoryMedia {
            kind: m.kind,
            file_ref: m.file_ref,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::TimeZone;

    use crate::models::MediaKind;
    use crate::platform::{MediaRef, RawMedia};

    fn raw(id: i64, date: i64) -> RawStory {
        RawStory {
            id,
            date,
            caption: None,
            media: None,
        }
    }

    fn raw_with_media(id: i64, date: i64) -> RawStory {
        RawStory {
            id,
            date,
            caption: Some("caption".to_string()),
            media: Some(RawMedia {
                kind: MediaKind::Photo,
                file_ref: MediaRef(format!("ref-{id}")),
            }),
        }
    }

    #[derive(Default)]
    struct FakeClient {
        active: Vec<RawStory>,
        pinned: Vec<RawStory>,
        archived: Vec<RawStory>,
        fail_pinned: bool,
        fail_all: bool,
        unknown_user: bool,
    }

    impl FakeClient {
        fn outage() -> ClientError {
            ClientError::Api {
                status: 503,
                message: "flood wait".to_string(),
            }
        }
    }

    #[async_trait]
    impl StoriesClient for FakeClient {
        async fn fetch_active(&self, _username: &str) -> std::result::Result<Vec<RawStory>, ClientError> {
            if self.unknown_user {
                return Err(ClientError::UserNotFound);
            }
            if self.fail_all {
                return Err(Self::outage());
            }
            Ok(self.active.clone())
        }

        async fn fetch_pinned(&self, _username: &str) -> std::result::Result<Vec<RawStory>, ClientError> {
            if self.fail_pinned || self.fail_all {
                return Err(Self::outage());
            }
            Ok(self.pinned.clone())
        }

        async fn fetch_archived(&self, _username: &str) -> std::result::Result<Vec<RawStory>, ClientError> {
            if self.fail_all {
                return Err(Self::outage());
            }
            Ok(self.archived.clone())
        }

        async fn download_media(
            &self,
            _username: &str,
            media: &MediaRef,
        ) -> std::result::Result<Bytes, ClientError> {
            Ok(Bytes::from(media.0.clone()))
        }
    }

    fn aggregator(client: FakeClient) -> StoryAggregator {
        StoryAggregator::new(Arc::new(client))
    }

    const JAN_7: i64 = 1767744000;
    const JAN_8: i64 = 1767830400;

    #[tokio::test]
    async fn user_without_stories_yields_empty_list() {
        let agg = aggregator(FakeClient::default());
        let records = agg.fetch("alice", &StoryCategory::ALL).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn merges_and_sorts_most_recent_first() {
        let agg = aggregator(FakeClient {
            active: vec![raw(9, JAN_8)],
            pinned: vec![raw(7, JAN_7)],
            ..Default::default()
        });

        let records = agg.fetch("alice", &StoryCategory::ALL).await.unwrap();
        let ids: Vec<i64> = records.iter().map(|r| r.story_id).collect();
        assert_eq!(ids, vec![9, 7]);
        assert_eq!(records[0].category, StoryCategory::Active);
        assert_eq!(records[1].category, StoryCategory::Pinned);
    }

    #[tokio::test]
    async fn duplicate_id_keeps_highest_priority_category() {
        let agg = aggregator(FakeClient {
            active: vec![raw(5, JAN_8)],
            pinned: vec![raw(5, JAN_8)],
            archived: vec![raw(5, JAN_8)],
            ..Default::default()
        });

        let records = agg.fetch("alice", &StoryCategory::ALL).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, StoryCategory::Active);
    }

    #[tokio::test]
    async fn duplicate_wins_regardless_of_query_order() {
        let agg = aggregator(FakeClient {
            active: vec![raw(5, JAN_8)],
            archived: vec![raw(5, JAN_8)],
            ..Default::default()
        });

        // Archived queried before Active must not demote the record
        let records = agg
            .fetch(
                "alice",
                &[StoryCategory::Archived, StoryCategory::Active],
            )
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, StoryCategory::Active);
    }

    #[tokio::test]
    async fn equal_timestamps_break_ties_by_higher_id() {
        let agg = aggregator(FakeClient {
            archived: vec![raw(3, JAN_7), raw(11, JAN_7)],
            ..Default::default()
        });

        let records = agg.fetch("alice", &StoryCategory::ALL).await.unwrap();
        let ids: Vec<i64> = records.iter().map(|r| r.story_id).collect();
        assert_eq!(ids, vec![11, 3]);
    }

    #[tokio::test]
    async fn failed_category_is_skipped_not_fatal() {
        let agg = aggregator(FakeClient {
            active: vec![raw(9, JAN_8)],
            pinned: vec![raw(7, JAN_7)],
            fail_pinned: true,
            ..Default::default()
        });

        let records = agg.fetch("alice", &StoryCategory::ALL).await.unwrap();
        let ids: Vec<i64> = records.iter().map(|r| r.story_id).collect();
        assert_eq!(ids, vec![9]);
    }

    #[tokio::test]
    async fn all_categories_failing_is_an_upstream_error() {
        let agg = aggregator(FakeClient {
            fail_all: true,
            ..Default::default()
        });

        let err = agg.fetch("alice", &StoryCategory::ALL).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));

        let err = agg.find("alice", 9).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn unknown_user_fails_whole_fetch() {
        let agg = aggregator(FakeClient {
            unknown_user: true,
            ..Default::default()
        });

        let err = agg.fetch("ghost", &StoryCategory::ALL).await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn find_returns_record_with_media() {
        let agg = aggregator(FakeClient {
            pinned: vec![raw_with_media(7, JAN_7)],
            ..Default::default()
        });

        let record = agg.find("alice", 7).await.unwrap();
        assert_eq!(record.category, StoryCategory::Pinned);
        assert_eq!(
            record.posted_at,
            Utc.with_ymd_and_hms(2026, 1, 7, 0, 0, 0).unwrap()
        );
        assert!(record.has_media());
    }

    #[tokio::test]
    async fn find_unknown_id_is_story_not_found() {
        let agg = aggregator(FakeClient {
            active: vec![raw(9, JAN_8)],
            ..Default::default()
        });

        let err = agg.find("alice", 42).await.unwrap_err();
        assert!(matches!(err, AppError::StoryNotFound));
    }
}
