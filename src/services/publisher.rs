/// Media staging and publication
///
/// Downloads one story's media through the session client, stages it in a
/// scoped temporary file, and hands it to the file host. The staged copy
/// is removed on every exit path: the `NamedTempFile` guard deletes it on
/// drop, which covers upload failure and request cancellation alike.
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::models::{MediaKind, StoryRecord, LINK_EXPIRY};
use crate::platform::StoriesClient;
use crate::services::aggregator::StoryAggregator;
use crate::services::host::MediaHost;

/// Outcome of publishing one story's media to the file host
#[derive(Debug, Clone)]
pub struct PublishedStory {
    pub record: StoryRecord,
    pub media_type: MediaKind,
    pub download_url: String,
    pub expires_in: &'static str,
}

#[derive(Clone)]
pub struct MediaPublisher {
    aggregator: StoryAggregator,
    client: Arc<dyn StoriesClient>,
    host: Arc<dyn MediaHost>,
    staging_dir: PathBuf,
}

impl MediaPublisher {
    pub fn new(
        aggregator: StoryAggregator,
        client: Arc<dyn StoriesClient>,
        host: Arc<dyn MediaHost>,
        staging_dir: PathBuf,
    ) -> Self {
        Self {
            aggregator,
            client,
            host,
            staging_dir,
        }
    }

    /// Publish the media of `story_id` to the file host and return the
    /// public download URL. Single attempt, no retries.
    pub async fn publish(&self, username: &str, story_id: i64) -> Result<PublishedStory> {
        let record = self.aggregator.find(username, story_id).await?;
        let media = record.media.clone().ok_or(AppError::NoMediaAvailable)?;

        let bytes = self
            .client
            .download_media(username, &media.file_ref)
            .await
            .map_err(|e| AppError::Publish(format!("media download failed: {e}")))?;

        let staged = tempfile::Builder::new()
            .prefix("story-")
            .suffix(media.kind.file_suffix())
            .tempfile_in(&self.staging_dir)
            .map_err(|e| AppError::Publish(format!("staging failed: {e}")))?;

        tokio::fs::write(staged.path(), &bytes)
            .await
            .map_err(|e| AppError::Publish(format!("staging write failed: {e}")))?;

        debug!(%username, story_id, size = bytes.len(), "staged story media");

        let file_name = format!("story_{story_id}{}", media.kind.file_suffix());
        let download_url = self
            .host
            .upload(staged.path(), &file_name)
            .await
            .map_err(|e| AppError::Publish(format!("upload failed: {e}")))?;

        staged
            .close()
            .map_err(|e| AppError::Publish(format!("staging cleanup failed: {e}")))?;

        info!(%username, story_id, media_type = media.kind.as_str(), "story media published");

        Ok(PublishedStory {
            record,
            media_type: media.kind,
            download_url,
            expires_in: LINK_EXPIRY,
        })
    }
}
