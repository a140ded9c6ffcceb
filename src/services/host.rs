/// External file host adapter
///
/// Uploads staged media to the anonymous file host and returns the public
/// download URL. The host keeps uploads for 60 minutes; nothing here can
/// extend that.
use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::FileHostConfig;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("host rejected upload: {0}")]
    Rejected(String),
}

/// Seam for the file-hosting service. Tests substitute in-memory fakes.
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Upload the file at `path` under `file_name`, returning a public
    /// download URL.
    async fn upload(&self, path: &Path, file_name: &str) -> Result<String, HostError>;
}

pub struct TmpFilesHost {
    http: reqwest::Client,
    upload_url: String,
}

impl TmpFilesHost {
    pub fn from_config(cfg: &FileHostConfig) -> Result<Self, HostError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            upload_url: cfg.upload_url.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    status: String,
    #[serde(default)]
    data: Option<UploadData>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

#[async_trait]
impl MediaHost for TmpFilesHost {
    async fn upload(&self, path: &Path, file_name: &str) -> Result<String, HostError> {
        let bytes = tokio::fs::read(path).await?;
        debug!(file_name, size = bytes.len(), "uploading media to file host");

        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let resp = self.http.post(&self.upload_url).multipart(form).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(HostError::Rejected(format!("upload status {status}")));
        }

        let body: UploadResponse = resp.json().await?;
        if body.status != "success" {
            return Err(HostError::Rejected(format!(
                "host reported status {:?}",
                body.status
            )));
        }

        let url = body
            .data
            .map(|d| d.url)
            .ok_or_else(|| HostError::Rejected("success response without a url".to_string()))?;

        let download_url = direct_download_url(&url);
        info!(file_name, %download_url, "media upload complete");
        Ok(download_url)
    }
}

/// The host hands back a viewer-page URL; the direct link lives under the
/// `/dl/` path segment.
fn direct_download_url(url: &str) -> String {
    url.replacen("tmpfiles.org/", "tmpfiles.org/dl/", 1)
}
