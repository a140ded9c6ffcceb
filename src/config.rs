/// Configuration management for stories-service
///
/// Loads configuration from environment variables with sensible defaults.
/// The session token has no default: startup fails without it.
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub session: SessionConfig,
    pub host: FileHostConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub env: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SessionConfig {
    /// Credential authenticating this process as a platform account
    pub token: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FileHostConfig {
    pub upload_url: String,
    pub timeout_secs: u64,
    /// Directory where media is staged between download and upload
    pub staging_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let token = std::env::var("SESSION_TOKEN")
            .map_err(|_| "SESSION_TOKEN must be set to an authenticated session token")?;

        Ok(Config {
            app: AppConfig {
                host: std::env::var("STORIES_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("STORIES_SERVICE_PORT")
                    .unwrap_or_else(|_| "4747".to_string())
                    .parse()
                    .unwrap_or(4747),
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            },
            session: SessionConfig {
                token,
                api_base: std::env::var("GATEWAY_API_BASE")
                    .unwrap_or_else(|_| "http://localhost:8443/v1".to_string()),
                timeout_secs: std::env::var("GATEWAY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            },
            host: FileHostConfig {
                upload_url: std::env::var("UPLOAD_URL")
                    .unwrap_or_else(|_| "https://tmpfiles.org/api/v1/upload".to_string()),
                timeout_secs: std::env::var("UPLOAD_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(120),
                staging_dir: std::env::var("STAGING_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| std::env::temp_dir()),
            },
        })
    }
}
