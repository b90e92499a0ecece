//! Client for the external media host (Cloudinary-style HTTP upload API).
//!
//! Binary payloads are pushed here during the upload workflows; the host
//! returns a durable URL plus derived metadata (dimensions, size, format).
//! Failures propagate to the caller, which rolls back its transaction.

use once_cell::sync::Lazy;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::config::{self, MediaConfig};

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("upload request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("media host returned status {0}")]
    Status(u16),

    #[error("could not read spooled file: {0}")]
    Io(#[from] std::io::Error),
}

/// Descriptor returned by the host for one uploaded asset
#[derive(Debug, Clone, Deserialize)]
pub struct HostedImage {
    #[serde(rename = "secure_url")]
    pub url: String,
    pub public_id: String,
    pub width: i32,
    pub height: i32,
    pub bytes: i64,
    pub format: String,
}

pub struct MediaHost {
    http: reqwest::Client,
    cfg: MediaConfig,
}

static CLIENT: Lazy<MediaHost> = Lazy::new(|| MediaHost::new(config::config().media.clone()));

/// Shared media host client
pub fn client() -> &'static MediaHost {
    &CLIENT
}

impl MediaHost {
    pub fn new(cfg: MediaConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            cfg,
        }
    }

    /// Push one spooled file to the host under `folder`.
    pub async fn upload(
        &self,
        path: &Path,
        original_filename: &str,
        folder: &str,
    ) -> Result<HostedImage, MediaError> {
        let bytes = tokio::fs::read(path).await?;
        let timestamp = chrono::Utc::now().timestamp().to_string();

        let signature = sign_params(
            &[("folder", folder), ("timestamp", &timestamp)],
            &self.cfg.api_secret,
        );

        let form = Form::new()
            .part(
                "file",
                Part::bytes(bytes).file_name(original_filename.to_string()),
            )
            .text("api_key", self.cfg.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let url = format!(
            "{}/{}/image/upload",
            self.cfg.base_url.trim_end_matches('/'),
            self.cfg.cloud_name
        );

        debug!("Pushing {} to media host folder {}", original_filename, folder);

        let response = self.http.post(&url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::Status(status.as_u16()));
        }

        let hosted = response.json::<HostedImage>().await?;
        Ok(hosted)
    }
}

/// Request signature: hex SHA-256 over the alphabetically sorted
/// `key=value` pairs joined with `&`, with the API secret appended.
fn sign_params(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted: Vec<_> = params.to_vec();
    sorted.sort_by_key(|(k, _)| *k);

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.as_bytes());
    let digest = hasher.finalize();

    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
