//! Multipart intake for the upload workflows.
//!
//! File parts are spooled to a temp directory under unique names before
//! anything touches the database or the media host; text parts are collected
//! as metadata. Spooled files are removed on every exit path.

use axum::extract::Multipart;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

use crate::config::{self, UploadConfig};
use crate::error::ApiError;

/// Declared media types accepted by both upload variants
pub const ALLOWED_FILE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/jpg",
    "image/webp",
];

#[derive(Debug)]
pub struct ReceivedFile {
    pub original_name: String,
    pub content_type: String,
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Default)]
pub struct ReceivedForm {
    pub fields: HashMap<String, String>,
    pub files: Vec<ReceivedFile>,
}

impl ReceivedForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Remove any spooled file still on disk. Files already discarded after a
    /// successful host push are skipped silently.
    pub async fn cleanup(&self) {
        for file in &self.files {
            match tokio::fs::remove_file(&file.path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove temp file {:?}: {}", file.path, e),
            }
        }
    }
}

/// Spool every part of the request. File parts must arrive under the `files`
/// field; count limits are checked later by the workflow so validation order
/// stays: metadata, count, emptiness, per-file type.
///
/// Every failure path sweeps the files already spooled before the error,
/// including a stream that breaks mid-request.
pub async fn receive(mut multipart: Multipart) -> Result<ReceivedForm, ApiError> {
    let cfg = &config::config().uploads;
    let dir = PathBuf::from(&cfg.temp_dir);
    tokio::fs::create_dir_all(&dir).await.map_err(|e| {
        tracing::error!("Failed to create upload temp dir {:?}: {}", dir, e);
        ApiError::internal_server_error("Internal server error")
    })?;

    let mut form = ReceivedForm::default();
    if let Err(err) = spool_parts(&mut multipart, &mut form, cfg, &dir).await {
        form.cleanup().await;
        return Err(err);
    }

    Ok(form)
}

async fn spool_parts(
    multipart: &mut Multipart,
    form: &mut ReceivedForm,
    cfg: &UploadConfig,
    dir: &Path,
) -> Result<(), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("Malformed multipart request"))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "files" {
            let original_name = field
                .file_name()
                .map(str::to_string)
                .unwrap_or_else(|| "upload".to_string());
            let content_type = field
                .content_type()
                .map(str::to_string)
                .unwrap_or_default();

            let bytes = field
                .bytes()
                .await
                .map_err(|_| ApiError::bad_request("Malformed multipart request"))?;

            if bytes.len() > cfg.max_file_size_bytes {
                return Err(ApiError::bad_request(format!(
                    "File '{}' exceeds the maximum size",
                    original_name
                )));
            }

            let path = dir.join(spooled_name(&original_name));
            if let Err(e) = tokio::fs::write(&path, &bytes).await {
                tracing::error!("Failed to spool upload to {:?}: {}", path, e);
                return Err(ApiError::internal_server_error("Internal server error"));
            }

            form.files.push(ReceivedFile {
                original_name,
                content_type,
                size: bytes.len() as u64,
                path,
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|_| ApiError::bad_request("Malformed multipart request"))?;
            form.fields.insert(name, value);
        }
    }

    Ok(())
}

/// Validate every declared media type against the allow-list.
pub fn validate_file_types(files: &[ReceivedFile]) -> Result<(), ApiError> {
    for file in files {
        if !ALLOWED_FILE_TYPES.contains(&file.content_type.as_str()) {
            return Err(ApiError::bad_request(format!(
                "Unsupported file type: {}. Only images are allowed.",
                file.content_type
            )));
        }
    }
    Ok(())
}

/// Unlink a spooled file after a successful host push. Runs detached; a
/// failure is logged, non-fatal.
pub fn discard(path: PathBuf) {
    tokio::spawn(async move {
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!("Error deleting local file {:?}: {}", path, e);
        }
    });
}

/// Unique spool name preserving the original extension
fn spooled_name(original: &str) -> String {
    match Path::new(original).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}", Uuid::new_v4().simple(), ext),
        None => Uuid::new_v4().simple().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content_type: &str) -> ReceivedFile {
        ReceivedFile {
            original_name: "shot.png".to_string(),
            content_type: content_type.to_string(),
            path: PathBuf::from("/tmp/x"),
            size: 1,
        }
    }

    #[test]
    fn allow_list_accepts_every_image_variant() {
        for t in ALLOWED_FILE_TYPES {
            assert!(validate_file_types(&[file(t)]).is_ok(), "{t} rejected");
        }
    }

    #[test]
    fn allow_list_rejects_non_images() {
        let err = validate_file_types(&[file("application/pdf")]).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.message().contains("application/pdf"));
    }

    #[test]
    fn spooled_name_keeps_extension() {
        let name = spooled_name("My Photo.JPG");
        assert!(name.ends_with(".JPG"));
        assert_ne!(spooled_name("a.png"), spooled_name("a.png"));
    }

    #[tokio::test]
    async fn cleanup_removes_spooled_files() {
        let path = std::env::temp_dir().join(spooled_name("sweep.png"));
        tokio::fs::write(&path, b"data").await.expect("write");

        let form = ReceivedForm {
            fields: HashMap::new(),
            files: vec![ReceivedFile {
                original_name: "sweep.png".to_string(),
                content_type: "image/png".to_string(),
                path: path.clone(),
                size: 4,
            }],
        };

        form.cleanup().await;
        assert!(!path.exists());

        // A second sweep over already-removed files is a no-op
        form.cleanup().await;
    }
}
