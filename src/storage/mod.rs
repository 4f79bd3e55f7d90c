use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Allowed document extensions
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "pdf"];

/// Maximum file size (10 MB)
const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

pub const DOCUMENTS_PREFIX: &str = "documents";
pub const CERTIFICATES_PREFIX: &str = "certificates";

/// Blob store for uploaded documents and generated certificates. Writes are
/// once per path: a duplicate path is an error, never a silent overwrite.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `data` at `path` and returns the public URL.
    /// Fails with Conflict if the path already exists.
    async fn upload(&self, path: &str, data: &[u8]) -> Result<String>;

    fn public_url(&self, path: &str) -> String;
}

pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(root_dir: &str, public_base_url: &str) -> Self {
        Self {
            root: PathBuf::from(root_dir),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(&self, path: &str, data: &[u8]) -> Result<String> {
        if path.contains("..") {
            return Err(AppError::Validation("Invalid object path".to_string()));
        }

        let full_path = self.root.join(path);

        if fs::try_exists(&full_path).await.unwrap_or(false) {
            return Err(AppError::Conflict(format!("Object already exists: {}", path)));
        }

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Internal(format!("Failed to create storage directory: {}", e))
            })?;
        }

        let mut file = fs::File::create(&full_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create object: {}", e)))?;

        file.write_all(data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write object: {}", e)))?;

        Ok(self.public_url(path))
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path)
    }
}

/// Saves an uploaded document under a unique name.
/// Retries with a disambiguated name if the generated path collides.
pub async fn save_document(
    store: &dyn ObjectStore,
    filename: &str,
    data: &[u8],
) -> Result<String> {
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::Validation("File too large (max 10 MB)".to_string()));
    }

    let extension = filename
        .rsplit('.')
        .next()
        .map(|s| s.to_lowercase())
        .ok_or_else(|| AppError::Validation("Invalid filename".to_string()))?;

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::Validation(format!(
            "Invalid file type. Allowed: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    let path = format!("{}/{}.{}", DOCUMENTS_PREFIX, Uuid::new_v4(), extension);
    match store.upload(&path, data).await {
        Err(AppError::Conflict(_)) => {
            let retry_path = format!("{}/{}.{}", DOCUMENTS_PREFIX, Uuid::new_v4(), extension);
            store.upload(&retry_path, data).await
        }
        other => other,
    }
}

/// Stores a rendered certificate PDF. Certificate rows are append-only, so a
/// regeneration for the same number gets a disambiguated path.
pub async fn save_certificate_pdf(
    store: &dyn ObjectStore,
    certificate_number: &str,
    data: &[u8],
) -> Result<String> {
    let slug = certificate_number.replace(' ', "_");
    let path = format!("{}/{}.pdf", CERTIFICATES_PREFIX, slug);
    match store.upload(&path, data).await {
        Err(AppError::Conflict(_)) => {
            let retry_path = format!(
                "{}/{}_{}.pdf",
                CERTIFICATES_PREFIX,
                slug,
                Uuid::new_v4().simple()
            );
            store.upload(&retry_path, data).await
        }
        other => other,
    }
}
