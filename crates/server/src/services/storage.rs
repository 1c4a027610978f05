//! Object-storage client for letter images.
//!
//! Narrow interface over the storage REST API: upload an object, compute its
//! public URL, remove objects. Paths are `{letter_id}/{timestamp}-{index}.{ext}`;
//! all objects live in a single public bucket.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::StorageConfig;

/// Errors that can occur when interacting with object storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to build the client.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Object-storage API client.
#[derive(Clone)]
pub struct StorageClient {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
}

impl StorageClient {
    /// Create a new storage client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.service_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| StorageError::Parse(format!("Invalid service key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert("Authorization", auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
            bucket: config.bucket.clone(),
        })
    }

    /// Upload an object to the bucket.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Api`] on a non-success response.
    pub async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let url = format!("{}/object/{}/{path}", self.base_url, self.bucket);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    /// The public URL for an object path.
    ///
    /// The bucket is public; no signed URL is involved.
    #[must_use]
    pub fn public_url(&self, path: &str) -> String {
        format!("{}/object/public/{}/{path}", self.base_url, self.bucket)
    }

    /// Remove objects from the bucket.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Api`] on a non-success response.
    pub async fn remove(&self, paths: &[String]) -> Result<(), StorageError> {
        let url = format!("{}/object/{}", self.base_url, self.bucket);

        let body = serde_json::json!({ "prefixes": paths });

        let response = self.client.delete(&url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

/// Derive the storage path for a new upload.
///
/// Follows `{letter_id}/{timestamp_millis}-{index}.{ext}` so objects group
/// by letter and sort by upload time within it. The batch index keeps two
/// files uploaded in the same millisecond from sharing a path.
#[must_use]
pub fn object_path(letter_id: &str, timestamp_millis: i64, index: usize, extension: &str) -> String {
    format!("{letter_id}/{timestamp_millis}-{index}.{extension}")
}

/// Extract a lowercase file extension from an uploaded file name.
///
/// Falls back to "bin" when the name has no extension.
#[must_use]
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "bin".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path() {
        assert_eq!(
            object_path("abc123", 1_700_000_000_000, 0, "png"),
            "abc123/1700000000000-0.png"
        );
    }

    #[test]
    fn test_object_paths_distinct_within_one_millisecond() {
        let first = object_path("abc123", 1_700_000_000_000, 0, "png");
        let second = object_path("abc123", 1_700_000_000_000, 1, "png");
        assert_ne!(first, second);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("photo.PNG"), "png");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("no-extension"), "bin");
        assert_eq!(file_extension("trailing-dot."), "bin");
    }
}
