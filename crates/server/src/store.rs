//! Local letter store.
//!
//! A single keyed mapping from letter ID to the full letter record, persisted
//! wholesale as one JSON file on every read and write. Single-process,
//! single-writer: concurrent writers serialize behind an async mutex and the
//! last write wins. Persistence failures never surface to callers; `save`
//! logs and degrades to a no-op, `get` logs and reports the letter absent.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use cartinha_core::LetterId;

use crate::models::Letter;

/// File-backed letter store.
///
/// Cheaply cloneable; clones share the same file lock.
#[derive(Clone)]
pub struct LetterStore {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LetterStore {
    /// Create a store backed by the given JSON file.
    ///
    /// The file (and its parent directory) is created lazily on first save.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            inner: Arc::new(Inner {
                path,
                lock: Mutex::new(()),
            }),
        }
    }

    /// Upsert a letter by its ID.
    ///
    /// Never fails from the caller's perspective: serialization and IO
    /// errors are logged and the operation becomes a no-op.
    pub async fn save(&self, letter: Letter) {
        let _guard = self.inner.lock.lock().await;

        let mut letters = self.load().await;
        letters.insert(letter.id.as_str().to_owned(), letter);

        let json = match serde_json::to_vec_pretty(&letters) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize letter store");
                return;
            }
        };

        if let Some(parent) = self.inner.path.parent()
            && let Err(e) = tokio::fs::create_dir_all(parent).await
        {
            tracing::error!(error = %e, "Failed to create letter store directory");
            return;
        }

        if let Err(e) = tokio::fs::write(&self.inner.path, json).await {
            tracing::error!(error = %e, path = %self.inner.path.display(), "Failed to write letter store");
        }
    }

    /// Get a letter by its ID.
    ///
    /// Returns `None` when the letter is absent or the store cannot be read
    /// (missing file, deserialization failure).
    pub async fn get(&self, id: &LetterId) -> Option<Letter> {
        let _guard = self.inner.lock.lock().await;
        self.load().await.remove(id.as_str())
    }

    /// Load the whole mapping; caller must hold the lock.
    async fn load(&self) -> HashMap<String, Letter> {
        let bytes = match tokio::fs::read(&self.inner.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                tracing::error!(error = %e, path = %self.inner.path.display(), "Failed to read letter store");
                return HashMap::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(letters) => letters,
            Err(e) => {
                tracing::error!(error = %e, "Letter store file is corrupt; treating as empty");
                HashMap::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn sample_letter(id: &str) -> Letter {
        Letter {
            id: LetterId::new(id),
            sender: "Maria".to_string(),
            recipient: "João".to_string(),
            content: "Primeira linha\nSegunda linha".to_string(),
            signature: Some("Com amor".to_string()),
            is_anonymous: false,
            password: None,
            background_style: Some("roses".to_string()),
            letter_type: Some("romantic".to_string()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_then_get_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LetterStore::new(dir.path().join("letters.json"));

        let letter = sample_letter("abc123");
        store.save(letter.clone()).await;

        let fetched = store.get(&LetterId::new("abc123")).await;
        assert_eq!(fetched, Some(letter));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LetterStore::new(dir.path().join("letters.json"));

        assert_eq!(store.get(&LetterId::new("nope")).await, None);
    }

    #[tokio::test]
    async fn test_save_upserts_by_id() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LetterStore::new(dir.path().join("letters.json"));

        let mut letter = sample_letter("abc123");
        store.save(letter.clone()).await;

        letter.content = "Novo conteúdo".to_string();
        store.save(letter.clone()).await;

        let fetched = store.get(&LetterId::new("abc123")).await.expect("present");
        assert_eq!(fetched.content, "Novo conteúdo");
    }

    #[tokio::test]
    async fn test_save_keeps_other_letters() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LetterStore::new(dir.path().join("letters.json"));

        store.save(sample_letter("first1")).await;
        store.save(sample_letter("second")).await;

        assert!(store.get(&LetterId::new("first1")).await.is_some());
        assert!(store.get(&LetterId::new("second")).await.is_some());
    }

    #[tokio::test]
    async fn test_corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("letters.json");
        std::fs::write(&path, b"{ not json").expect("write");

        let store = LetterStore::new(path);
        assert_eq!(store.get(&LetterId::new("abc123")).await, None);

        // saving over a corrupt file recovers the store
        store.save(sample_letter("abc123")).await;
        assert!(store.get(&LetterId::new("abc123")).await.is_some());
    }

    #[tokio::test]
    async fn test_save_failure_is_swallowed() {
        let dir = tempfile::tempdir().expect("tempdir");
        // the store path is a directory, so the write must fail
        let store = LetterStore::new(dir.path().to_path_buf());

        // must not panic
        store.save(sample_letter("abc123")).await;
        assert_eq!(store.get(&LetterId::new("abc123")).await, None);
    }
}
