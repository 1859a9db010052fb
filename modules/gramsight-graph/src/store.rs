//! Per-account processed-post files: the read boundary between ingestion
//! and the graph/analytics core. Records are validated on load so malformed
//! data fails here, not deep inside an aggregate.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use gramsight_common::{validate_posts, GramsightError, Post};

const PROCESSED_FILE: &str = "processed.json";

/// Read/write access to the normalized post collections, one directory per
/// account under the data root.
#[derive(Debug, Clone)]
pub struct PostStore {
    root: PathBuf,
}

impl PostStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn processed_path(&self, account: &str) -> PathBuf {
        self.root.join(account).join(PROCESSED_FILE)
    }

    /// Load the account's post collection.
    ///
    /// An absent file is a precondition failure (`MissingData`): the caller
    /// asked for an account that was never ingested. A present-but-malformed
    /// file is a validation failure, not silently recovered.
    pub fn load(&self, account: &str) -> Result<Vec<Post>, GramsightError> {
        let path = self.processed_path(account);
        if !path.exists() {
            return Err(GramsightError::MissingData(account.to_string()));
        }

        let raw = fs::read_to_string(&path)?;
        let posts: Vec<Post> =
            serde_json::from_str(&raw).map_err(|e| GramsightError::MalformedData {
                account: account.to_string(),
                message: e.to_string(),
            })?;
        validate_posts(&posts)?;

        debug!(account, count = posts.len(), "Loaded post collection");
        Ok(posts)
    }

    /// Write the account's post collection (used by the ingest pipeline).
    /// Validates before writing so a bad batch never lands on disk.
    pub fn save(&self, account: &str, posts: &[Post]) -> Result<(), GramsightError> {
        validate_posts(posts)?;

        let path = self.processed_path(account);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(posts).map_err(|e| {
            GramsightError::MalformedData {
                account: account.to_string(),
                message: e.to_string(),
            }
        })?;
        fs::write(&path, json)?;

        debug!(account, count = posts.len(), "Saved post collection");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use gramsight_common::MediaType;

    fn post(id: &str) -> Post {
        let ts = Utc.with_ymd_and_hms(2026, 5, 2, 9, 0, 0).unwrap();
        Post {
            post_id: id.into(),
            url: format!("https://www.instagram.com/p/{id}/"),
            caption: Some("caption".into()),
            hashtags: vec![],
            mentions: vec![],
            keywords: vec![],
            themes: vec![],
            theme_scores: Default::default(),
            like_count: 1,
            comment_count: 0,
            media_type: MediaType::Image,
            timestamp: ts,
            month: "2026-05".into(),
        }
    }

    #[test]
    fn load_missing_account_is_precondition_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = PostStore::new(dir.path());
        assert!(matches!(
            store.load("nobody"),
            Err(GramsightError::MissingData(_))
        ));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = PostStore::new(dir.path());
        let posts = vec![post("A"), post("B")];

        store.save("acme", &posts).unwrap();
        let loaded = store.load("acme").unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].post_id, "A");
        assert_eq!(loaded[1].post_id, "B");
    }

    #[test]
    fn load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = PostStore::new(dir.path());
        let path = dir.path().join("acme");
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join(PROCESSED_FILE), b"not json").unwrap();

        assert!(matches!(
            store.load("acme"),
            Err(GramsightError::MalformedData { .. })
        ));
    }

    #[test]
    fn save_rejects_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = PostStore::new(dir.path());
        let posts = vec![post("A"), post("A")];
        assert!(store.save("acme", &posts).is_err());
        assert!(!dir.path().join("acme").join(PROCESSED_FILE).exists());
    }
}
