//! Action Log Store - Atomic JSON Points Persistence
//!
//! Keeps every logged user action in `user_points.json`, a map from
//! address to its actions in append order. Each append rewrites the
//! file atomically (write to tmp file, then rename), so the file is
//! always either the old or the new version.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::domain::points::UserAction;
use crate::ports::repository::ActionRepository;

type ActionMap = BTreeMap<String, Vec<UserAction>>;

/// JSON file-backed action log.
pub struct ActionLogStore {
    path: PathBuf,
    tmp_path: PathBuf,
    /// Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl ActionLogStore {
    /// Create a store in the given data directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub async fn new(data_dir: &str) -> Result<Self> {
        let dir = Path::new(data_dir);
        fs::create_dir_all(dir)
            .await
            .context("Failed to create data directory")?;

        Ok(Self {
            path: dir.join("user_points.json"),
            tmp_path: dir.join("user_points.json.tmp"),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty log.
    async fn load(&self) -> Result<ActionMap> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(ActionMap::new());
        }

        let json = fs::read_to_string(&self.path)
            .await
            .context("Failed to read action log")?;
        serde_json::from_str(&json).context("Failed to parse action log JSON")
    }

    async fn save(&self, map: &ActionMap) -> Result<()> {
        let json = serde_json::to_string_pretty(map).context("Failed to serialize action log")?;

        fs::write(&self.tmp_path, &json)
            .await
            .context("Failed to write tmp action log")?;

        fs::rename(&self.tmp_path, &self.path)
            .await
            .context("Failed to rename action log")?;

        Ok(())
    }
}

#[async_trait]
impl ActionRepository for ActionLogStore {
    #[instrument(skip(self, action), fields(address = %action.address, action = ?action.action))]
    async fn append(&self, action: &UserAction) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut map = self.load().await?;
        map.entry(action.address.clone())
            .or_default()
            .push(action.clone());
        self.save(&map).await?;

        debug!(path = %self.path.display(), "Action appended");
        Ok(())
    }

    async fn actions_for(&self, address: &str) -> Result<Vec<UserAction>> {
        let mut map = self.load().await?;
        Ok(map.remove(address).unwrap_or_default())
    }

    async fn is_healthy(&self) -> bool {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return true;
        }
        fs::metadata(&self.path).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::points::ActionKind;

    fn action(address: &str, kind: ActionKind, ts: i64) -> UserAction {
        UserAction {
            address: address.to_string(),
            action: kind,
            timestamp: ts,
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ActionLogStore::new(dir.path().to_str().unwrap()).await.unwrap();
        assert!(store.actions_for("0xabc").await.unwrap().is_empty());
        assert!(store.is_healthy().await);
    }

    #[tokio::test]
    async fn test_append_keeps_order_per_address() {
        let dir = tempfile::tempdir().unwrap();
        let store = ActionLogStore::new(dir.path().to_str().unwrap()).await.unwrap();

        store.append(&action("0xa", ActionKind::NftMint, 1)).await.unwrap();
        store.append(&action("0xb", ActionKind::PredictionBet, 2)).await.unwrap();
        store.append(&action("0xa", ActionKind::EarnPosition, 3)).await.unwrap();

        let a = store.actions_for("0xa").await.unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a[0].action, ActionKind::NftMint);
        assert_eq!(a[1].timestamp, 3);
        assert_eq!(store.actions_for("0xb").await.unwrap().len(), 1);
        assert!(!dir.path().join("user_points.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_path_points_at_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ActionLogStore::new(dir.path().to_str().unwrap()).await.unwrap();
        assert_eq!(store.path(), dir.path().join("user_points.json").as_path());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("user_points.json"), "not json").unwrap();
        let store = ActionLogStore::new(dir.path().to_str().unwrap()).await.unwrap();
        assert!(store.actions_for("0xa").await.is_err());
    }
}
