//! Credential store: the pairing record that lets the bridge resume a
//! session without a new QR scan.
//!
//! The file holds a single JSON document. It is never deleted: invalidation
//! renames it to `<name>.backup.<unix-timestamp>` next to the original so an
//! operator can inspect or restore it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Durable identity issued by the bridge after a successful pairing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    /// Device JID of the linked account.
    pub jid: String,
    /// Opaque credential blob, handed back to the bridge on reconnect.
    #[serde(default)]
    pub creds: serde_json::Value,
    /// When pairing completed.
    pub paired_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn new(jid: impl Into<String>, creds: serde_json::Value) -> Self {
        StoredSession {
            jid: jid.into(),
            creds,
            paired_at: Utc::now(),
        }
    }
}

/// Failures reading, writing or moving the credential file.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("credential file {path} is unreadable: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("credential file {path} is corrupt: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode credentials: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to back up {path} to {backup}: {source}")]
    Backup {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// File-backed credential store (default `session.db`).
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SessionStore { path: path.into() }
    }

    /// Path of the credential file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored identity.
    ///
    /// A missing file means "never paired" and yields `Ok(None)`. A file that
    /// exists but cannot be read or decoded is an error.
    pub fn load(&self) -> Result<Option<StoredSession>, SessionStoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored credentials");
                return Ok(None);
            }
            Err(source) => {
                return Err(SessionStoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let session = serde_json::from_str(&content).map_err(|source| SessionStoreError::Decode {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(session))
    }

    /// Persist a freshly paired identity, replacing any previous one.
    pub fn save(&self, session: &StoredSession) -> Result<(), SessionStoreError> {
        let io_err = |source| SessionStoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json).map_err(io_err)?;

        debug!(path = %self.path.display(), jid = %session.jid, "credentials saved");
        Ok(())
    }

    /// Move the credential file aside so the next start pairs from scratch.
    ///
    /// Returns the backup path, or `None` when there was nothing to move.
    pub fn invalidate_and_backup(&self) -> Result<Option<PathBuf>, SessionStoreError> {
        self.backup_at(Utc::now().timestamp())
    }

    fn backup_at(&self, mut timestamp: i64) -> Result<Option<PathBuf>, SessionStoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        // Two failures within the same second must not clobber an older backup.
        let mut backup = self.backup_path(timestamp);
        while backup.exists() {
            timestamp += 1;
            backup = self.backup_path(timestamp);
        }

        std::fs::rename(&self.path, &backup).map_err(|source| SessionStoreError::Backup {
            path: self.path.clone(),
            backup: backup.clone(),
            source,
        })?;

        info!(
            path = %self.path.display(),
            backup = %backup.display(),
            "credentials invalidated and backed up"
        );
        Ok(Some(backup))
    }

    /// `<dir>/<file-name>.backup.<timestamp>`
    fn backup_path(&self, timestamp: i64) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "session.db".to_string());
        self.path.with_file_name(format!("{name}.backup.{timestamp}"))
    }

    /// Existing backups of this store, oldest first.
    pub fn list_backups(&self) -> Vec<PathBuf> {
        let Some(name) = self.path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return Vec::new();
        };
        let prefix = format!("{name}.backup.");
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("."),
        };

        let Ok(entries) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };

        let mut backups: Vec<(i64, PathBuf)> = entries
            .flatten()
            .filter_map(|entry| {
                let file_name = entry.file_name().to_string_lossy().into_owned();
                let ts = file_name.strip_prefix(&prefix)?.parse::<i64>().ok()?;
                Some((ts, entry.path()))
            })
            .collect();
        backups.sort_by_key(|(ts, _)| *ts);
        backups.into_iter().map(|(_, p)| p).collect()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> StoredSession {
        StoredSession::new(
            "34612345678:3@s.whatsapp.net",
            serde_json::json!({ "noiseKey": "abc", "registrationId": 7 }),
        )
    }

    fn is_backup_name(path: &Path) -> bool {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        match name.strip_prefix("session.db.backup.") {
            Some(digits) => !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()),
            None => false,
        }
    }

    #[test]
    fn test_load_absent_is_none() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.db"));
        assert!(store.load().unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.db"));
        let session = sample();

        store.save(&session).unwrap();
        assert!(store.path().exists());

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("state").join("session.db"));
        store.save(&sample()).unwrap();
        assert!(store.load().unwrap().is_some());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.db");
        std::fs::write(&path, "\0\0 not json").unwrap();

        let store = SessionStore::new(&path);
        let err = store.load().unwrap_err();
        assert!(matches!(err, SessionStoreError::Decode { .. }));
        assert!(err.to_string().contains("corrupt"));
    }

    #[test]
    fn test_backup_renames_and_keeps_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.db");
        std::fs::write(&path, "original bytes").unwrap();

        let store = SessionStore::new(&path);
        let backup = store.invalidate_and_backup().unwrap().unwrap();

        assert!(!path.exists());
        assert!(is_backup_name(&backup));
        assert_eq!(backup.parent(), path.parent());
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "original bytes");

        let backups = store.list_backups();
        assert_eq!(backups, vec![backup]);
    }

    #[test]
    fn test_backup_without_file_is_noop() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.db"));
        assert!(store.invalidate_and_backup().unwrap().is_none());
        assert!(store.list_backups().is_empty());
    }

    #[test]
    fn test_backup_never_overwrites_previous_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.db");
        let store = SessionStore::new(&path);

        std::fs::write(&path, "first").unwrap();
        let first = store.backup_at(1_700_000_000).unwrap().unwrap();

        std::fs::write(&path, "second").unwrap();
        let second = store.backup_at(1_700_000_000).unwrap().unwrap();

        assert_ne!(first, second);
        assert!(first.ends_with("session.db.backup.1700000000"));
        assert!(second.ends_with("session.db.backup.1700000001"));
        assert_eq!(std::fs::read_to_string(&first).unwrap(), "first");
        assert_eq!(std::fs::read_to_string(&second).unwrap(), "second");
        assert_eq!(store.list_backups(), vec![first, second]);
    }

    #[test]
    fn test_list_backups_ignores_unrelated_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("session.db.backup.notdigits"), "x").unwrap();
        std::fs::write(dir.path().join("other.db.backup.123"), "x").unwrap();
        let store = SessionStore::new(dir.path().join("session.db"));
        assert!(store.list_backups().is_empty());
    }
}
