//! Local session storage and lifecycle
//!
//! The session (tokens + user identity) is the only cross-request shared
//! mutable resource. `SessionManager` guards it behind a single lock so a
//! refresh response and a concurrent logout can never interleave into a
//! corrupted state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;

use shared::{Session, User};

use crate::error::{ApiError, ApiResult};

/// Persistence backend for the local session
pub trait SessionStore: Send + Sync {
    fn load(&self) -> ApiResult<Option<Session>>;
    fn save(&self, session: &Session) -> ApiResult<()>;
    fn clear(&self) -> ApiResult<()>;
}

/// File-backed session store
///
/// Writes go to a temp file first and are renamed into place, so a
/// crash mid-write never leaves a truncated session on disk.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> ApiResult<Option<Session>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let session = serde_json::from_str(&contents).map_err(|e| {
                    ApiError::Internal(format!("Corrupt session file: {}", e))
                })?;
                Ok(Some(session))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ApiError::Internal(format!(
                "Failed to read session file: {}",
                e
            ))),
        }
    }

    fn save(&self, session: &Session) -> ApiResult<()> {
        let contents = serde_json::to_string(session)
            .map_err(|e| ApiError::Internal(format!("Failed to serialize session: {}", e)))?;

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, contents)
            .map_err(|e| ApiError::Internal(format!("Failed to write session file: {}", e)))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| ApiError::Internal(format!("Failed to replace session file: {}", e)))?;
        Ok(())
    }

    fn clear(&self) -> ApiResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiError::Internal(format!(
                "Failed to remove session file: {}",
                e
            ))),
        }
    }
}

/// In-memory session store for tests and ephemeral clients
#[derive(Default)]
pub struct MemorySessionStore {
    session: std::sync::Mutex<Option<Session>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> ApiResult<Option<Session>> {
        Ok(self.session.lock().unwrap().clone())
    }

    fn save(&self, session: &Session) -> ApiResult<()> {
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> ApiResult<()> {
        *self.session.lock().unwrap() = None;
        Ok(())
    }
}

/// Authoritative in-memory view of the current session over a store
///
/// At most one valid session exists at a time. `replace` persists the
/// new session before publishing it, and both `replace` and `clear` run
/// as single read-modify-write operations under the write lock.
#[derive(Clone)]
pub struct SessionManager {
    current: Arc<RwLock<Option<Session>>>,
    store: Arc<dyn SessionStore>,
}

impl SessionManager {
    /// Create a manager, loading any persisted session from the store
    pub fn new(store: Arc<dyn SessionStore>) -> ApiResult<Self> {
        let session = store.load()?;
        Ok(Self {
            current: Arc::new(RwLock::new(session)),
            store,
        })
    }

    /// The current session, if any
    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    /// The currently authenticated user, if any
    pub async fn user(&self) -> Option<User> {
        self.current.read().await.as_ref().map(|s| s.user.clone())
    }

    /// Whether a session with a non-expired access token is present
    ///
    /// An expired session is kept in place (its refresh token still
    /// drives the refresh-and-replay path) but no longer counts as
    /// authenticated.
    pub async fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .await
            .as_ref()
            .is_some_and(|s| !s.is_expired())
    }

    /// Atomically replace the session, persisting before publishing
    ///
    /// On a persistence failure the in-memory session is left untouched,
    /// so a failed login never partially overwrites a prior session.
    pub async fn replace(&self, session: Session) -> ApiResult<()> {
        let mut guard = self.current.write().await;
        self.store.save(&session)?;
        *guard = Some(session);
        Ok(())
    }

    /// Atomically clear the session and its persisted copy
    pub async fn clear(&self) -> ApiResult<()> {
        let mut guard = self.current.write().await;
        self.store.clear()?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use shared::UserRole;
    use uuid::Uuid;

    fn session(token: &str) -> Session {
        Session {
            access_token: token.to_string(),
            refresh_token: format!("{}-refresh", token),
            expires_at: Utc::now() + Duration::hours(1),
            user: User {
                id: Uuid::new_v4(),
                username: "agent".to_string(),
                role: UserRole::FieldAgent,
            },
        }
    }

    #[tokio::test]
    async fn test_replace_and_clear() {
        let manager = SessionManager::new(Arc::new(MemorySessionStore::default())).unwrap();
        assert!(!manager.is_authenticated().await);

        manager.replace(session("tok-1")).await.unwrap();
        assert!(manager.is_authenticated().await);
        assert_eq!(manager.current().await.unwrap().access_token, "tok-1");

        manager.replace(session("tok-2")).await.unwrap();
        assert_eq!(manager.current().await.unwrap().access_token, "tok-2");

        manager.clear().await.unwrap();
        assert!(manager.current().await.is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_not_authenticated() {
        let manager = SessionManager::new(Arc::new(MemorySessionStore::default())).unwrap();

        let mut expired = session("tok-1");
        expired.expires_at = Utc::now() - Duration::seconds(1);
        manager.replace(expired).await.unwrap();

        assert!(!manager.is_authenticated().await);
        // The session itself stays in place for the refresh path
        assert!(manager.current().await.is_some());
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileSessionStore::new(&path);
        store.save(&session("tok-1")).unwrap();

        // A fresh manager over the same path sees the persisted session
        let manager = SessionManager::new(Arc::new(FileSessionStore::new(&path))).unwrap();
        assert_eq!(manager.current().await.unwrap().access_token, "tok-1");

        manager.clear().await.unwrap();
        assert!(FileSessionStore::new(&path).load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("missing.json"));
        assert!(store.clear().is_ok());
        assert!(store.load().unwrap().is_none());
    }
}
