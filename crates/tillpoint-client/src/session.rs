//! # Session Store
//!
//! The bearer token pair and the cashier's branch, injected into the client
//! instead of being read ad hoc.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Session Lifecycle                               │
//! │                                                                         │
//! │   startup ──► SessionContext::load(store)   (tokens from last run)     │
//! │                     │                                                   │
//! │   login ─────► set_tokens + set_branch ──► store.save                  │
//! │                     │                                                   │
//! │   401 ───────► refresh ──ok──► set_tokens ──► store.save               │
//! │                     │                                                   │
//! │                     └─fail─► clear ──► store.clear                     │
//! │                                                                         │
//! │   logout ────► clear ──► store.clear                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## File Format
//! ```json
//! { "access_token": "eyJ...", "refresh_token": "eyJ...", "branch": "Andheri" }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Session Data
// =============================================================================

/// What survives a restart.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
}

// Tokens stay out of logs.
impl std::fmt::Debug for SessionData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionData")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("branch", &self.branch)
            .finish()
    }
}

// =============================================================================
// Storage Backends
// =============================================================================

/// Durable storage for [`SessionData`].
pub trait SessionStore: Send + Sync {
    fn load(&self) -> ClientResult<SessionData>;
    fn save(&self, data: &SessionData) -> ClientResult<()>;
    fn clear(&self) -> ClientResult<()>;
}

/// JSON file under the platform data directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSessionStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn io_err(err: std::io::Error) -> ClientError {
    ClientError::Session(err.to_string())
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> ClientResult<SessionData> {
        if !self.path.exists() {
            debug!(path = ?self.path, "No session file, starting logged out");
            return Ok(SessionData::default());
        }
        let contents = std::fs::read_to_string(&self.path).map_err(io_err)?;
        match serde_json::from_str(&contents) {
            Ok(data) => Ok(data),
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Corrupt session file ignored");
                Ok(SessionData::default())
            }
        }
    }

    fn save(&self, data: &SessionData) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json =
            serde_json::to_string_pretty(data).map_err(|e| ClientError::Session(e.to_string()))?;
        // Write then rename so a crash never leaves half a file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(e)),
        }
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    data: Mutex<SessionData>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: SessionData) -> Self {
        MemorySessionStore {
            data: Mutex::new(data),
        }
    }

    fn lock(&self) -> ClientResult<std::sync::MutexGuard<'_, SessionData>> {
        self.data
            .lock()
            .map_err(|_| ClientError::Session("session store lock poisoned".into()))
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> ClientResult<SessionData> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, data: &SessionData) -> ClientResult<()> {
        *self.lock()? = data.clone();
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.lock()? = SessionData::default();
        Ok(())
    }
}

// =============================================================================
// Session Context
// =============================================================================

/// Cached session backed by a store. Cheap to share behind an `Arc`.
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    data: RwLock<SessionData>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext").finish_non_exhaustive()
    }
}

impl SessionContext {
    /// Loads whatever the store holds from the previous run.
    pub fn load(store: Arc<dyn SessionStore>) -> ClientResult<Self> {
        let data = store.load()?;
        Ok(SessionContext {
            store,
            data: RwLock::new(data),
        })
    }

    /// Fresh in-memory session.
    pub fn in_memory() -> Self {
        SessionContext {
            store: Arc::new(MemorySessionStore::new()),
            data: RwLock::new(SessionData::default()),
        }
    }

    pub async fn access_token(&self) -> Option<String> {
        self.data.read().await.access_token.clone()
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.data.read().await.refresh_token.clone()
    }

    pub async fn branch(&self) -> Option<String> {
        self.data.read().await.branch.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.data.read().await.access_token.is_some()
    }

    pub async fn snapshot(&self) -> SessionData {
        self.data.read().await.clone()
    }

    pub async fn set_tokens(&self, access: String, refresh: String) -> ClientResult<()> {
        let mut data = self.data.write().await;
        data.access_token = Some(access);
        data.refresh_token = Some(refresh);
        self.store.save(&data)?;
        debug!("Session tokens stored");
        Ok(())
    }

    pub async fn set_branch(&self, branch: Option<String>) -> ClientResult<()> {
        let mut data = self.data.write().await;
        data.branch = branch.map(|b| b.trim().to_string()).filter(|b| !b.is_empty());
        self.store.save(&data)
    }

    /// Forgets tokens and branch, in memory and on disk.
    pub async fn clear(&self) -> ClientResult<()> {
        let mut data = self.data.write().await;
        *data = SessionData::default();
        self.store.clear()?;
        info!("Session cleared");
        Ok(())
    }
}
