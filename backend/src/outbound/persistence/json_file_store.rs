//! User and app store persisted as a single JSON document.
//!
//! The file is the only source of truth. Lookups read it afresh, and every
//! mutation runs under an exclusive `.<file>.lock` sibling: the document is
//! re-read, changed, then rewritten through a temporary file and a rename.
//! Several processes may therefore share one file, and operator edits made
//! between requests are never overwritten by a stale copy.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use crate::domain::ports::{
    AppPersistenceError, AppRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{App, AppId, Email, PasswordHash, RequestContext, User, UserId};

use super::auth_state::{AuthState, SnapshotError, StoreSnapshot};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Pause between attempts to take a lock held by another writer.
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(20);
/// Longest wait for another writer before giving up.
const LOCK_WAIT_LIMIT: Duration = Duration::from_secs(5);

/// Errors raised while opening, reading or writing the store file.
#[derive(Debug, thiserror::Error)]
pub enum JsonStoreError {
    /// The path does not name a file.
    #[error("store path {path} must name a file")]
    InvalidPath {
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// Reading or writing the file failed.
    #[error("store file {path} i/o failed: {message}")]
    Io {
        /// File being accessed.
        path: Utf8PathBuf,
        /// Underlying error.
        message: String,
    },
    /// The file is not a valid snapshot document.
    #[error("store file {path} is not valid JSON: {message}")]
    Parse {
        /// File being parsed.
        path: Utf8PathBuf,
        /// Underlying error.
        message: String,
    },
    /// The snapshot is internally inconsistent.
    #[error("store file {path} is inconsistent: {source}")]
    Snapshot {
        /// File being loaded.
        path: Utf8PathBuf,
        /// Inconsistency found.
        #[source]
        source: SnapshotError,
    },
    /// Another writer kept the lock file for longer than the wait limit.
    #[error("store file {path} is locked by another writer; remove {lock} if it is stale")]
    Locked {
        /// Store file.
        path: Utf8PathBuf,
        /// Lock file that stayed in place.
        lock: Utf8PathBuf,
    },
}

impl From<JsonStoreError> for UserPersistenceError {
    fn from(err: JsonStoreError) -> Self {
        Self::connection(err.to_string())
    }
}

impl From<JsonStoreError> for AppPersistenceError {
    fn from(err: JsonStoreError) -> Self {
        Self::connection(err.to_string())
    }
}

/// Exclusive claim on the store file, released on drop.
struct WriteLock<'a> {
    dir: &'a Dir,
    name: &'a str,
}

impl Drop for WriteLock<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.dir.remove_file(self.name) {
            warn!(lock = self.name, error = %err, "failed to release store lock");
        }
    }
}

/// JSON-file implementation of [`UserRepository`] and [`AppRepository`].
///
/// Apps and admin flags are provisioned by editing the file; edits are seen
/// by the next request and preserved by later writes.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: Dir,
    file_name: String,
    lock_name: String,
    path: Utf8PathBuf,
    writer: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store at `path`.
    ///
    /// A missing file reads as an empty store and is only created by the
    /// first write. An existing file must hold a consistent snapshot.
    pub fn open(path: impl AsRef<Utf8Path>) -> Result<Self, JsonStoreError> {
        let path = path.as_ref().to_path_buf();
        let Some(file_name) = path.file_name().map(str::to_owned) else {
            return Err(JsonStoreError::InvalidPath { path });
        };
        let parent = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent.to_path_buf(),
            _ => Utf8PathBuf::from("."),
        };
        let dir = Dir::open_ambient_dir(&parent, ambient_authority()).map_err(|err| {
            JsonStoreError::Io {
                path: parent.clone(),
                message: err.to_string(),
            }
        })?;

        let store = Self {
            dir,
            lock_name: format!(".{file_name}.lock"),
            file_name,
            path,
            writer: Mutex::new(()),
        };
        store.load()?;
        Ok(store)
    }

    /// Add or replace an app and persist the change.
    pub async fn insert_app(&self, app: App) -> Result<(), JsonStoreError> {
        self.update(|state| {
            state.upsert_app(app);
            Ok::<_, JsonStoreError>(())
        })
        .await
    }

    /// Number of stored users.
    pub fn user_count(&self) -> Result<usize, JsonStoreError> {
        Ok(self.load()?.user_count())
    }

    fn load(&self) -> Result<AuthState, JsonStoreError> {
        let snapshot = match self.dir.read_to_string(&self.file_name) {
            Ok(contents) => serde_json::from_str::<StoreSnapshot>(&contents).map_err(|err| {
                JsonStoreError::Parse {
                    path: self.path.clone(),
                    message: err.to_string(),
                }
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path, "store file missing; reading as empty");
                StoreSnapshot::default()
            }
            Err(err) => return Err(self.io_error(&err)),
        };
        AuthState::from_snapshot(snapshot).map_err(|source| JsonStoreError::Snapshot {
            path: self.path.clone(),
            source,
        })
    }

    /// Apply `change` to the current document and write the result.
    ///
    /// Nothing is written when `change` fails.
    async fn update<T, E, F>(&self, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut AuthState) -> Result<T, E>,
        E: From<JsonStoreError>,
    {
        let _serial = self.writer.lock().await;
        let _lock = self.acquire_lock().await?;
        let mut state = self.load()?;
        let value = change(&mut state)?;
        self.persist(&state)?;
        Ok(value)
    }

    async fn acquire_lock(&self) -> Result<WriteLock<'_>, JsonStoreError> {
        let give_up_at = Instant::now() + LOCK_WAIT_LIMIT;
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        loop {
            match self.dir.open_with(&self.lock_name, &options) {
                Ok(_) => {
                    return Ok(WriteLock {
                        dir: &self.dir,
                        name: &self.lock_name,
                    });
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    if Instant::now() >= give_up_at {
                        return Err(JsonStoreError::Locked {
                            path: self.path.clone(),
                            lock: self.sibling(&self.lock_name),
                        });
                    }
                    sleep(LOCK_RETRY_INTERVAL).await;
                }
                Err(err) => return Err(self.io_error(&err)),
            }
        }
    }

    fn persist(&self, state: &AuthState) -> Result<(), JsonStoreError> {
        let snapshot = state
            .to_snapshot()
            .map_err(|source| JsonStoreError::Snapshot {
                path: self.path.clone(),
                source,
            })?;
        let contents =
            serde_json::to_string_pretty(&snapshot).map_err(|err| JsonStoreError::Io {
                path: self.path.clone(),
                message: err.to_string(),
            })?;
        self.write_atomic(&contents)
            .map_err(|err| self.io_error(&err))
    }

    fn write_atomic(&self, contents: &str) -> io::Result<()> {
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_nanos());
        let tmp_name = format!(
            ".{}.tmp.{}.{}.{}",
            self.file_name,
            std::process::id(),
            suffix,
            counter
        );

        if let Err(err) = self.write_temp(&tmp_name, contents) {
            drop(self.dir.remove_file(&tmp_name));
            return Err(err);
        }
        if let Err(err) = self.dir.rename(&tmp_name, &self.dir, &self.file_name) {
            drop(self.dir.remove_file(&tmp_name));
            return Err(err);
        }
        // Best-effort directory sync.
        drop(self.dir.open(".").and_then(|dir| dir.sync_all()));
        Ok(())
    }

    fn write_temp(&self, tmp_name: &str, contents: &str) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        let mut file = self.dir.open_with(tmp_name, &options)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    }

    fn sibling(&self, name: &str) -> Utf8PathBuf {
        self.path.with_file_name(name)
    }

    fn io_error(&self, err: &io::Error) -> JsonStoreError {
        JsonStoreError::Io {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl UserRepository for JsonFileStore {
    async fn save_user(
        &self,
        _ctx: &RequestContext,
        email: &Email,
        password_hash: &PasswordHash,
    ) -> Result<UserId, UserPersistenceError> {
        self.update(|state| state.insert_user(email, password_hash))
            .await
    }

    async fn user_by_email(
        &self,
        _ctx: &RequestContext,
        email: &Email,
    ) -> Result<User, UserPersistenceError> {
        self.load()?.user_by_email(email)
    }

    async fn is_admin(
        &self,
        _ctx: &RequestContext,
        user_id: UserId,
    ) -> Result<bool, UserPersistenceError> {
        self.load()?.is_admin(user_id)
    }
}

#[async_trait]
impl AppRepository for JsonFileStore {
    async fn app_by_id(
        &self,
        _ctx: &RequestContext,
        app_id: AppId,
    ) -> Result<App, AppPersistenceError> {
        self.load()?.app(app_id)
    }
}
