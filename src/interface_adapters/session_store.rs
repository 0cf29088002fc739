use std::fs::{self, OpenOptions};
use std::io::{self, Write};
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::domain::entities::Session;
use crate::domain::ports::SessionStore;

// In-memory session slot. The whole session is swapped under the write lock.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    session: RwLock<Session>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(session),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self) -> Session {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, session: Session) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    fn clear(&self) {
        self.set(Session::empty());
    }
}

// Session slot mirrored to a JSON file so a session survives restarts.
// The in-memory copy is authoritative; disk failures are logged, never
// returned, so logout cannot fail.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    memory: InMemorySessionStore,
}

impl FileSessionStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = load_session(&path);
        Self {
            path,
            memory: InMemorySessionStore::with_session(session),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, session: &Session) {
        let payload = match serde_json::to_vec_pretty(session) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode session for disk.");
                return;
            }
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(err) = fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), error = %err, "failed to create session directory.");
                return;
            }
        }

        if let Err(err) = write_private_atomically(&self.path, &payload) {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to write session file.");
        }
    }

    fn remove(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to remove session file.");
            }
        }
    }
}

// Tokens are written owner-only to a sibling file, then renamed over the
// target so a crash never leaves a truncated session behind.
fn write_private_atomically(path: &Path, payload: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "session path has no file name"))?;
    let mut staging_name = file_name.to_os_string();
    staging_name.push(".tmp");
    let staging = path.with_file_name(staging_name);

    // A leftover from a crash may carry looser permissions; start fresh.
    let _ = fs::remove_file(&staging);
    let written = write_staged(&staging, path, payload);
    if written.is_err() {
        let _ = fs::remove_file(&staging);
    }
    written
}

fn write_staged(staging: &Path, path: &Path, payload: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);
    let mut file = options.open(staging)?;
    file.write_all(payload)?;
    file.sync_all()?;
    drop(file);
    fs::rename(staging, path)
}

fn load_session(path: &Path) -> Session {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Session::empty(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to read session file.");
            return Session::empty();
        }
    };

    // A corrupt file is treated as logged out rather than a hard failure.
    serde_json::from_slice(&raw).unwrap_or_else(|err| {
        tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable session file.");
        Session::empty()
    })
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Session {
        self.memory.get()
    }

    fn set(&self, session: Session) {
        self.persist(&session);
        self.memory.set(session);
    }

    fn clear(&self) {
        self.remove();
        self.memory.clear();
    }
}
