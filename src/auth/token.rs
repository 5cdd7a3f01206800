// Bearer token storage.
// A durable file scope for "remember me" logins and a session scope that lives in memory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::Result;

/// Where a token is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScope {
    /// Survives process restarts.
    Durable,
    /// Dropped with the store.
    Session,
}

/// Two-slot token store. Presence of either slot means "authenticated".
#[derive(Debug)]
pub struct TokenStore {
    durable_path: Option<PathBuf>,
    session: Mutex<Option<String>>,
}

impl TokenStore {
    /// Store whose durable slot is the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            durable_path: Some(path.into()),
            session: Mutex::new(None),
        }
    }

    /// Store using the user's data directory for the durable slot.
    pub fn from_default_location() -> Self {
        Self {
            durable_path: crate::paths::token_path(),
            session: Mutex::new(None),
        }
    }

    /// Store without a durable slot; "remember me" tokens stay in memory.
    pub fn in_memory() -> Self {
        Self {
            durable_path: None,
            session: Mutex::new(None),
        }
    }

    /// Current token, durable slot first.
    pub fn get(&self) -> Option<String> {
        self.read_durable().or_else(|| self.session_slot().clone())
    }

    /// Store a token in the scope chosen by `remember`.
    pub fn set(&self, token: &str, remember: bool) -> Result<TokenScope> {
        if remember {
            if let Some(path) = &self.durable_path {
                write_atomic(path, token)?;
                debug!(path = %path.display(), "Stored durable auth token");
                return Ok(TokenScope::Durable);
            }
        }
        *self.session_slot() = Some(token.to_string());
        Ok(TokenScope::Session)
    }

    /// Remove the token from both scopes.
    pub fn clear(&self) -> Result<()> {
        *self.session_slot() = None;
        if let Some(path) = &self.durable_path {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }

    fn read_durable(&self) -> Option<String> {
        let path = self.durable_path.as_ref()?;
        let contents = fs::read_to_string(path).ok()?;
        let token = contents.trim();
        (!token.is_empty()).then(|| token.to_string())
    }

    fn session_slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // A poisoned slot still holds a valid Option.
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Write via temp file and rename so a crash never leaves a truncated token.
///
/// The temp file is created owner-only (0600 on unix) and keeps that mode after the rename.
fn write_atomic(path: &Path, text: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(text.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;

    Ok(())
}
