//! Durable session storage.
//!
//! The logged-in user and the admin flag are persisted to a small bincode
//! file in the config directory, so a session survives process restarts
//! until an explicit logout.

use log::warn;
use serde_derive::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, ErrorKind};
use crate::get_config_dir;

/// The identity returned by the backend on login/signup, as stored locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// The current session: an optional user identity plus the admin-mode flag.
///
/// Loaded explicitly at startup and passed into the views that need it;
/// there is no ambient global.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    user: Option<StoredUser>,
    is_admin: bool,
}

fn session_path() -> PathBuf {
    get_config_dir().join("session")
}

impl Session {
    /// Begin a session for the given user.
    pub fn start(user: StoredUser, is_admin: bool) -> Session {
        Session {
            user: Some(user),
            is_admin,
        }
    }

    /// Load the persisted session from the disk. A missing or corrupt
    /// session file yields an empty session rather than an error.
    pub fn load() -> Session {
        let path = session_path();
        if !path.exists() {
            return Session::default();
        }

        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    "Failed to read session file `{}`: {}",
                    path.to_string_lossy(),
                    e
                );
                return Session::default();
            }
        };

        match bincode::deserialize(&data) {
            Ok(session) => session,
            Err(e) => {
                warn!("Stored session is corrupt, discarding it: {}", e);
                Session::default()
            }
        }
    }

    /// Persist this session to the disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let data = bincode::serialize(self).map_err(|e| {
            ConfigError::new(
                ErrorKind::BincodeError(*e),
                "Failed to serialize session data.",
            )
        })?;

        std::fs::write(session_path(), data).map_err(|e| {
            ConfigError::new(ErrorKind::IoError(e), "Failed to write session to disk.")
        })?;

        Ok(())
    }

    /// Remove any persisted session from the disk.
    pub fn clear() -> Result<(), ConfigError> {
        let path = session_path();
        if path.exists() {
            std::fs::remove_file(path).map_err(|e| {
                ConfigError::new(
                    ErrorKind::IoError(e),
                    "Failed to remove session file from disk.",
                )
            })?;
        }

        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn user(&self) -> Option<&StoredUser> {
        self.user.as_ref()
    }
}
