//! API handlers and shared application state.

pub mod auth;
pub mod file;
pub mod status;
pub mod user;

pub use auth::*;
pub use file::*;
pub use status::*;
pub use user::*;

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::auth::SessionAuthority;
use crate::config::Config;
use crate::file::{FileManager, FileStorage, NodeRepository};
use crate::notify::NotificationQueue;
use crate::{Database, Result};

/// Shared database handle.
pub type SharedDatabase = Arc<Database>;

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: SharedDatabase,
    /// File and folder operations.
    pub files: FileManager,
    /// Session token authority.
    pub sessions: SessionAuthority,
    /// Background job queue.
    pub notifications: NotificationQueue,
}

impl AppState {
    /// Create a new application state from its parts.
    pub fn new(
        db: SharedDatabase,
        files: FileManager,
        sessions: SessionAuthority,
        notifications: NotificationQueue,
    ) -> Self {
        Self {
            db,
            files,
            sessions,
            notifications,
        }
    }

    /// Wire up the default collaborators from configuration.
    ///
    /// Starts the notification worker; the returned handle completes once
    /// the state (and every clone of its queue) is dropped.
    pub fn from_config(db: SharedDatabase, config: &Config) -> Result<(Self, JoinHandle<usize>)> {
        let storage = FileStorage::new(&config.files.storage_path)?;
        tracing::info!("File storage initialized at: {}", config.files.storage_path);

        let files = FileManager::new(
            Arc::new(NodeRepository::new(db.pool().clone())),
            Arc::new(storage),
        );
        let sessions = SessionAuthority::new(
            db.pool().clone(),
            &config.auth.jwt_secret,
            config.auth.session_expiry_secs,
        );
        let (notifications, worker) = NotificationQueue::start(db.clone());

        Ok((Self::new(db, files, sessions, notifications), worker))
    }
}
