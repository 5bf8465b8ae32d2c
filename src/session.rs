//! The current user, persisted between runs.
//!
//! A [`Session`] is created by [`Session::login`] or restored by
//! [`Session::init`] and then handed explicitly to whatever needs to know who
//! is ordering. [`Session::logout`] removes the persisted record.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::api::OrderApi;
use crate::domain::User;
use crate::error::SessionError;

/// File-backed storage for the current user record.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<User>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, user: &User) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(user)?)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub is_admin: bool,
}

impl Session {
    /// Builds a session for `user`. Admin rights follow the configured admin name.
    pub fn new(user: User, admin_name: &str) -> Self {
        let is_admin = user.has_name(admin_name);
        Self { user, is_admin }
    }

    /// Restores the persisted session, if there is one.
    pub fn init(store: &SessionStore, admin_name: &str) -> Result<Option<Self>, SessionError> {
        let session = store.load()?.map(|user| Self::new(user, admin_name));
        match &session {
            Some(s) => info!(user_id = s.user.id, user_name = %s.user.name, "Session restored"),
            None => debug!(path = %store.path().display(), "No stored session"),
        }
        Ok(session)
    }

    /// Resolves `name` to a backend user, creating one if no user has that name
    /// (compared case-insensitively), and persists the result.
    #[instrument(skip(api, store))]
    pub async fn login<A: OrderApi>(
        api: &A,
        store: &SessionStore,
        name: &str,
        admin_name: &str,
    ) -> Result<Self, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }

        let existing = api.list_users().await?.into_iter().find(|u| u.has_name(name));
        let user = match existing {
            Some(user) => {
                debug!(user_id = user.id, "Matched existing user");
                user
            }
            None => {
                let user = api.create_user(name).await?;
                info!(user_id = user.id, "Created user");
                user
            }
        };

        store.save(&user)?;
        let session = Self::new(user, admin_name);
        info!(user_id = session.user.id, is_admin = session.is_admin, "Logged in");
        Ok(session)
    }

    pub fn logout(self, store: &SessionStore) -> Result<(), SessionError> {
        store.clear()?;
        info!(user_id = self.user.id, "Logged out");
        Ok(())
    }
}
