//! User directory and session management
//!
//! A deliberately separate persistence boundary from the engine snapshot:
//! one record holds the registered users, another the current session.
//! Lookup is a linear scan over email/password pairs. Credentials are
//! stored in clear text; this module is not hardened against tampering
//! or concurrent sessions.

use crate::error::EngineError;
use crate::persist::{read_json_record, write_json_record};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// A registered user, password included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// The logged-in identity exposed to the rest of the application.
/// Never carries the password.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&UserRecord> for SessionUser {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            email: record.email.clone(),
        }
    }
}

/// Trait for user/session persistence
pub trait DirectoryStore: Send + Sync {
    fn load_users(&self) -> Result<Vec<UserRecord>>;
    fn save_users(&self, users: &[UserRecord]) -> Result<()>;
    fn load_session(&self) -> Result<Option<SessionUser>>;
    fn save_session(&self, session: Option<&SessionUser>) -> Result<()>;
}

/// In-memory directory for tests and throwaway sessions
#[derive(Default)]
pub struct MemoryDirectory {
    users: Mutex<Vec<UserRecord>>,
    session: Mutex<Option<SessionUser>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DirectoryStore for MemoryDirectory {
    fn load_users(&self) -> Result<Vec<UserRecord>> {
        Ok(self.users.lock().expect("user list poisoned").clone())
    }

    fn save_users(&self, users: &[UserRecord]) -> Result<()> {
        *self.users.lock().expect("user list poisoned") = users.to_vec();
        Ok(())
    }

    fn load_session(&self) -> Result<Option<SessionUser>> {
        Ok(self.session.lock().expect("session poisoned").clone())
    }

    fn save_session(&self, session: Option<&SessionUser>) -> Result<()> {
        *self.session.lock().expect("session poisoned") = session.cloned();
        Ok(())
    }
}

/// File-backed directory: one JSON document for users, one for the session
pub struct JsonFileDirectory {
    users_path: PathBuf,
    session_path: PathBuf,
}

impl JsonFileDirectory {
    pub fn new(users_path: impl Into<PathBuf>, session_path: impl Into<PathBuf>) -> Self {
        Self {
            users_path: users_path.into(),
            session_path: session_path.into(),
        }
    }
}

impl DirectoryStore for JsonFileDirectory {
    fn load_users(&self) -> Result<Vec<UserRecord>> {
        // Malformed user lists are discarded, matching snapshot handling.
        Ok(read_json_record(&self.users_path)?.unwrap_or_default())
    }

    fn save_users(&self, users: &[UserRecord]) -> Result<()> {
        write_json_record(&self.users_path, &users.to_vec())
    }

    fn load_session(&self) -> Result<Option<SessionUser>> {
        Ok(read_json_record(&self.session_path)?.flatten())
    }

    fn save_session(&self, session: Option<&SessionUser>) -> Result<()> {
        write_json_record(&self.session_path, &session.cloned())
    }
}

/// Registration and login over a [`DirectoryStore`].
pub struct UserDirectory {
    store: Box<dyn DirectoryStore>,
    session: Option<SessionUser>,
}

impl UserDirectory {
    /// Open the directory and resume any stored session.
    pub fn new(store: Box<dyn DirectoryStore>) -> Self {
        let session = store.load_session().unwrap_or_default();
        Self { store, session }
    }

    pub fn current_user(&self) -> Option<&SessionUser> {
        self.session.as_ref()
    }

    /// Register a new user and log them in. Fails when the email is
    /// already taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<SessionUser> {
        let email = email.into();
        let mut users = self.store.load_users()?;

        if users.iter().any(|u| u.email == email) {
            return Err(EngineError::DuplicateEmail(email));
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            name: name.into(),
            email,
            password: password.into(),
        };
        let session = SessionUser::from(&record);
        users.push(record);
        self.store.save_users(&users)?;

        info!(user_id = %session.id, "user registered");
        self.start_session(session)
    }

    /// Log in by linear scan for a matching email/password pair. A miss
    /// is `Ok(None)`, not an error.
    pub fn login(&mut self, email: &str, password: &str) -> Result<Option<SessionUser>> {
        let users = self.store.load_users()?;

        let Some(record) = users
            .iter()
            .find(|u| u.email == email && u.password == password)
        else {
            return Ok(None);
        };

        let session = SessionUser::from(record);
        info!(user_id = %session.id, "user logged in");
        self.start_session(session).map(Some)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.session = None;
        self.store.save_session(None)
    }

    fn start_session(&mut self, session: SessionUser) -> Result<SessionUser> {
        self.store.save_session(Some(&session))?;
        self.session = Some(session.clone());
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_directory() -> UserDirectory {
        UserDirectory::new(Box::new(MemoryDirectory::new()))
    }

    #[test]
    fn test_register_and_login() {
        let mut directory = test_directory();
        let user = directory
            .register("Asha", "asha@example.in", "secret123")
            .unwrap();
        assert_eq!(directory.current_user(), Some(&user));

        directory.logout().unwrap();
        assert!(directory.current_user().is_none());

        let back = directory.login("asha@example.in", "secret123").unwrap();
        assert_eq!(back, Some(user));
    }

    #[test]
    fn test_duplicate_email_is_rejected() {
        let mut directory = test_directory();
        directory
            .register("Asha", "asha@example.in", "secret123")
            .unwrap();

        let err = directory
            .register("Other Asha", "asha@example.in", "different")
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateEmail(_)));
    }

    #[test]
    fn test_wrong_password_misses() {
        let mut directory = test_directory();
        directory
            .register("Asha", "asha@example.in", "secret123")
            .unwrap();
        directory.logout().unwrap();

        assert_eq!(directory.login("asha@example.in", "nope").unwrap(), None);
        assert_eq!(directory.login("unknown@example.in", "secret123").unwrap(), None);
        assert!(directory.current_user().is_none());
    }

    #[test]
    fn test_session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let users = dir.path().join("users.json");
        let session = dir.path().join("user.json");

        let mut directory =
            UserDirectory::new(Box::new(JsonFileDirectory::new(&users, &session)));
        let registered = directory
            .register("Asha", "asha@example.in", "secret123")
            .unwrap();

        let reopened = UserDirectory::new(Box::new(JsonFileDirectory::new(&users, &session)));
        assert_eq!(reopened.current_user(), Some(&registered));
    }

    #[test]
    fn test_malformed_user_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let users = dir.path().join("users.json");
        std::fs::write(&users, b"[{ not json").unwrap();

        let directory = JsonFileDirectory::new(&users, dir.path().join("user.json"));
        assert!(directory.load_users().unwrap().is_empty());
    }
}
