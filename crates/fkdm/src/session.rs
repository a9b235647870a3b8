//! Session store.
//!
//! Holds the logged-in [`User`] and mirrors it to the session slot. There is
//! at most one user per session and no expiry: a session is valid exactly as
//! long as a user is held.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::error::{Error, Result};
use crate::storage::SlotStore;

/// The logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identifier.
    pub id: String,
    /// Login name.
    pub username: String,
    /// Display name.
    pub full_name: String,
    /// Organizational identifier.
    pub fkdm_id: String,
    /// Locality ("kelurahan").
    pub kelurahan: String,
}

/// Fields a profile edit may change. `None` leaves a field as it is.
///
/// The user identifier is not editable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New login name.
    pub username: Option<String>,
    /// New display name.
    pub full_name: Option<String>,
    /// New organizational identifier.
    pub fkdm_id: Option<String>,
    /// New locality.
    pub kelurahan: Option<String>,
}

impl ProfileUpdate {
    /// Whether this update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.full_name.is_none()
            && self.fkdm_id.is_none()
            && self.kelurahan.is_none()
    }

    fn apply(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(full_name) = self.full_name {
            user.full_name = full_name;
        }
        if let Some(fkdm_id) = self.fkdm_id {
            user.fkdm_id = fkdm_id;
        }
        if let Some(kelurahan) = self.kelurahan {
            user.kelurahan = kelurahan;
        }
    }
}

/// The current identity, mirrored to a slot.
#[derive(Debug)]
pub struct SessionStore {
    store: Rc<dyn SlotStore>,
    slot: String,
    auth: AuthConfig,
    strict_restore: bool,
    user: Option<User>,
}

impl SessionStore {
    /// Create a store with no current user. Call [`restore`](Self::restore)
    /// to pick up a persisted session.
    #[must_use]
    pub fn new(
        store: Rc<dyn SlotStore>,
        slot: impl Into<String>,
        auth: AuthConfig,
        strict_restore: bool,
    ) -> Self {
        Self {
            store,
            slot: slot.into(),
            auth,
            strict_restore,
            user: None,
        }
    }

    /// Load the persisted session, if any.
    ///
    /// An absent slot leaves no current user. A malformed one is discarded
    /// with a warning, or reported as [`Error::SessionCorrupt`] when strict
    /// restore is on.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read, or if it is malformed and
    /// strict restore is enabled.
    pub fn restore(&mut self) -> Result<Option<&User>> {
        self.user = None;
        let Some(blob) = self.store.read(&self.slot)? else {
            debug!("No persisted session in slot {}", self.slot);
            return Ok(None);
        };

        match serde_json::from_str::<User>(&blob) {
            Ok(user) => {
                debug!("Restored session for {}", user.username);
                self.user = Some(user);
            }
            Err(source) if self.strict_restore => {
                return Err(Error::SessionCorrupt {
                    slot: self.slot.clone(),
                    source,
                });
            }
            Err(e) => {
                warn!(
                    "Discarding malformed session in slot {}: {}",
                    self.slot, e
                );
                self.store.remove(&self.slot)?;
            }
        }
        Ok(self.user.as_ref())
    }

    /// Check a credential pair and start a session on match.
    ///
    /// Returns `false` without touching any state when the pair does not
    /// match.
    ///
    /// # Errors
    ///
    /// Returns an error if the new session cannot be persisted. The current
    /// user is left unchanged in that case.
    pub fn login(&mut self, username: &str, password: &str) -> Result<bool> {
        if username != self.auth.username || password != self.auth.password {
            info!("Rejected login for {}", username);
            return Ok(false);
        }

        let user = User {
            id: self.auth.user_id.clone(),
            username: self.auth.username.clone(),
            full_name: self.auth.full_name.clone(),
            fkdm_id: self.auth.fkdm_id.clone(),
            kelurahan: self.auth.kelurahan.clone(),
        };
        self.persist(&user)?;
        info!("Logged in as {}", user.username);
        self.user = Some(user);
        Ok(true)
    }

    /// End the session. Safe to call when nobody is logged in.
    ///
    /// # Errors
    ///
    /// Returns an error if the session slot cannot be removed.
    pub fn logout(&mut self) -> Result<()> {
        self.store.remove(&self.slot)?;
        if let Some(user) = self.user.take() {
            info!("Logged out {}", user.username);
        }
        Ok(())
    }

    /// Merge profile changes into the current user and persist them.
    ///
    /// Does nothing when no user is logged in.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated user cannot be persisted. The
    /// in-memory user is left unchanged in that case.
    pub fn update_profile(&mut self, update: ProfileUpdate) -> Result<()> {
        let Some(current) = &self.user else {
            debug!("Profile update ignored, no current user");
            return Ok(());
        };

        let mut updated = current.clone();
        update.apply(&mut updated);
        self.persist(&updated)?;
        self.user = Some(updated);
        Ok(())
    }

    /// The current user, if any.
    #[must_use]
    pub fn current(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Whether a user is logged in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    fn persist(&self, user: &User) -> Result<()> {
        let blob = serde_json::to_string(user)?;
        self.store.write(&self.slot, &blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const SLOT: &str = "fkdm_user";

    fn session_with(store: Rc<dyn SlotStore>, strict: bool) -> SessionStore {
        SessionStore::new(store, SLOT, AuthConfig::default(), strict)
    }

    fn memory() -> Rc<dyn SlotStore> {
        Rc::new(MemoryStore::new())
    }

    #[test]
    fn test_login_with_valid_credentials() {
        let store = memory();
        let mut session = session_with(Rc::clone(&store), false);

        assert!(session.login("admin", "admin123").unwrap());

        let user = session.current().unwrap();
        assert_eq!(user.id, "1");
        assert_eq!(user.username, "admin");
        assert_eq!(user.full_name, "Administrator FKDM");
        assert_eq!(user.fkdm_id, "FKDM001");
        assert_eq!(user.kelurahan, "Kelurahan Contoh");
        assert!(store.read(SLOT).unwrap().is_some());
    }

    #[test]
    fn test_login_with_invalid_credentials_has_no_side_effects() {
        let store = memory();
        let mut session = session_with(Rc::clone(&store), false);

        for (name, secret) in [("admin", "wrong"), ("root", "admin123"), ("", ""), ("ADMIN", "admin123")] {
            assert!(!session.login(name, secret).unwrap());
        }
        assert!(session.current().is_none());
        assert_eq!(store.read(SLOT).unwrap(), None);
    }

    #[test]
    fn test_failed_login_keeps_existing_user() {
        let mut session = session_with(memory(), false);
        session.login("admin", "admin123").unwrap();
        let before = session.current().cloned();

        assert!(!session.login("admin", "nope").unwrap());
        assert_eq!(session.current().cloned(), before);
    }

    #[test]
    fn test_login_persist_failure_is_error() {
        let store: Rc<dyn SlotStore> = Rc::new(MemoryStore::with_quota(4));
        let mut session = session_with(store, false);

        let err = session.login("admin", "admin123").unwrap_err();
        assert!(err.is_persistence_failure());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_restore_roundtrip() {
        let store = memory();
        session_with(Rc::clone(&store), false)
            .login("admin", "admin123")
            .unwrap();

        let mut restored = session_with(store, false);
        let user = restored.restore().unwrap().cloned().unwrap();
        assert_eq!(user.fkdm_id, "FKDM001");
        assert!(restored.is_authenticated());
    }

    #[test]
    fn test_restore_without_slot() {
        let mut session = session_with(memory(), false);
        assert!(session.restore().unwrap().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_restore_malformed_degrades_to_no_session() {
        let store = memory();
        store.write(SLOT, "{not json").unwrap();
        let mut session = session_with(Rc::clone(&store), false);

        assert!(session.restore().unwrap().is_none());
        assert_eq!(store.read(SLOT).unwrap(), None);
    }

    #[test]
    fn test_restore_malformed_strict_fails() {
        let store = memory();
        store.write(SLOT, r#"{"id": 1}"#).unwrap();
        let mut session = session_with(Rc::clone(&store), true);

        let err = session.restore().unwrap_err();
        assert!(matches!(err, Error::SessionCorrupt { .. }));
        assert!(store.read(SLOT).unwrap().is_some());
    }

    #[test]
    fn test_logout_is_idempotent() {
        let store = memory();
        let mut session = session_with(Rc::clone(&store), false);
        session.login("admin", "admin123").unwrap();

        session.logout().unwrap();
        session.logout().unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(store.read(SLOT).unwrap(), None);
    }

    #[test]
    fn test_update_profile_merges_and_persists() {
        let store = memory();
        let mut session = session_with(Rc::clone(&store), false);
        session.login("admin", "admin123").unwrap();

        session
            .update_profile(ProfileUpdate {
                kelurahan: Some("Menteng".to_string()),
                ..ProfileUpdate::default()
            })
            .unwrap();

        let user = session.current().unwrap();
        assert_eq!(user.kelurahan, "Menteng");
        assert_eq!(user.full_name, "Administrator FKDM");
        assert_eq!(user.id, "1");

        let mut restored = session_with(store, false);
        assert_eq!(restored.restore().unwrap().unwrap().kelurahan, "Menteng");
    }

    #[test]
    fn test_update_profile_without_user_is_noop() {
        let store = memory();
        let mut session = session_with(Rc::clone(&store), false);

        session
            .update_profile(ProfileUpdate {
                full_name: Some("Someone".to_string()),
                ..ProfileUpdate::default()
            })
            .unwrap();
        assert!(session.current().is_none());
        assert_eq!(store.read(SLOT).unwrap(), None);
    }

    #[test]
    fn test_session_blob_field_names() {
        let store = memory();
        session_with(Rc::clone(&store), false)
            .login("admin", "admin123")
            .unwrap();

        let blob = store.read(SLOT).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
        for key in ["id", "username", "fullName", "fkdmId", "kelurahan"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_profile_update_is_empty() {
        assert!(ProfileUpdate::default().is_empty());
        assert!(!ProfileUpdate {
            username: Some("x".to_string()),
            ..ProfileUpdate::default()
        }
        .is_empty());
    }
}
