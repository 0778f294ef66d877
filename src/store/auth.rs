use chrono::{DateTime, Duration, Utc};

use crate::models::User;
use crate::storage::{SharedStorage, Storage, keys, read_json, write_json};

/// Authentication state. Login is all-or-nothing: profile and token are
/// committed together or not at all. Startup is trust-but-verify: a stored
/// profile marks the session authenticated optimistically until a
/// background validation call settles it.
pub struct AuthState {
    user: Option<User>,
    is_authenticated: bool,
    loading: bool,
    error: Option<String>,
    session_started_at: Option<DateTime<Utc>>,
    session_expires_at: Option<DateTime<Utc>>,
    storage: SharedStorage,
}

impl AuthState {
    /// Rehydrate: a stored profile authenticates optimistically, pending
    /// validation against the remote service.
    pub fn load(storage: SharedStorage) -> Self {
        let user: Option<User> = read_json(storage.as_ref(), keys::USER);
        let is_authenticated = user.is_some();
        Self {
            user,
            is_authenticated,
            loading: false,
            error: None,
            session_started_at: None,
            session_expires_at: None,
            storage,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn session_expired(&self, now: DateTime<Utc>) -> bool {
        self.session_expires_at.is_some_and(|at| now >= at)
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn login_pending(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn login_fulfilled(&mut self, user: User, expires_in_mins: Option<u32>) {
        let now = Utc::now();
        self.loading = false;
        self.error = None;
        self.is_authenticated = true;
        self.session_started_at = Some(now);
        self.session_expires_at =
            expires_in_mins.map(|mins| now + Duration::minutes(i64::from(mins)));
        write_json(self.storage.as_ref(), keys::USER, &user);
        self.user = Some(user);
    }

    pub fn login_rejected(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
        self.is_authenticated = false;
    }

    /// Background validation confirmed the stored session.
    pub fn validate_fulfilled(&mut self, user: User) {
        self.loading = false;
        self.is_authenticated = true;
        write_json(self.storage.as_ref(), keys::USER, &user);
        self.user = Some(user);
    }

    /// Background validation failed: drop the session entirely.
    pub fn validate_rejected(&mut self) {
        self.loading = false;
        self.forget_session();
    }

    pub fn logout(&mut self) {
        self.error = None;
        self.forget_session();
    }

    fn forget_session(&mut self) {
        self.user = None;
        self.is_authenticated = false;
        self.session_started_at = None;
        self.session_expires_at = None;
        self.storage.remove(keys::USER);
        self.storage.remove(keys::AUTH_TOKEN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::storage::{MemoryStorage, Storage};

    fn user() -> User {
        User {
            id: 1,
            username: "emilys".to_string(),
            email: "emily@example.com".to_string(),
            first_name: Some("Emily".to_string()),
            last_name: None,
            gender: None,
            image: None,
        }
    }

    #[test]
    fn stored_profile_authenticates_optimistically() {
        let storage = Arc::new(MemoryStorage::new());
        write_json(storage.as_ref(), keys::USER, &user());
        let auth = AuthState::load(storage);
        assert!(auth.is_authenticated());
        assert_eq!(auth.user().unwrap().username, "emilys");
    }

    #[test]
    fn corrupt_stored_profile_stays_logged_out() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::USER, "{broken");
        let auth = AuthState::load(storage);
        assert!(!auth.is_authenticated());
        assert!(auth.user().is_none());
    }

    #[test]
    fn login_fulfilled_commits_profile_and_session() {
        let storage = Arc::new(MemoryStorage::new());
        let mut auth = AuthState::load(storage.clone());
        auth.login_pending();
        assert!(auth.is_loading());
        auth.login_fulfilled(user(), Some(30));
        assert!(auth.is_authenticated());
        assert!(!auth.session_expired(Utc::now()));
        assert!(auth.session_expired(Utc::now() + Duration::minutes(31)));
        assert!(storage.get(keys::USER).is_some());
    }

    #[test]
    fn rejected_login_never_partially_authenticates() {
        let storage = Arc::new(MemoryStorage::new());
        let mut auth = AuthState::load(storage.clone());
        auth.login_pending();
        auth.login_rejected("Invalid credentials");
        assert!(!auth.is_authenticated());
        assert!(auth.user().is_none());
        assert_eq!(auth.error(), Some("Invalid credentials"));
        assert!(storage.get(keys::USER).is_none());
    }

    #[test]
    fn failed_validation_clears_profile_and_token() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::AUTH_TOKEN, "stale-token");
        write_json(storage.as_ref(), keys::USER, &user());
        let mut auth = AuthState::load(storage.clone());
        assert!(auth.is_authenticated());
        auth.validate_rejected();
        assert!(!auth.is_authenticated());
        assert!(storage.get(keys::USER).is_none());
        assert!(storage.get(keys::AUTH_TOKEN).is_none());
    }

    #[test]
    fn logout_removes_profile_and_token() {
        let storage = Arc::new(MemoryStorage::new());
        let mut auth = AuthState::load(storage.clone());
        auth.login_fulfilled(user(), None);
        storage.set(keys::AUTH_TOKEN, "token");
        auth.logout();
        assert!(!auth.is_authenticated());
        assert!(storage.get(keys::USER).is_none());
        assert!(storage.get(keys::AUTH_TOKEN).is_none());
    }
}
