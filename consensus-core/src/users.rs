use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

use crate::util::Id;

pub type UserId = Id<UserData>;

/// A consensus account.
///
/// Users are created on signup and never deleted; the id is opaque to the
/// client and stable for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct UserData {
    pub id: UserId,
    pub username: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username {0} is already taken")]
    UsernameTaken(String),
    #[error("no user with username {0} exists")]
    UnknownUser(String),
    #[error("{0}")]
    InvalidUsername(String),
}

/// The identity store, mapping usernames to opaque user ids.
#[derive(Default)]
pub struct UserRegistry {
    // Keyed by the lowercased username, so uniqueness is case-insensitive
    by_name: DashMap<String, Arc<UserData>>,
    by_id: DashMap<UserId, Arc<UserData>>,
}

impl UserRegistry {
    const MAX_USERNAME_LENGTH: usize = 32;

    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new user, failing if the username is taken
    pub fn signup(&self, username: &str) -> Result<Arc<UserData>, AuthError> {
        let username = Self::validate_username(username)?;
        let key = username.to_lowercase();

        // entry() holds the shard lock, so two concurrent signups with the
        // same name cannot both succeed
        match self.by_name.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(AuthError::UsernameTaken(username))
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let user = Arc::new(UserData {
                    id: UserId::new(),
                    username,
                });

                entry.insert(user.clone());
                self.by_id.insert(user.id, user.clone());

                Ok(user)
            }
        }
    }

    /// Returns the user with the given username, if one exists
    pub fn login(&self, username: &str) -> Result<Arc<UserData>, AuthError> {
        self.by_name
            .get(&username.trim().to_lowercase())
            .map(|u| u.clone())
            .ok_or_else(|| AuthError::UnknownUser(username.to_string()))
    }

    pub fn user_by_id(&self, user_id: UserId) -> Result<Arc<UserData>, AuthError> {
        self.by_id
            .get(&user_id)
            .map(|u| u.clone())
            .ok_or_else(|| AuthError::UnknownUser(user_id.to_string()))
    }

    fn validate_username(username: &str) -> Result<String, AuthError> {
        let trimmed = username.trim();

        if trimmed.is_empty() {
            return Err(AuthError::InvalidUsername(
                "username cannot be empty".to_string(),
            ));
        }

        if trimmed.len() > Self::MAX_USERNAME_LENGTH {
            return Err(AuthError::InvalidUsername(format!(
                "username cannot be longer than {} characters",
                Self::MAX_USERNAME_LENGTH
            )));
        }

        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_signup_and_login() {
        let registry = UserRegistry::new();

        let user = registry.signup("alice").unwrap();
        let fetched = registry.login("alice").unwrap();

        assert_eq!(user.id, fetched.id);
        assert_eq!(fetched.username, "alice");
    }

    #[test]
    fn test_case_insensitive_uniqueness() {
        let registry = UserRegistry::new();

        registry.signup("Alice").unwrap();

        assert!(
            matches!(registry.signup("aLiCe"), Err(AuthError::UsernameTaken(_))),
            "usernames are unique regardless of case"
        );

        let user = registry.login("ALICE").unwrap();
        assert_eq!(user.username, "Alice", "original casing is preserved");
    }

    #[test]
    fn test_unknown_user() {
        let registry = UserRegistry::new();

        assert!(matches!(
            registry.login("nobody"),
            Err(AuthError::UnknownUser(_))
        ));
    }

    #[test]
    fn test_invalid_usernames() {
        let registry = UserRegistry::new();

        assert!(registry.signup("   ").is_err(), "blank names are rejected");
        assert!(
            registry.signup(&"x".repeat(64)).is_err(),
            "overlong names are rejected"
        );
    }
}
