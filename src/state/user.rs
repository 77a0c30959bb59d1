//! User identity records and the user directory.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::hash::{Hash, Hasher};

/// Presence status of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    Online,
    Away,
    Offline,
}

/// Identity record for a registered user. Equality and hashing are by
/// username only.
#[derive(Debug, Clone)]
pub struct User {
    pub username: String,
    pub status: UserStatus,
    pub joined_at: DateTime<Utc>,
}

impl User {
    fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            status: UserStatus::Online,
            joined_at: Utc::now(),
        }
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.username.hash(state);
    }
}

/// Authoritative set of currently-registered usernames.
///
/// Identity only, not connections; reachability lives in
/// [`SessionRegistry`](crate::state::SessionRegistry). Uniqueness is
/// enforced by an atomic insert-if-absent, never check-then-insert.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: DashMap<String, User>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a username. Returns `false` for a blank name or one that is
    /// already present; the first writer wins and is never overwritten.
    pub fn register(&self, username: &str) -> bool {
        let key = username.trim();
        if key.is_empty() {
            return false;
        }
        match self.users.entry(key.to_string()) {
            dashmap::Entry::Occupied(_) => false,
            dashmap::Entry::Vacant(entry) => {
                entry.insert(User::new(key));
                true
            }
        }
    }

    pub fn unregister(&self, username: &str) {
        self.users.remove(username.trim());
    }

    pub fn find(&self, username: &str) -> Option<User> {
        self.users.get(username.trim()).map(|u| u.clone())
    }

    /// Update a user's status in place, keeping the original `joined_at`.
    pub fn update_status(&self, username: &str, status: UserStatus) {
        if let Some(mut user) = self.users.get_mut(username.trim()) {
            user.status = status;
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
