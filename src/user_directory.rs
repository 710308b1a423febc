//! In-memory dataset served by the query API.
//!
//! Loaded once at startup from the filtered store and never mutated, so it is
//! shared behind an `Arc` with no locking.

use crate::store;
use crate::user_record::FilteredUser;
use anyhow::Result;
use std::path::Path;

pub struct UserDirectory {
    users: Vec<FilteredUser>,
}

impl UserDirectory {
    pub fn new(users: Vec<FilteredUser>) -> Self {
        Self { users }
    }

    /// Load the directory from a filtered store file.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(store::load_json(path)?))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn all(&self) -> &[FilteredUser] {
        &self.users
    }

    /// Exact login lookup.
    pub fn find(&self, login: &str) -> Option<&FilteredUser> {
        self.users.iter().find(|u| u.login == login)
    }

    /// Case-insensitive substring search over logins.
    pub fn search(&self, query: &str) -> Vec<&FilteredUser> {
        let needle = query.to_lowercase();
        self.users
            .iter()
            .filter(|u| u.login.to_lowercase().contains(&needle))
            .collect()
    }
}
