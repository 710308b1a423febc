//! User record types shared by the harvester, the filter pipeline and the API.

use serde::{Deserialize, Serialize};

/// Field names every stored record must carry. Shape validation in the
/// filter pipeline checks presence of these keys, nothing more.
pub const REQUIRED_FIELDS: [&str; 5] = ["login", "id", "created_at", "avatar_url", "bio"];

/// A user record as projected from the upstream detail endpoint.
///
/// `bio` may be absent upstream; it is kept as an explicit `null` on disk so
/// raw records always expose all five field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub login: String,
    pub id: u64,
    pub created_at: String,
    pub avatar_url: String,
    pub bio: Option<String>,
}

/// A record that passed the quality filter: `bio` is guaranteed non-empty,
/// `avatar_url` non-blank, `created_at` a valid timestamp after the cutoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilteredUser {
    pub login: String,
    pub id: u64,
    pub created_at: String,
    pub avatar_url: String,
    pub bio: String,
}
