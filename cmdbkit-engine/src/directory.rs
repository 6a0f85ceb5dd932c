//! The user/group directory seam.
//!
//! The engine does not own users or groups; it asks an injected directory
//! for the group membership and display name behind a requesting user id.
//! Production deployments implement [`UserDirectory`] against their identity
//! backend; [`StaticDirectory`] covers tests and embedding.

use cmdbkit_types::PublicId;
use std::collections::BTreeMap;

/// What the engine needs to know about a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub public_id: PublicId,
    pub name: String,
    pub group_id: PublicId,
}

/// Read-only lookup into an external user/group directory.
pub trait UserDirectory: Send + Sync {
    /// Resolves a user id to its profile, or `None` for unknown users.
    fn lookup(&self, user_id: PublicId) -> Option<UserProfile>;

    /// The group a user belongs to.
    fn get_group_id(&self, user_id: PublicId) -> Option<PublicId> {
        self.lookup(user_id).map(|p| p.group_id)
    }
}

/// In-memory directory with a fixed user set.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    users: BTreeMap<PublicId, UserProfile>,
}

impl StaticDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user, builder-style.
    #[must_use]
    pub fn with_user(mut self, public_id: PublicId, name: &str, group_id: PublicId) -> Self {
        self.users.insert(
            public_id,
            UserProfile {
                public_id,
                name: name.to_string(),
                group_id,
            },
        );
        self
    }
}

impl UserDirectory for StaticDirectory {
    fn lookup(&self, user_id: PublicId) -> Option<UserProfile> {
        self.users.get(&user_id).cloned()
    }
}
