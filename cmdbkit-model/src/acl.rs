//! Allow-list access control for types.
//!
//! Each type carries an ACL mapping group ids to permission sets. A disabled
//! ACL (`activated == false`) grants everything to everyone — the evaluator
//! short-circuits before looking at the groups at all.

use crate::{ModelError, ModelResult};
use cmdbkit_types::PublicId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A CRUD permission on a type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Permission {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "CREATE",
            Self::Read => "READ",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        };
        write!(f, "{s}")
    }
}

/// The group allow-list of an ACL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AclGroups {
    #[serde(default)]
    pub includes: BTreeMap<PublicId, BTreeSet<Permission>>,
}

/// Access-control policy attached to a type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeAcl {
    /// When false the ACL is disabled and every check passes.
    #[serde(default)]
    pub activated: bool,
    #[serde(default)]
    pub groups: AclGroups,
}

impl TypeAcl {
    /// An enabled ACL with an empty allow-list (denies everything).
    #[must_use]
    pub fn activated() -> Self {
        Self {
            activated: true,
            groups: AclGroups::default(),
        }
    }

    /// Decides whether `group` may perform `permission`.
    ///
    /// Returns `true` immediately when the ACL is disabled; otherwise the
    /// group must be listed and the permission must be in its set.
    #[must_use]
    pub fn verify_access(&self, group: PublicId, permission: Permission) -> bool {
        if !self.activated {
            return true;
        }
        self.groups
            .includes
            .get(&group)
            .is_some_and(|perms| perms.contains(&permission))
    }

    /// Grants `permission` to `group`. Granting an already-granted
    /// permission is a no-op.
    pub fn grant_access(&mut self, group: PublicId, permission: Permission) {
        self.groups
            .includes
            .entry(group)
            .or_default()
            .insert(permission);
    }

    /// Revokes `permission` from `group`.
    ///
    /// Revoking a permission that was never granted fails with
    /// [`ModelError::PermissionNotGranted`] so misconfigured callers surface
    /// instead of silently passing.
    pub fn revoke_access(&mut self, group: PublicId, permission: Permission) -> ModelResult<()> {
        let removed = self
            .groups
            .includes
            .get_mut(&group)
            .is_some_and(|perms| perms.remove(&permission));
        if removed {
            Ok(())
        } else {
            Err(ModelError::PermissionNotGranted { group, permission })
        }
    }

    /// Groups currently holding the given permission.
    #[must_use]
    pub fn groups_with(&self, permission: Permission) -> Vec<PublicId> {
        self.groups
            .includes
            .iter()
            .filter(|(_, perms)| perms.contains(&permission))
            .map(|(group, _)| *group)
            .collect()
    }
}
