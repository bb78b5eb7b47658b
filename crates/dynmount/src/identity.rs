//! Owner resolution against the host identity databases.
//!
//! Owners are written as `user:group`. Names are looked up on every call;
//! nothing is cached and numeric ids are never accepted in place of names.

use dynmount_common::{MountError, MountResult};
use nix::unistd::{Group, User};

/// Numeric ownership to apply to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ownership {
    /// User ID.
    pub uid: u32,
    /// Group ID.
    pub gid: u32,
}

/// Split `user:group` at the first colon.
///
/// Anything after the first colon, further colons included, is the group.
///
/// # Errors
///
/// Returns [`MountError::OwnerFormatInvalid`] if there is no colon.
pub fn parse_owner(owner: &str) -> MountResult<(&str, &str)> {
    owner
        .split_once(':')
        .ok_or_else(|| MountError::OwnerFormatInvalid {
            owner: owner.to_string(),
        })
}

/// Translates user and group names into numeric ids.
pub trait IdentityResolver {
    /// Resolve a user name and a group name independently.
    ///
    /// # Errors
    ///
    /// Returns [`MountError::UnknownUser`] or [`MountError::UnknownGroup`]
    /// for names that do not exist.
    fn resolve(&self, user: &str, group: &str) -> MountResult<Ownership>;

    /// Parse a `user:group` string and resolve both halves.
    ///
    /// # Errors
    ///
    /// Returns [`MountError::OwnerFormatInvalid`] for a malformed owner, or
    /// any error from [`IdentityResolver::resolve`].
    fn resolve_owner(&self, owner: &str) -> MountResult<Ownership> {
        let (user, group) = parse_owner(owner)?;
        self.resolve(user, group)
    }
}

/// Resolver backed by the host passwd and group databases.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostIdentityResolver;

impl IdentityResolver for HostIdentityResolver {
    fn resolve(&self, user: &str, group: &str) -> MountResult<Ownership> {
        let uid = User::from_name(user)
            .map_err(|e| MountError::IdentityLookup {
                name: user.to_string(),
                source: e.into(),
            })?
            .ok_or_else(|| MountError::UnknownUser {
                name: user.to_string(),
            })?
            .uid;

        let gid = Group::from_name(group)
            .map_err(|e| MountError::IdentityLookup {
                name: group.to_string(),
                source: e.into(),
            })?
            .ok_or_else(|| MountError::UnknownGroup {
                name: group.to_string(),
            })?
            .gid;

        tracing::debug!(user, group, %uid, %gid, "Resolved owner");
        Ok(Ownership {
            uid: uid.as_raw(),
            gid: gid.as_raw(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticResolver;
    use proptest::prelude::*;

    #[test]
    fn owner_is_split_at_first_colon() {
        assert_eq!(parse_owner("alice:staff").unwrap(), ("alice", "staff"));
        assert_eq!(parse_owner("alice:staff:x").unwrap(), ("alice", "staff:x"));
        assert_eq!(parse_owner(":staff").unwrap(), ("", "staff"));
        assert_eq!(parse_owner("alice:").unwrap(), ("alice", ""));
    }

    #[test]
    fn owner_without_colon_is_rejected() {
        let err = parse_owner("alice").unwrap_err();
        assert!(matches!(err, MountError::OwnerFormatInvalid { ref owner } if owner == "alice"));
    }

    #[test]
    fn resolve_owner_uses_both_halves() {
        let resolver = StaticResolver::new()
            .with_user("alice", 1001)
            .with_group("staff", 50);
        assert_eq!(
            resolver.resolve_owner("alice:staff").unwrap(),
            Ownership { uid: 1001, gid: 50 }
        );
    }

    #[test]
    fn resolve_owner_reports_unknown_user_before_group() {
        let resolver = StaticResolver::new();
        let err = resolver.resolve_owner("ghost:nogroup").unwrap_err();
        assert!(matches!(err, MountError::UnknownUser { ref name } if name == "ghost"));
    }

    #[test]
    fn host_resolver_finds_root() {
        let ownership = HostIdentityResolver.resolve("root", "root").unwrap();
        assert_eq!(ownership, Ownership { uid: 0, gid: 0 });
    }

    #[test]
    fn host_resolver_does_not_parse_numbers() {
        let err = HostIdentityResolver.resolve("0", "root").unwrap_err();
        assert!(matches!(err, MountError::UnknownUser { .. }));
    }

    #[test]
    fn host_resolver_unknown_group() {
        let err = HostIdentityResolver
            .resolve("root", "dynmount-no-such-group")
            .unwrap_err();
        assert!(matches!(err, MountError::UnknownGroup { ref name } if name == "dynmount-no-such-group"));
    }

    proptest! {
        #[test]
        fn parse_owner_keeps_group_verbatim(user in "[a-z_][a-z0-9_-]{0,15}", group in "[a-z0-9_:-]{0,16}") {
            let owner = format!("{user}:{group}");
            let (u, g) = parse_owner(&owner).unwrap();
            prop_assert_eq!(u, user.as_str());
            prop_assert_eq!(g, group.as_str());
        }
    }
}
