use crate::gate::{DirectoryError, GroupResolver};
use nix::unistd::{getgrouplist, Group, User};
use std::collections::HashSet;
use std::ffi::CString;
use tracing::debug;

/// Resolver backed by the local account database, nsswitch decides the
/// actual sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalGroupResolver;

impl GroupResolver for LocalGroupResolver {
    fn resolve_user_groups(&self, user: &str) -> Result<HashSet<String>, DirectoryError> {
        let entry = User::from_name(user)
            .map_err(|err| DirectoryError::Lookup {
                name: user.to_string(),
                reason: err.to_string(),
            })?
            .ok_or_else(|| DirectoryError::NotFound(user.to_string()))?;

        let name = CString::new(user).map_err(|err| DirectoryError::Lookup {
            name: user.to_string(),
            reason: err.to_string(),
        })?;

        let gids = getgrouplist(&name, entry.gid).map_err(|err| DirectoryError::Lookup {
            name: user.to_string(),
            reason: err.to_string(),
        })?;

        debug!("user {} belongs to {} groups", user, gids.len());

        Ok(gids.iter().map(ToString::to_string).collect())
    }

    fn resolve_group(&self, name: &str) -> Result<String, DirectoryError> {
        let entry = Group::from_name(name)
            .map_err(|err| DirectoryError::Lookup {
                name: name.to_string(),
                reason: err.to_string(),
            })?
            .ok_or_else(|| DirectoryError::NotFound(name.to_string()))?;

        Ok(entry.gid.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn has_root_account() -> bool {
        matches!(User::from_name("root"), Ok(Some(_)))
    }

    #[test]
    fn resolves_root_memberships() {
        if !has_root_account() {
            eprintln!("Skipping test: no root account in the local directory");
            return;
        }

        let resolver = LocalGroupResolver;
        let groups = resolver.resolve_user_groups("root").unwrap();
        assert!(groups.contains("0"));
    }

    #[test]
    fn resolves_root_group_id() {
        if !has_root_account() {
            eprintln!("Skipping test: no root account in the local directory");
            return;
        }

        let resolver = LocalGroupResolver;
        assert_eq!(resolver.resolve_group("root").unwrap(), "0");
    }

    #[test]
    fn unknown_user_is_not_found() {
        let resolver = LocalGroupResolver;
        let result = resolver.resolve_user_groups("no-such-user-kfm");
        assert!(matches!(result, Err(DirectoryError::NotFound(_))));
    }

    #[test]
    fn unknown_group_is_not_found() {
        let resolver = LocalGroupResolver;
        let result = resolver.resolve_group("no-such-group-kfm");
        assert!(matches!(result, Err(DirectoryError::NotFound(_))));
    }
}
