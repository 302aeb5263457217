pub mod groups;

use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("lookup failed for {name}: {reason}")]
    Lookup { name: String, reason: String },
}

/// Group membership lookups against the local account directory.
pub trait GroupResolver {
    /// All group ids the user belongs to.
    ///
    /// # Errors
    /// Returns `DirectoryError` if the user is unknown or the lookup fails.
    fn resolve_user_groups(&self, user: &str) -> Result<HashSet<String>, DirectoryError>;

    /// Resolve a group name to its id.
    ///
    /// # Errors
    /// Returns `DirectoryError` if the group is unknown or the lookup fails.
    fn resolve_group(&self, name: &str) -> Result<String, DirectoryError>;
}

/// Decides whether a request needs an out-of-band confirmation at all.
pub struct PolicyGate<'a, R> {
    resolver: &'a R,
    mfa_enabled_policy: Option<&'a str>,
    no_mfa_group_ids: &'a HashSet<String>,
}

impl<'a, R: GroupResolver> PolicyGate<'a, R> {
    #[must_use]
    pub fn new(
        resolver: &'a R,
        mfa_enabled_policy: Option<&'a str>,
        no_mfa_group_ids: &'a HashSet<String>,
    ) -> Self {
        Self {
            resolver,
            mfa_enabled_policy,
            no_mfa_group_ids,
        }
    }

    /// True when the request must be confirmed out of band. Directory errors
    /// never exempt a request.
    pub fn should_require_mfa(&self, policy_name: Option<&str>, subject_id: &str) -> bool {
        if let Some(scoped) = self.mfa_enabled_policy {
            let in_scope = policy_name.is_some_and(|name| name.eq_ignore_ascii_case(scoped));

            if !in_scope {
                debug!(
                    subject = subject_id,
                    policy = policy_name.unwrap_or_default(),
                    "request outside scoped policy, confirmation not required"
                );
                return false;
            }
        }

        if !self.no_mfa_group_ids.is_empty() {
            match self.resolver.resolve_user_groups(subject_id) {
                Ok(groups) => {
                    let matched = groups.intersection(self.no_mfa_group_ids).count();

                    if matched > 0 {
                        info!(
                            subject = subject_id,
                            matched,
                            "member of an exempt group, confirmation not required"
                        );
                        return false;
                    }
                }
                Err(err) => {
                    warn!(
                        subject = subject_id,
                        "group lookup failed, requiring confirmation: {err}"
                    );
                }
            }
        }

        true
    }
}
