use crate::auth::client::DecisionBackend;
use crate::auth::session::AuthenticationSession;
use crate::config::Config;
use crate::gate::{GroupResolver, PolicyGate};
use tracing::{info, warn};

/// Terminal verdict for one access request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Accept,
    Reject,
}

impl Disposition {
    /// Exit code understood by the calling gateway, 0 accepts, 5 rejects.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Accept => 0,
            Self::Reject => 5,
        }
    }
}

/// Orchestrates one request: input sanitation, policy gate, then the
/// confirmation session.
pub struct RequestCoordinator<'a, R, B> {
    config: &'a Config,
    resolver: &'a R,
    backend: &'a B,
}

impl<'a, R: GroupResolver, B: DecisionBackend> RequestCoordinator<'a, R, B> {
    #[must_use]
    pub fn new(config: &'a Config, resolver: &'a R, backend: &'a B) -> Self {
        Self {
            config,
            resolver,
            backend,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        self.config
    }

    pub async fn evaluate(&self, policy_name: Option<&str>, subject_id: &str) -> Disposition {
        let subject = sanitize(subject_id);

        if subject.is_empty() {
            warn!("empty subject after sanitizing input, rejecting");
            return Disposition::Reject;
        }

        let policy = policy_name.map(sanitize).filter(|name| !name.is_empty());

        let gate = PolicyGate::new(
            self.resolver,
            self.config.mfa_enabled_policy.as_deref(),
            &self.config.no_mfa_group_ids,
        );

        if !gate.should_require_mfa(policy, subject) {
            info!(subject, "access allowed without confirmation");
            return Disposition::Accept;
        }

        let session = AuthenticationSession::new(self.backend, self.config, subject);

        if session.run().await {
            Disposition::Accept
        } else {
            warn!(subject, "access denied");
            Disposition::Reject
        }
    }
}

/// Strip embedded NULs and surrounding whitespace from values received over
/// the wire.
#[must_use]
pub fn sanitize(input: &str) -> &str {
    input.trim_matches(|c: char| c == '\0' || c.is_whitespace())
}
