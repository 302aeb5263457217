use crate::gate::GroupResolver;
use anyhow::{anyhow, Result};
use secrecy::SecretString;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const DEFAULT_AUTH_TIMEOUT: u64 = 60;
const DEFAULT_WAIT_BEFORE_POLL: u64 = 10;
const DEFAULT_POLL_INTERVAL: u64 = 1;
const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 60;

#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: SecretString,
}

/// Runtime configuration for the confirmation gate.
#[derive(Debug, Clone)]
pub struct Config {
    pub service_base_url: String,
    pub auth_timeout: Duration,
    pub wait_before_poll: Duration,
    pub poll_interval: Duration,
    pub poll_max_attempts: u32,
    pub ignore_tls_errors: bool,
    pub basic_auth: Option<BasicAuth>,
    pub mfa_enabled_policy: Option<String>,
    pub no_mfa_group_ids: HashSet<String>,
    pub requestor: String,
}

impl Config {
    /// Create a configuration with default timings for the given service URL.
    ///
    /// # Errors
    /// Returns an error if the URL cannot be parsed or is not http/https with a host.
    pub fn new(service_base_url: &str) -> Result<Self> {
        let url = Url::parse(service_base_url)?;

        match url.scheme() {
            "http" | "https" => (),
            scheme => {
                return Err(anyhow!(
                    "Error parsing URL: unsupported scheme {}",
                    scheme
                ))
            }
        }

        if url.host().is_none() {
            return Err(anyhow!("Error parsing URL: no host specified"));
        }

        Ok(Self {
            service_base_url: service_base_url.trim_end_matches('/').to_string(),
            auth_timeout: Duration::from_secs(DEFAULT_AUTH_TIMEOUT),
            wait_before_poll: Duration::from_secs(DEFAULT_WAIT_BEFORE_POLL),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL),
            poll_max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
            ignore_tls_errors: false,
            basic_auth: None,
            mfa_enabled_policy: None,
            no_mfa_group_ids: HashSet::new(),
            requestor: String::new(),
        })
    }

    /// Upper bound for a full challenge plus poll exchange, including the
    /// transport timeout of every request.
    #[must_use]
    pub fn max_session_duration(&self) -> Duration {
        self.auth_timeout
            + self.wait_before_poll
            + (self.poll_interval + self.auth_timeout) * self.poll_max_attempts
    }

    /// Scope confirmation to a single policy name, empty input clears the scope.
    pub fn set_mfa_policy(&mut self, policy: &str) {
        let policy = policy.trim();

        self.mfa_enabled_policy = if policy.is_empty() {
            None
        } else {
            Some(policy.to_string())
        };
    }

    /// Resolve exempt group names into group ids, skipping names the
    /// directory does not know so a typo can never widen the exemption.
    pub fn resolve_exempt_groups<R: GroupResolver>(&mut self, resolver: &R, raw: &str) {
        for name in parse_group_list(raw) {
            match resolver.resolve_group(name) {
                Ok(gid) => {
                    debug!("exempt group {} resolved to id {}", name, gid);
                    self.no_mfa_group_ids.insert(gid);
                }
                Err(err) => {
                    warn!("skipping exempt group {}: {}", name, err);
                }
            }
        }
    }
}

fn parse_group_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split([';', ','])
        .map(str::trim)
        .filter(|name| !name.is_empty())
}
