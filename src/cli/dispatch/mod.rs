use crate::cli::actions::Action;
use crate::config::{BasicAuth, Config};
use crate::gate::groups::LocalGroupResolver;
use anyhow::Result;
use secrecy::SecretString;
use std::time::Duration;
use tracing::{debug, warn};

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, Config)> {
    let service_url = matches
        .get_one("service-url")
        .map(|s: &String| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --service-url"))?;

    let mut config = Config::new(&service_url)?;

    config.auth_timeout = Duration::from_secs(
        matches
            .get_one::<u64>("auth-timeout")
            .copied()
            .unwrap_or(60),
    );
    config.wait_before_poll = Duration::from_secs(
        matches
            .get_one::<u64>("wait-before-poll")
            .copied()
            .unwrap_or(10),
    );
    config.poll_interval = Duration::from_secs(
        matches
            .get_one::<u64>("poll-interval")
            .copied()
            .unwrap_or(1),
    );
    config.poll_max_attempts = matches
        .get_one::<u32>("poll-max-attempts")
        .copied()
        .unwrap_or(60);
    config.ignore_tls_errors = matches.get_flag("ignore-tls-errors");

    let username = matches.get_one::<String>("basic-auth-username");
    let password = matches.get_one::<String>("basic-auth-password");
    match (username, password) {
        (Some(username), Some(password)) => {
            config.basic_auth = Some(BasicAuth {
                username: username.to_string(),
                password: SecretString::from(password.to_string()),
            });
        }
        (Some(_), None) | (None, Some(_)) => {
            warn!("basic auth needs both username and password, ignoring");
        }
        (None, None) => (),
    }

    match matches.get_one::<String>("mfa-policy") {
        Some(policy) => config.set_mfa_policy(policy),
        None => debug!("no policy scoping, confirmation applies to all requests"),
    }

    match matches.get_one::<String>("no-mfa-groups") {
        Some(groups) => config.resolve_exempt_groups(&LocalGroupResolver, groups),
        None => debug!("no exempt groups configured"),
    }

    config.requestor = match matches.get_one::<String>("requestor") {
        Some(requestor) => requestor.to_string(),
        None => hostname::get()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|_| env!("CARGO_PKG_NAME").to_string()),
    };

    let action = Action::Evaluate {
        subject: matches
            .get_one("user")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --user"))?,
        policy_name: matches.get_one::<String>("policy").map(ToString::to_string),
    };

    Ok((action, config))
}
