use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("konfirmi")
        .about("Out-of-band multi-factor access confirmation")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("user")
                .short('u')
                .long("user")
                .help("User identifier to confirm")
                .env("KONFIRMI_USER")
                .required(true),
        )
        .arg(
            Arg::new("policy")
                .long("policy")
                .help("Policy name attached to the request")
                .env("KONFIRMI_POLICY"),
        )
        .arg(
            Arg::new("requestor")
                .long("requestor")
                .help("Tag shown in confirmation prompts, defaults to the hostname")
                .env("KONFIRMI_REQUESTOR"),
        )
        .arg(
            Arg::new("service-url")
                .short('s')
                .long("service-url")
                .help("Confirmation service base URL, example: https://mfa.tld:8443/api")
                .env("KONFIRMI_SERVICE_URL")
                .required(true),
        )
        .arg(
            Arg::new("auth-timeout")
                .long("auth-timeout")
                .help("Seconds to wait for each service response")
                .default_value("60")
                .env("KONFIRMI_AUTH_TIMEOUT")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("wait-before-poll")
                .long("wait-before-poll")
                .help("Seconds to wait after the challenge before the first poll")
                .default_value("10")
                .env("KONFIRMI_WAIT_BEFORE_POLL")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("poll-interval")
                .long("poll-interval")
                .help("Seconds between polls")
                .default_value("1")
                .env("KONFIRMI_POLL_INTERVAL")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("poll-max-attempts")
                .long("poll-max-attempts")
                .help("Polls before giving up on a pending decision")
                .default_value("60")
                .env("KONFIRMI_POLL_MAX_ATTEMPTS")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new("ignore-tls-errors")
                .long("ignore-tls-errors")
                .help("Skip TLS certificate verification")
                .env("KONFIRMI_IGNORE_TLS_ERRORS")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("basic-auth-username")
                .long("basic-auth-username")
                .help("Username for HTTP basic auth against the service")
                .env("KONFIRMI_BASIC_AUTH_USERNAME"),
        )
        .arg(
            Arg::new("basic-auth-password")
                .long("basic-auth-password")
                .help("Password for HTTP basic auth against the service")
                .env("KONFIRMI_BASIC_AUTH_PASSWORD"),
        )
        .arg(
            Arg::new("mfa-policy")
                .long("mfa-policy")
                .help("Only require confirmation for requests matching this policy name")
                .env("KONFIRMI_MFA_POLICY"),
        )
        .arg(
            Arg::new("no-mfa-groups")
                .long("no-mfa-groups")
                .help("Group names exempt from confirmation, separated by ; or ,")
                .env("KONFIRMI_NO_MFA_GROUPS"),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("KONFIRMI_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}
