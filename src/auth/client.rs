use crate::auth::{AuthDecision, DecisionRequest};
use crate::config::{BasicAuth, Config};
use anyhow::Result;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("confirmation service timed out")]
    Timeout(#[source] reqwest::Error),
    #[error("confirmation service unreachable")]
    Transport(#[source] reqwest::Error),
    #[error("confirmation service responded with status: {status}, content: {body}")]
    Protocol { status: StatusCode, body: String },
    #[error("invalid decision response: {0}")]
    Malformed(String),
}

/// Source of out-of-band decisions, lets the session logic run against a
/// scripted fake in tests.
#[allow(async_fn_in_trait)]
pub trait DecisionBackend {
    async fn challenge(
        &self,
        subject_id: &str,
        requestor: &str,
    ) -> Result<AuthDecision, DecisionError>;

    async fn poll(&self, subject_id: &str, requestor: &str)
        -> Result<AuthDecision, DecisionError>;
}

/// HTTP client for the confirmation service.
#[derive(Debug, Clone)]
pub struct DecisionClient {
    client: Client,
    base_url: String,
    basic_auth: Option<BasicAuth>,
}

impl DecisionClient {
    /// Build the client from the configuration.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(config.auth_timeout);

        if config.ignore_tls_errors {
            warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.service_base_url.clone(),
            basic_auth: config.basic_auth.clone(),
        })
    }

    #[instrument(skip(self, requestor))]
    async fn post_decision(
        &self,
        endpoint: &str,
        subject_id: &str,
        requestor: &str,
    ) -> Result<AuthDecision, DecisionError> {
        let url = format!("{}{endpoint}", self.base_url);

        let payload = DecisionRequest {
            samid: subject_id,
            requestor,
        };

        let mut request = self.client.post(&url).json(&payload);

        if let Some(auth) = &self.basic_auth {
            request = request.basic_auth(&auth.username, Some(auth.password.expose_secret()));
        }

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                DecisionError::Timeout(err)
            } else {
                DecisionError::Transport(err)
            }
        })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("{} responded with status: {}, content: {}", url, status, body);
            return Err(DecisionError::Protocol { status, body });
        }

        let json_response: Value = response
            .json()
            .await
            .map_err(|err| DecisionError::Malformed(err.to_string()))?;

        let code = json_response
            .get("status")
            .and_then(Value::as_i64)
            .ok_or_else(|| DecisionError::Malformed("no status found".to_string()))?;

        debug!("{} returned status {}", url, code);

        Ok(AuthDecision::from_status(code))
    }
}

impl DecisionBackend for DecisionClient {
    async fn challenge(
        &self,
        subject_id: &str,
        requestor: &str,
    ) -> Result<AuthDecision, DecisionError> {
        self.post_decision("/Authenticate", subject_id, requestor)
            .await
    }

    async fn poll(
        &self,
        subject_id: &str,
        requestor: &str,
    ) -> Result<AuthDecision, DecisionError> {
        self.post_decision("/AuthResult", subject_id, requestor)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{DecisionBackend, DecisionClient, DecisionError};
    use crate::auth::AuthDecision;
    use crate::config::{BasicAuth, Config};
    use anyhow::Result;
    use secrecy::SecretString;
    use serde_json::json;
    use std::net::TcpListener;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    #[tokio::test]
    async fn challenge_maps_status_to_decision() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Authenticate"))
            .and(body_json(json!({
                "samid": "alice",
                "requestor": "gw1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": 1 })))
            .mount(&server)
            .await;

        let config = Config::new(&server.uri())?;
        let client = DecisionClient::new(&config)?;

        let decision = client.challenge("alice", "gw1").await?;
        assert_eq!(decision, AuthDecision::Success);
        Ok(())
    }

    #[tokio::test]
    async fn poll_posts_to_auth_result() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/AuthResult"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": -1 })))
            .mount(&server)
            .await;

        let config = Config::new(&server.uri())?;
        let client = DecisionClient::new(&config)?;

        let decision = client.poll("alice", "gw1").await?;
        assert_eq!(decision, AuthDecision::Rejected);
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_is_protocol_error() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Authenticate"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let config = Config::new(&server.uri())?;
        let client = DecisionClient::new(&config)?;

        let result = client.challenge("alice", "gw1").await;
        match result {
            Err(DecisionError::Protocol { status, body }) => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn junk_body_is_malformed() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Authenticate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let config = Config::new(&server.uri())?;
        let client = DecisionClient::new(&config)?;

        let result = client.challenge("alice", "gw1").await;
        assert!(matches!(result, Err(DecisionError::Malformed(_))));
        Ok(())
    }

    #[tokio::test]
    async fn missing_status_field_is_malformed() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Authenticate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "outcome": "yes" })))
            .mount(&server)
            .await;

        let config = Config::new(&server.uri())?;
        let client = DecisionClient::new(&config)?;

        let result = client.challenge("alice", "gw1").await;
        assert!(matches!(result, Err(DecisionError::Malformed(_))));
        Ok(())
    }

    #[tokio::test]
    async fn basic_auth_header_is_sent() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Authenticate"))
            .and(header("authorization", "Basic dXNlcjpwYXNz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": 0 })))
            .mount(&server)
            .await;

        let mut config = Config::new(&server.uri())?;
        config.basic_auth = Some(BasicAuth {
            username: "user".to_string(),
            password: SecretString::from("pass".to_string()),
        });
        let client = DecisionClient::new(&config)?;

        let decision = client.challenge("alice", "gw1").await?;
        assert_eq!(decision, AuthDecision::Pending);
        Ok(())
    }

    #[tokio::test]
    async fn slow_service_times_out() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Authenticate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": 1 }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let mut config = Config::new(&server.uri())?;
        config.auth_timeout = Duration::from_millis(250);
        let client = DecisionClient::new(&config)?;

        let result = client.challenge("alice", "gw1").await;
        assert!(matches!(result, Err(DecisionError::Timeout(_))));
        Ok(())
    }
}
