use crate::auth::client::DecisionBackend;
use crate::config::Config;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionOutcome {
    Approved,
    Denied,
    TimedOut,
    Errored,
}

/// One challenge plus poll exchange for a single subject. Any error on the
/// wire denies the request.
pub struct AuthenticationSession<'a, B> {
    backend: &'a B,
    config: &'a Config,
    subject_id: &'a str,
    session_id: Uuid,
}

impl<'a, B: DecisionBackend> AuthenticationSession<'a, B> {
    #[must_use]
    pub fn new(backend: &'a B, config: &'a Config, subject_id: &'a str) -> Self {
        Self {
            backend,
            config,
            subject_id,
            session_id: Uuid::new_v4(),
        }
    }

    /// Run the exchange to a terminal decision, true allows the request.
    pub async fn run(&self) -> bool {
        let started = Instant::now();
        let outcome = self.exchange().await;
        let elapsed_ms = started.elapsed().as_millis();

        match outcome {
            SessionOutcome::Approved => {
                info!(
                    session = %self.session_id,
                    subject = self.subject_id,
                    elapsed_ms,
                    "authentication succeeded"
                );
                true
            }
            SessionOutcome::Denied => {
                warn!(
                    session = %self.session_id,
                    subject = self.subject_id,
                    elapsed_ms,
                    "authentication failed"
                );
                false
            }
            SessionOutcome::TimedOut => {
                warn!(
                    session = %self.session_id,
                    subject = self.subject_id,
                    elapsed_ms,
                    "authentication result not received in time"
                );
                false
            }
            SessionOutcome::Errored => false,
        }
    }

    async fn exchange(&self) -> SessionOutcome {
        let requestor = &self.config.requestor;

        let initial = match self.backend.challenge(self.subject_id, requestor).await {
            Ok(decision) => decision,
            Err(err) => {
                error!(
                    session = %self.session_id,
                    subject = self.subject_id,
                    "challenge failed: {err}"
                );
                return SessionOutcome::Errored;
            }
        };

        if initial.is_approved() {
            debug!(session = %self.session_id, "approved without polling");
            return SessionOutcome::Approved;
        }

        if initial.is_denied() {
            debug!(
                session = %self.session_id,
                status = initial.status(),
                "denied without polling"
            );
            return SessionOutcome::Denied;
        }

        sleep(self.config.wait_before_poll).await;

        for attempt in 1..=self.config.poll_max_attempts {
            let decision = match self.backend.poll(self.subject_id, requestor).await {
                Ok(decision) => decision,
                Err(err) => {
                    error!(
                        session = %self.session_id,
                        subject = self.subject_id,
                        attempt,
                        "poll failed: {err}"
                    );
                    return SessionOutcome::Errored;
                }
            };

            if decision.is_approved() {
                return SessionOutcome::Approved;
            }

            if decision.is_denied() {
                debug!(
                    session = %self.session_id,
                    status = decision.status(),
                    attempt,
                    "denied while polling"
                );
                return SessionOutcome::Denied;
            }

            trace!(session = %self.session_id, attempt, "decision still pending");

            if attempt < self.config.poll_max_attempts {
                sleep(self.config.poll_interval).await;
            }
        }

        SessionOutcome::TimedOut
    }
}
