use crate::auth::client::DecisionClient;
use crate::cli::actions::Action;
use crate::config::Config;
use crate::coordinator::{Disposition, RequestCoordinator};
use crate::gate::groups::LocalGroupResolver;
use anyhow::Result;
use tracing::error;

/// Handle the evaluate action
///
/// # Errors
/// Returns an error if the HTTP client cannot be constructed.
pub async fn handle(action: Action, config: &Config) -> Result<Disposition> {
    let Action::Evaluate {
        subject,
        policy_name,
    } = action;

    let backend = DecisionClient::new(config)?;
    let resolver = LocalGroupResolver;
    let coordinator = RequestCoordinator::new(config, &resolver, &backend);

    let budget = config.max_session_duration();

    let disposition = match tokio::time::timeout(
        budget,
        coordinator.evaluate(policy_name.as_deref(), &subject),
    )
    .await
    {
        Ok(disposition) => disposition,
        Err(_) => {
            error!(
                subject,
                budget_secs = budget.as_secs(),
                "evaluation exceeded its time budget, rejecting"
            );
            Disposition::Reject
        }
    };

    Ok(disposition)
}
