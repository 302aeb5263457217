use crate::auth::client::DecisionBackend;
use crate::coordinator::{Disposition, RequestCoordinator};
use crate::gate::GroupResolver;
use anyhow::Result;
use tokio::runtime::Builder;
use tracing::error;

/// Run one evaluation from synchronous code, for callers without a runtime
/// of their own. The whole exchange is bounded by
/// `Config::max_session_duration`, an overrun rejects.
///
/// # Errors
/// Returns an error if the runtime cannot be constructed.
pub fn evaluate_blocking<R, B>(
    coordinator: &RequestCoordinator<'_, R, B>,
    policy_name: Option<&str>,
    subject_id: &str,
) -> Result<Disposition>
where
    R: GroupResolver,
    B: DecisionBackend,
{
    let runtime = Builder::new_current_thread().enable_all().build()?;

    let budget = coordinator.config().max_session_duration();

    let outcome = runtime.block_on(async {
        tokio::time::timeout(budget, coordinator.evaluate(policy_name, subject_id)).await
    });

    match outcome {
        Ok(disposition) => Ok(disposition),
        Err(_) => {
            error!(
                subject = subject_id,
                budget_secs = budget.as_secs(),
                "evaluation exceeded its time budget, rejecting"
            );
            Ok(Disposition::Reject)
        }
    }
}
