//! Whole-run execution budget.

use std::future::Future;
use std::time::Duration;

use qcache_core::Error;
use tokio::time::Instant;

/// Default wall-clock allowance for one run.
pub const DEFAULT_RUN_BUDGET: Duration = Duration::from_secs(300);

/// A single time allowance armed once at the start of a run.
///
/// It is never renewed per page: every page draws from the same deadline.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionBudget {
    started: Instant,
    limit: Duration,
}

impl ExecutionBudget {
    /// Arm a budget of `limit` starting now.
    pub fn start(limit: Duration) -> Self {
        Self { started: Instant::now(), limit }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.elapsed())
    }

    /// Fail if the budget is already spent.
    pub fn check(&self) -> Result<(), Error> {
        if self.remaining().is_zero() { Err(self.exceeded()) } else { Ok(()) }
    }

    /// Run `fut`, failing if it does not finish before the budget runs out.
    pub async fn bound<F: Future>(&self, fut: F) -> Result<F::Output, Error> {
        tokio::time::timeout(self.remaining(), fut)
            .await
            .map_err(|_| self.exceeded())
    }

    fn exceeded(&self) -> Error {
        Error::BudgetExceeded(format!("run exceeded its {}s execution budget", self.limit.as_secs()))
    }
}
