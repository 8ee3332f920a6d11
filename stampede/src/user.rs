use crate::aggregator::Reporter;
use crate::issuer::{IssueError, RequestIssuer, UserContext};
use crate::pacer::Pacer;
use crate::signal::StopSignal;
use std::sync::Arc;
#[allow(unused)]
use tracing::{debug, error, trace, warn};

/// What a virtual user did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct UserReport {
    pub id: usize,
    pub units: u64,
    pub failures: u64,
}

/// Fatal error raised by one user, tagged with its identity.
#[derive(Debug)]
pub(crate) struct UserAbort {
    pub id: usize,
    pub error: IssueError,
}

/// A single simulated actor.
pub(crate) struct VirtualUser<I> {
    ctx: UserContext,
    issuer: Arc<I>,
    reporter: Reporter,
    pacer: Pacer,
    stop: StopSignal,
    abort: StopSignal,
}

impl<I: RequestIssuer> VirtualUser<I> {
    pub fn new(
        id: usize,
        issuer: Arc<I>,
        reporter: Reporter,
        pacer: Pacer,
        stop: StopSignal,
        abort: StopSignal,
    ) -> Self {
        Self {
            ctx: UserContext::new(id, reporter.clone()),
            issuer,
            reporter,
            pacer,
            stop,
            abort,
        }
    }

    /// Register, then pace and issue until the stop signal is observed.
    ///
    /// The stop signal is only checked between units; an issued unit always runs to completion.
    pub async fn run(mut self) -> Result<UserReport, UserAbort> {
        let id = self.ctx.id();
        self.reporter.user_started().await;
        debug!("Virtual user {id} started.");

        let mut report = UserReport {
            id,
            ..Default::default()
        };

        loop {
            tokio::select! {
                biased;
                _ = self.stop.fired() => {}
                _ = self.pacer.wait() => {}
            }

            if self.stop.is_fired() {
                break;
            }

            report.units += 1;
            self.reporter.unit_started().await;
            match self.issuer.issue(&self.ctx).await {
                Ok(()) => {}
                Err(error) if error.is_fatal() => {
                    error!("Virtual user {id} hit a fatal error: {error}");
                    self.abort.fire();
                    return Err(UserAbort { id, error });
                }
                Err(error) => {
                    report.failures += 1;
                    warn!("Virtual user {id}: {error}");
                    self.reporter.request_failed().await;
                }
            }
        }

        debug!(
            "Virtual user {id} stopped after {} units ({} failed).",
            report.units, report.failures
        );
        Ok(report)
    }
}
