//! The unit of work each virtual user repeats.
use crate::aggregator::Reporter;
use std::future::Future;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a single unit of work.
#[derive(Debug, Error)]
pub enum IssueError {
    /// The unit failed but the run can go on, e.g. a request timed out or returned a 5xx.
    #[error("Transient failure: {0}")]
    Transient(#[source] BoxError),

    /// Nothing useful can happen for the rest of the run, e.g. a credential is missing.
    #[error("Fatal failure: {0}")]
    Fatal(#[source] BoxError),
}

impl IssueError {
    pub fn transient(err: impl Into<BoxError>) -> Self {
        Self::Transient(err.into())
    }

    pub fn fatal(err: impl Into<BoxError>) -> Self {
        Self::Fatal(err.into())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// Per-user handle passed to every `issue` call.
#[derive(Clone, Debug)]
pub struct UserContext {
    id: usize,
    reporter: Reporter,
}

impl UserContext {
    pub(crate) fn new(id: usize, reporter: Reporter) -> Self {
        Self { id, reporter }
    }

    /// Identity of the virtual user, in `0..users`.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Report one finished sub-request. Call it as each step completes, not at the end of the
    /// unit, so partially completed units are still counted.
    pub async fn request_completed(&self) {
        self.reporter.request_completed().await
    }
}

/// Performs one logical unit of work, typically a fixed sequence of HTTP calls.
///
/// Implementors report every completed sub-request through [`UserContext::request_completed`]
/// and return [`IssueError::Fatal`] only for errors that make the whole run pointless.
pub trait RequestIssuer: Send + Sync + 'static {
    fn issue(&self, ctx: &UserContext) -> impl Future<Output = Result<(), IssueError>> + Send;
}

/// Issuer backed by an async closure. See [`issuer_fn`].
#[derive(Clone)]
pub struct IssueFn<T>(T);

/// Turn an async closure into a [`RequestIssuer`].
///
/// # Example
/// ```no_run
/// use stampede::prelude::*;
///
/// let issuer = issuer_fn(|ctx: UserContext| async move {
///     ctx.request_completed().await;
///     Ok(())
/// });
/// ```
pub fn issuer_fn<T, F>(func: T) -> IssueFn<T>
where
    T: Fn(UserContext) -> F + Send + Sync + 'static,
    F: Future<Output = Result<(), IssueError>> + Send,
{
    IssueFn(func)
}

impl<T, F> RequestIssuer for IssueFn<T>
where
    T: Fn(UserContext) -> F + Send + Sync + 'static,
    F: Future<Output = Result<(), IssueError>> + Send,
{
    fn issue(&self, ctx: &UserContext) -> impl Future<Output = Result<(), IssueError>> + Send {
        (self.0)(ctx.clone())
    }
}
