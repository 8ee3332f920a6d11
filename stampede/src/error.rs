use crate::issuer::IssueError;
use stampede_core::ConfigError;
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Invalid load test configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Run aborted by virtual user {user}: {source}")]
    Aborted {
        user: usize,
        #[source]
        source: IssueError,
    },

    #[error("Load test task failed: {0}")]
    Join(#[from] JoinError),
}
