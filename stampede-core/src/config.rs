use crate::{DEFAULT_DURATION, DEFAULT_GRACE_PERIOD, DEFAULT_PACING, DEFAULT_USERS};
use std::time::Duration;
use thiserror::Error;

/// Parameters of a single load test run.
///
/// A run clones its config up front, so nothing here changes once virtual users are spawned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTestConfig {
    pub name: String,
    pub users: usize,
    pub duration: Duration,
    pub pacing: Duration,
    pub grace_period: Option<Duration>,
    pub seed: Option<u64>,
}

impl LoadTestConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            users: DEFAULT_USERS,
            duration: DEFAULT_DURATION,
            pacing: DEFAULT_PACING,
            grace_period: Some(DEFAULT_GRACE_PERIOD),
            seed: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::EmptyName);
        }

        if self.duration.is_zero() {
            return Err(ConfigError::ZeroDuration);
        }

        Ok(())
    }

    /// Seed for the pacer of the given user, if the run is seeded.
    pub fn user_seed(&self, id: usize) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(id as u64))
    }
}

impl Default for LoadTestConfig {
    fn default() -> Self {
        Self::new("default")
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Load test name must not be empty")]
    EmptyName,

    #[error("Load test duration must be greater than zero")]
    ZeroDuration,
}
