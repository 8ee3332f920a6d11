#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod aggregator;
mod error;
mod issuer;
mod pacer;
mod signal;
mod user;

#[cfg(feature = "http")]
#[cfg_attr(docsrs, doc(cfg(feature = "http")))]
pub mod burst;
#[cfg(feature = "http")]
#[cfg_attr(docsrs, doc(cfg(feature = "http")))]
pub mod http;

pub use aggregator::{Reporter, Totals};
pub use error::LoadError;
pub use issuer::{issuer_fn, BoxError, IssueError, IssueFn, RequestIssuer, UserContext};
pub use load_test::{run, LoadTest};
pub use signal::StopSignal;

pub use stampede_core::{
    ConfigError, LoadTestConfig, RunLabels, RunStatistics, DEFAULT_DURATION, DEFAULT_GRACE_PERIOD,
    DEFAULT_PACING, DEFAULT_USERS,
};

pub mod prelude {
    pub use crate::issuer::{issuer_fn, IssueError, RequestIssuer, UserContext};
    pub use crate::load_test::{run, LoadTest};
    pub use crate::signal::StopSignal;
    pub use crate::LoadError;

    #[cfg(feature = "http")]
    pub use crate::http::{Credentials, HttpIssuer, Mutation};

    pub use stampede_core::{LoadTestConfig, RunStatistics};
}
