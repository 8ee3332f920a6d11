//! One-shot concurrent request burst (requires `http` feature)
use futures_util::future::join_all;
use reqwest::{Client, Method};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};
#[allow(unused)]
use tracing::{debug, error, instrument, warn};
use url::Url;

/// Outcome of a [`burst`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BurstReport {
    /// Responses received, keyed by status code.
    pub statuses: BTreeMap<u16, usize>,
    /// Requests that never produced a response.
    pub failures: usize,
    pub elapsed: Duration,
}

impl BurstReport {
    pub fn total(&self) -> usize {
        self.statuses.values().sum::<usize>() + self.failures
    }
}

impl fmt::Display for BurstReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (status, count) in &self.statuses {
            writeln!(f, "{status}: {count}")?;
        }
        if self.failures > 0 {
            writeln!(f, "failed: {}", self.failures)?;
        }
        write!(
            f,
            "total time required: {}",
            humantime::format_duration(Duration::from_millis(self.elapsed.as_millis() as u64))
        )
    }
}

/// Fire `requests` concurrent requests at `url` and wait for all of them.
///
/// Every request is spawned before any is awaited. Failures are counted, never propagated.
#[instrument(skip(client))]
pub async fn burst(client: &Client, requests: usize, method: Method, url: Url) -> BurstReport {
    let start = Instant::now();

    let handles: Vec<_> = (0..requests)
        .map(|_| {
            let req = client.request(method.clone(), url.clone());
            tokio::spawn(async move { req.send().await.map(|res| res.status()) })
        })
        .collect();

    let mut report = BurstReport::default();
    for res in join_all(handles).await {
        match res {
            Ok(Ok(status)) => {
                debug!("{status}");
                *report.statuses.entry(status.as_u16()).or_default() += 1;
            }
            Ok(Err(err)) => {
                warn!("Request failed: {err}");
                report.failures += 1;
            }
            Err(err) => {
                error!("Request task failed: {err}");
                report.failures += 1;
            }
        }
    }

    report.elapsed = start.elapsed();
    report
}
