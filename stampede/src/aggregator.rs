use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
#[allow(unused)]
use tracing::{debug, error, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    UserStarted,
    UnitStarted,
    RequestCompleted,
    RequestFailed,
}

/// Snapshot of the aggregated counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub users_started: u64,
    pub units_started: u64,
    pub requests_completed: u64,
    pub requests_failed: u64,
}

/// Event intake handed to every virtual user.
///
/// Workers never touch the counters; they only push events which a single owner task applies in
/// order. All events sent through one `Reporter` are applied in the order they were sent.
#[derive(Clone, Debug)]
pub struct Reporter {
    tx: mpsc::Sender<Event>,
}

impl Reporter {
    pub async fn user_started(&self) {
        self.record(Event::UserStarted).await
    }

    pub async fn unit_started(&self) {
        self.record(Event::UnitStarted).await
    }

    pub async fn request_completed(&self) {
        self.record(Event::RequestCompleted).await
    }

    pub async fn request_failed(&self) {
        self.record(Event::RequestFailed).await
    }

    async fn record(&self, event: Event) {
        // NOTE: The owner task only exits once every Reporter is dropped, so this can only fail
        // if the owner panicked.
        if self.tx.send(event).await.is_err() {
            error!("Aggregator is gone; dropping {event:?} event.");
        }
    }
}

#[derive(Default)]
struct LiveTotals {
    users_started: AtomicU64,
    units_started: AtomicU64,
    requests_completed: AtomicU64,
    requests_failed: AtomicU64,
}

impl LiveTotals {
    fn snapshot(&self) -> Totals {
        Totals {
            users_started: self.users_started.load(Ordering::Acquire),
            units_started: self.units_started.load(Ordering::Acquire),
            requests_completed: self.requests_completed.load(Ordering::Acquire),
            requests_failed: self.requests_failed.load(Ordering::Acquire),
        }
    }
}

/// Single serialization point for every counter update of a run.
pub(crate) struct Aggregator {
    live: Arc<LiveTotals>,
    handle: JoinHandle<Totals>,
}

impl Aggregator {
    /// Spawn the owner task. It keeps draining until the last `Reporter` clone is dropped.
    pub fn start(name: &str, buffer: usize) -> (Self, Reporter) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let live = Arc::new(LiveTotals::default());
        let handle = tokio::spawn(accumulate(rx, live.clone(), Recorder::new(name)));

        (Self { live, handle }, Reporter { tx })
    }

    /// Counters as applied so far. Lags behind in-flight events.
    pub fn current(&self) -> Totals {
        self.live.snapshot()
    }

    /// Wait for the intake to close and every queued event to be applied.
    pub async fn finish(self) -> Result<Totals, JoinError> {
        self.handle.await
    }
}

async fn accumulate(
    mut rx: mpsc::Receiver<Event>,
    live: Arc<LiveTotals>,
    recorder: Recorder,
) -> Totals {
    let mut totals = Totals::default();
    while let Some(event) = rx.recv().await {
        match event {
            Event::UserStarted => {
                totals.users_started += 1;
                live.users_started.store(totals.users_started, Ordering::Release);
            }
            Event::UnitStarted => {
                totals.units_started += 1;
                live.units_started.store(totals.units_started, Ordering::Release);
            }
            Event::RequestCompleted => {
                totals.requests_completed += 1;
                live.requests_completed.store(totals.requests_completed, Ordering::Release);
            }
            Event::RequestFailed => {
                totals.requests_failed += 1;
                live.requests_failed.store(totals.requests_failed, Ordering::Release);
            }
        }
        recorder.record(event);
    }

    debug!("Aggregator intake closed: {totals:?}");
    totals
}

#[cfg(feature = "metrics")]
struct Recorder {
    users: metrics::Counter,
    units: metrics::Counter,
    requests: metrics::Counter,
    errors: metrics::Counter,
}

#[cfg(feature = "metrics")]
impl Recorder {
    fn new(name: &str) -> Self {
        let labels = stampede_core::RunLabels::new(name);
        Self {
            users: metrics::counter!(labels.users),
            units: metrics::counter!(labels.units),
            requests: metrics::counter!(labels.requests),
            errors: metrics::counter!(labels.errors),
        }
    }

    fn record(&self, event: Event) {
        match event {
            Event::UserStarted => self.users.increment(1),
            Event::UnitStarted => self.units.increment(1),
            Event::RequestCompleted => self.requests.increment(1),
            Event::RequestFailed => self.errors.increment(1),
        }
    }
}

#[cfg(not(feature = "metrics"))]
struct Recorder;

#[cfg(not(feature = "metrics"))]
impl Recorder {
    fn new(_name: &str) -> Self {
        Self
    }

    fn record(&self, _event: Event) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ntest::timeout(5_000)]
    async fn no_lost_updates_under_contention() {
        let (aggregator, reporter) = Aggregator::start("contention", 16);

        let workers: Vec<_> = (0..32)
            .map(|_| {
                let reporter = reporter.clone();
                tokio::spawn(async move {
                    reporter.user_started().await;
                    reporter.unit_started().await;
                    for _ in 0..500 {
                        reporter.request_completed().await;
                    }
                    reporter.request_failed().await;
                })
            })
            .collect();
        drop(reporter);

        for worker in workers {
            worker.await.unwrap();
        }

        let totals = aggregator.finish().await.unwrap();
        assert_eq!(
            totals,
            Totals {
                users_started: 32,
                units_started: 32,
                requests_completed: 16_000,
                requests_failed: 32,
            }
        );
    }

    #[tokio::test]
    #[ntest::timeout(1_000)]
    async fn current_converges_to_final() {
        let (aggregator, reporter) = Aggregator::start("live", 4);
        assert_eq!(aggregator.current(), Totals::default());

        reporter.user_started().await;
        reporter.request_completed().await;
        reporter.request_completed().await;
        drop(reporter);

        let live = aggregator.live.clone();
        let totals = aggregator.finish().await.unwrap();
        assert_eq!(totals.users_started, 1);
        assert_eq!(totals.requests_completed, 2);
        assert_eq!(live.snapshot(), totals);
    }

    #[tokio::test]
    #[ntest::timeout(1_000)]
    async fn finishes_without_events() {
        let (aggregator, reporter) = Aggregator::start("idle", 1);
        drop(reporter);
        assert_eq!(aggregator.finish().await.unwrap(), Totals::default());
    }
}
