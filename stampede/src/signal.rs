use tokio_util::sync::CancellationToken;

/// Broadcast-once stop signal shared between the driver and its virtual users.
///
/// Clones observe the same signal. Firing is idempotent: the first call flips the signal and
/// every later call is a no-op, so a deadline timer, an operator interrupt and a fatal error can
/// all race to fire it without coordination.
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    token: CancellationToken,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self) {
        self.token.cancel();
    }

    pub fn is_fired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the signal has fired. Resolves immediately if it already has.
    pub async fn fired(&self) {
        self.token.cancelled().await
    }
}
