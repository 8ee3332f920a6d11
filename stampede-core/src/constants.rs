use std::time::Duration;

/// The default number of virtual users spawned for a run.
pub const DEFAULT_USERS: usize = 50;

/// The default length of a run.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(30);

/// The default ceiling for the random think-time between units of work.
pub const DEFAULT_PACING: Duration = Duration::from_millis(1_000);

/// How long the driver waits for in-flight users after the stop signal fires.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Capacity of the event intake shared by all virtual users.
pub const EVENT_BUFFER_SIZE: usize = 4_096;
