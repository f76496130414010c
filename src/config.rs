//! Configuration types.

use std::time::Duration;

/// Background worker pool configuration.
///
/// Immutable once the pool is created.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Default per-task timeout. `Duration::ZERO` means tasks never expire.
    pub default_timeout: Duration,
    /// Maximum number of concurrently running tasks (clamped to at least 1).
    /// Bounds live runners, not queue length — the queue is unbounded.
    pub max_threads: usize,
    /// Interval between periodic completion probes of a running task.
    pub probe_interval: Duration,
    /// How long an idle runner waits for new work before exiting.
    pub idle_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(5),
            max_threads: 1,
            probe_interval: Duration::from_millis(500),
            idle_timeout: Duration::from_secs(5),
        }
    }
}

impl WorkerConfig {
    /// Set the default task timeout (`Duration::ZERO` disables expiry).
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Set the maximum number of concurrent tasks.
    pub fn with_max_threads(mut self, max: usize) -> Self {
        self.max_threads = max.max(1);
        self
    }

    /// Set the periodic probe interval.
    pub fn with_probe_interval(mut self, interval: Duration) -> Self {
        self.probe_interval = interval;
        self
    }

    /// Set the idle runner timeout.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }
}

/// Preparser configuration.
#[derive(Debug, Clone, Default)]
pub struct PreparserConfig {
    /// Configuration for the underlying worker pool.
    pub worker: WorkerConfig,
}

impl PreparserConfig {
    /// Set the worker pool configuration.
    pub fn with_worker(mut self, worker: WorkerConfig) -> Self {
        self.worker = worker;
        self
    }
}
