//! Bounded-concurrency background worker pool.
//!
//! Tasks are queued FIFO and dispatched to at most `max_threads` concurrent
//! runners. Completion is detected by re-evaluating the probe hook on a
//! periodic tick, on an explicit probe hint, or on deadline expiry — never by
//! busy-spinning and never solely by an external callback.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::WorkerConfig;
use crate::error::PoolError;
use crate::worker::task::{Task, TaskHooks, TaskOutcome};

/// Control block for one running task.
///
/// Registered while the task occupies a runner; cancel and probe requests are
/// delivered through it from other threads.
struct ActiveSlot {
    id: Option<Uuid>,
    cancel: AtomicBool,
    wake: Notify,
}

impl ActiveSlot {
    fn new(id: Option<Uuid>) -> Self {
        Self {
            id,
            cancel: AtomicBool::new(false),
            wake: Notify::new(),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

/// Set of currently running tasks.
#[derive(Default)]
struct ActiveSet {
    slots: Mutex<Vec<Arc<ActiveSlot>>>,
}

impl ActiveSet {
    fn register(&self, slot: Arc<ActiveSlot>) {
        self.slots.lock().unwrap().push(slot);
    }

    fn unregister(&self, slot: &Arc<ActiveSlot>) {
        self.slots.lock().unwrap().retain(|s| !Arc::ptr_eq(s, slot));
    }

    /// Flag matching running tasks for cancellation and wake their runners.
    fn cancel(&self, id: Option<Uuid>) {
        for slot in self.slots.lock().unwrap().iter() {
            let matches = match id {
                None => true,
                Some(id) => slot.id == Some(id),
            };
            if matches && !slot.is_cancelled() {
                slot.cancel.store(true, Ordering::SeqCst);
                slot.wake.notify_one();
            }
        }
    }

    /// Wake every runner so it re-probes immediately.
    fn probe_all(&self) {
        for slot in self.slots.lock().unwrap().iter() {
            slot.wake.notify_one();
        }
    }
}

/// Cloneable handle asking the pool to re-check task completion now.
///
/// Handed to start hooks so external event listeners can close the gap
/// between an asynchronous completion event and the next periodic probe.
/// Becomes a no-op once the pool is gone.
#[derive(Clone)]
pub struct ProbeHint {
    active: Weak<ActiveSet>,
}

impl ProbeHint {
    /// Request an immediate completion probe of all running tasks.
    pub fn request_probe(&self) {
        if let Some(active) = self.active.upgrade() {
            active.probe_all();
        }
    }
}

/// Queue and runner bookkeeping, guarded by one short-lived lock.
struct PoolState<P> {
    queue: VecDeque<Task<P>>,
    /// Live runner count.
    runners: usize,
    /// Tasks pushed but not yet completed or dropped; drives runner spawning.
    uncompleted: usize,
    closing: bool,
    handles: Vec<JoinHandle<()>>,
}

struct Shared<H: TaskHooks> {
    config: WorkerConfig,
    hooks: H,
    runtime: Handle,
    state: Mutex<PoolState<H::Payload>>,
    queue_wait: Notify,
    active: Arc<ActiveSet>,
}

/// Generic bounded-concurrency task scheduler.
///
/// Runners are spawned lazily at push time while demand exceeds the live
/// runner count, up to `max_threads`; an idle runner exits after
/// `idle_timeout`. Must be created inside a tokio runtime; `push`, `cancel`
/// and `request_probe` are synchronous and safe to call from any thread.
pub struct BackgroundWorker<H: TaskHooks> {
    shared: Arc<Shared<H>>,
}

impl<H: TaskHooks> BackgroundWorker<H> {
    /// Create a new pool. The configuration is immutable afterwards.
    pub fn new(config: WorkerConfig, hooks: H) -> Self {
        let config = WorkerConfig {
            max_threads: config.max_threads.max(1),
            ..config
        };
        let shared = Arc::new(Shared {
            config,
            hooks,
            runtime: Handle::current(),
            state: Mutex::new(PoolState {
                queue: VecDeque::new(),
                runners: 0,
                uncompleted: 0,
                closing: false,
                handles: Vec::new(),
            }),
            queue_wait: Notify::new(),
            active: Arc::new(ActiveSet::default()),
        });
        Self { shared }
    }

    /// Access the hooks this pool was created with.
    pub fn hooks(&self) -> &H {
        &self.shared.hooks
    }

    /// A hint handle usable independently of the pool's lifetime.
    pub fn probe_hint(&self) -> ProbeHint {
        ProbeHint {
            active: Arc::downgrade(&self.shared.active),
        }
    }

    /// Enqueue a new task.
    ///
    /// `timeout` of `None` uses the pool default; `Some(Duration::ZERO)`
    /// disables expiry for this task. The deadline is measured from push
    /// time. Fails only when the pool is closed; in that case the caller
    /// keeps ownership of signaling the payload's end-of-life.
    pub fn push(
        &self,
        payload: Arc<H::Payload>,
        id: Option<Uuid>,
        timeout: Option<Duration>,
    ) -> Result<(), PoolError> {
        let mut state = self.shared.state.lock().unwrap();
        if state.closing {
            return Err(PoolError::Closed);
        }

        let timeout = timeout.unwrap_or(self.shared.config.default_timeout);
        state.queue.push_back(Task::new(id, payload, timeout));
        state.uncompleted += 1;

        if state.uncompleted > state.runners && state.runners < self.shared.config.max_threads {
            state.runners += 1;
            let shared = Arc::clone(&self.shared);
            let handle = self.shared.runtime.spawn(async move {
                runner(shared).await;
            });
            state.handles.push(handle);
            tracing::debug!(runners = state.runners, "Spawned pool runner");
        }

        self.shared.queue_wait.notify_one();
        Ok(())
    }

    /// Cancel tasks by identity.
    ///
    /// `Some(id)` removes matching queued tasks (released, never started) and
    /// interrupts a matching running task, whose stop hook still fires with
    /// [`TaskOutcome::Cancelled`]. `None` cancels every queued and running
    /// task.
    pub fn cancel(&self, id: Option<Uuid>) {
        let dropped = self.drain_queue(id);
        if !dropped.is_empty() {
            tracing::debug!(released = dropped.len(), "Dropped queued tasks on cancel");
        }
        drop(dropped);
        self.shared.active.cancel(id);
    }

    /// Ask every running task to re-check completion now instead of waiting
    /// for the next periodic tick.
    pub fn request_probe(&self) {
        self.shared.active.probe_all();
    }

    /// Number of tasks waiting in the queue.
    pub fn pending_count(&self) -> usize {
        self.shared.state.lock().unwrap().queue.len()
    }

    /// Number of tasks currently occupying a runner.
    pub fn running_count(&self) -> usize {
        self.shared.active.slots.lock().unwrap().len()
    }

    /// Shut the pool down.
    ///
    /// Cancels all queued and running tasks, then waits until every runner
    /// has invoked its final stop hook. Queued-but-never-started tasks are
    /// released without their start hook ever running.
    pub async fn close(&self) {
        let (dropped, handles) = {
            let mut state = self.shared.state.lock().unwrap();
            state.closing = true;
            let dropped: Vec<_> = state.queue.drain(..).collect();
            state.uncompleted -= dropped.len();
            (dropped, std::mem::take(&mut state.handles))
        };
        if !dropped.is_empty() {
            tracing::debug!(released = dropped.len(), "Releasing queued tasks on close");
        }
        drop(dropped);

        self.shared.active.cancel(None);
        self.shared.queue_wait.notify_waiters();

        for result in futures::future::join_all(handles).await {
            if let Err(error) = result {
                tracing::error!(%error, "Pool runner panicked");
            }
        }
        tracing::info!("Worker pool closed");
    }

    /// Remove queued tasks matching `id`, returning them for release.
    fn drain_queue(&self, id: Option<Uuid>) -> Vec<Task<H::Payload>> {
        let mut state = self.shared.state.lock().unwrap();
        let mut kept = VecDeque::with_capacity(state.queue.len());
        let mut dropped = Vec::new();
        for task in state.queue.drain(..) {
            if task.matches(id) {
                dropped.push(task);
            } else {
                kept.push_back(task);
            }
        }
        state.queue = kept;
        state.uncompleted -= dropped.len();
        dropped
    }
}

/// Runner loop: take tasks until the queue stays empty past `idle_timeout`
/// or the pool is closing.
async fn runner<H: TaskHooks>(shared: Arc<Shared<H>>) {
    loop {
        let Some(task) = take_task(&shared).await else {
            break;
        };
        run_task(&shared, task).await;
    }
    tracing::debug!("Pool runner exiting");
}

/// Pop the next task, or decide to exit.
///
/// The runner count is decremented under the same lock acquisition that
/// decides to return `None`, so a concurrent `push` never sees a runner that
/// has already committed to exiting and skips spawning a replacement.
async fn take_task<H: TaskHooks>(shared: &Shared<H>) -> Option<Task<H::Payload>> {
    loop {
        {
            let mut state = shared.state.lock().unwrap();
            if state.closing {
                state.runners -= 1;
                return None;
            }
            if let Some(task) = state.queue.pop_front() {
                if !state.queue.is_empty() {
                    // Wake the next idle runner; Notify permits do not stack.
                    shared.queue_wait.notify_one();
                }
                return Some(task);
            }
        }

        tokio::select! {
            _ = shared.queue_wait.notified() => {}
            _ = tokio::time::sleep(shared.config.idle_timeout) => {
                let mut state = shared.state.lock().unwrap();
                if state.queue.is_empty() || state.closing {
                    state.runners -= 1;
                    return None;
                }
            }
        }
    }
}

/// Execute one task: start, probe until done/cancelled/expired, stop.
async fn run_task<H: TaskHooks>(shared: &Arc<Shared<H>>, task: Task<H::Payload>) {
    let slot = Arc::new(ActiveSlot::new(task.id));
    shared.active.register(Arc::clone(&slot));
    {
        // A global cancel may have raced with registration.
        let state = shared.state.lock().unwrap();
        if state.closing {
            slot.cancel.store(true, Ordering::SeqCst);
        }
    }

    let hint = ProbeHint {
        active: Arc::downgrade(&shared.active),
    };
    let handle = match shared.hooks.start(&task.payload, hint).await {
        Ok(handle) => handle,
        Err(error) => {
            tracing::warn!(task = ?task.id, %error, "Start hook failed, releasing task");
            finish_task(shared, &slot);
            return;
        }
    };
    tracing::debug!(task = ?task.id, timeout = ?task.timeout, "Task started");

    let deadline = task.deadline();
    let outcome = loop {
        let expired = wait_for_wake(shared, &slot, deadline).await;
        if shared.hooks.probe(&handle) {
            break TaskOutcome::Finished;
        }
        if slot.is_cancelled() {
            break TaskOutcome::Cancelled;
        }
        if expired {
            break TaskOutcome::TimedOut;
        }
    };

    tracing::debug!(task = ?task.id, ?outcome, "Stopping task");
    shared.hooks.stop(handle, outcome).await;
    finish_task(shared, &slot);
    // `task` drops here, releasing the pool's payload reference.
}

/// Wait for a probe hint, a cancel request, the periodic tick, or the task
/// deadline. Returns true when the deadline elapsed.
async fn wait_for_wake<H: TaskHooks>(
    shared: &Shared<H>,
    slot: &ActiveSlot,
    deadline: Option<std::time::Instant>,
) -> bool {
    let tick = tokio::time::sleep(shared.config.probe_interval);
    match deadline {
        Some(deadline) => {
            tokio::select! {
                _ = slot.wake.notified() => false,
                _ = tick => false,
                _ = tokio::time::sleep_until(deadline.into()) => true,
            }
        }
        None => {
            tokio::select! {
                _ = slot.wake.notified() => false,
                _ = tick => false,
            }
        }
    }
}

fn finish_task<H: TaskHooks>(shared: &Shared<H>, slot: &Arc<ActiveSlot>) {
    shared.active.unregister(slot);
    let mut state = shared.state.lock().unwrap();
    state.uncompleted -= 1;
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    use async_trait::async_trait;

    use super::*;
    use crate::error::{Error, InputError};

    /// Payload tracked by the test hooks.
    struct TestPayload {
        tag: usize,
        done: AtomicBool,
    }

    impl TestPayload {
        fn new(tag: usize) -> Arc<Self> {
            Arc::new(Self {
                tag,
                done: AtomicBool::new(false),
            })
        }
    }

    struct TestHandle {
        payload: Arc<TestPayload>,
    }

    #[derive(Default)]
    struct TestInner {
        start_attempts: AtomicUsize,
        started: AtomicUsize,
        stopped: AtomicUsize,
        concurrent: AtomicUsize,
        peak_concurrent: AtomicUsize,
        fail_next_start: AtomicBool,
        outcomes: Mutex<Vec<(usize, TaskOutcome)>>,
        /// When set, started tasks complete themselves after this delay.
        auto_complete_after: Mutex<Option<Duration>>,
    }

    #[derive(Clone, Default)]
    struct TestHooks {
        inner: Arc<TestInner>,
    }

    #[async_trait]
    impl TaskHooks for TestHooks {
        type Payload = TestPayload;
        type Handle = TestHandle;

        async fn start(
            &self,
            payload: &Arc<TestPayload>,
            hint: ProbeHint,
        ) -> Result<TestHandle, Error> {
            self.inner.start_attempts.fetch_add(1, Ordering::SeqCst);
            if self.inner.fail_next_start.swap(false, Ordering::SeqCst) {
                return Err(Error::Input(InputError::StartFailed {
                    reason: "induced".into(),
                }));
            }

            self.inner.started.fetch_add(1, Ordering::SeqCst);
            let now = self.inner.concurrent.fetch_add(1, Ordering::SeqCst) + 1;
            self.inner.peak_concurrent.fetch_max(now, Ordering::SeqCst);

            if let Some(delay) = *self.inner.auto_complete_after.lock().unwrap() {
                let payload = Arc::clone(payload);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    payload.done.store(true, Ordering::SeqCst);
                    hint.request_probe();
                });
            }

            Ok(TestHandle {
                payload: Arc::clone(payload),
            })
        }

        fn probe(&self, handle: &TestHandle) -> bool {
            handle.payload.done.load(Ordering::SeqCst)
        }

        async fn stop(&self, handle: TestHandle, outcome: TaskOutcome) {
            self.inner.concurrent.fetch_sub(1, Ordering::SeqCst);
            self.inner
                .outcomes
                .lock()
                .unwrap()
                .push((handle.payload.tag, outcome));
            self.inner.stopped.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn fast_config(max_threads: usize) -> WorkerConfig {
        WorkerConfig::default()
            .with_max_threads(max_threads)
            .with_probe_interval(Duration::from_millis(10))
            .with_idle_timeout(Duration::from_millis(200))
            .with_default_timeout(Duration::ZERO)
    }

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !cond() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition not reached within 5s");
    }

    #[tokio::test]
    async fn probe_hint_completes_task() {
        let hooks = TestHooks::default();
        let inner = Arc::clone(&hooks.inner);
        let pool = BackgroundWorker::new(fast_config(1), hooks);

        let payload = TestPayload::new(1);
        pool.push(Arc::clone(&payload), None, None).unwrap();
        wait_until(|| inner.started.load(Ordering::SeqCst) == 1).await;

        payload.done.store(true, Ordering::SeqCst);
        pool.request_probe();

        wait_until(|| inner.stopped.load(Ordering::SeqCst) == 1).await;
        assert_eq!(*inner.outcomes.lock().unwrap(), vec![(1, TaskOutcome::Finished)]);
        pool.close().await;
    }

    #[tokio::test]
    async fn concurrency_bounded_and_stop_exactly_once() {
        let hooks = TestHooks::default();
        let inner = Arc::clone(&hooks.inner);
        *inner.auto_complete_after.lock().unwrap() = Some(Duration::from_millis(50));
        let pool = BackgroundWorker::new(fast_config(2), hooks);

        for tag in 0..5 {
            pool.push(TestPayload::new(tag), None, None).unwrap();
        }

        wait_until(|| inner.stopped.load(Ordering::SeqCst) == 5).await;
        assert_eq!(inner.started.load(Ordering::SeqCst), 5);
        assert!(inner.peak_concurrent.load(Ordering::SeqCst) <= 2);

        let outcomes = inner.outcomes.lock().unwrap();
        assert_eq!(outcomes.len(), 5);
        assert!(outcomes.iter().all(|(_, o)| *o == TaskOutcome::Finished));
        drop(outcomes);
        pool.close().await;
    }

    #[tokio::test]
    async fn tasks_start_in_fifo_order() {
        let hooks = TestHooks::default();
        let inner = Arc::clone(&hooks.inner);
        *inner.auto_complete_after.lock().unwrap() = Some(Duration::from_millis(10));
        let pool = BackgroundWorker::new(fast_config(1), hooks);

        for tag in 0..4 {
            pool.push(TestPayload::new(tag), None, None).unwrap();
        }

        wait_until(|| inner.stopped.load(Ordering::SeqCst) == 4).await;
        // One runner, so completion order equals submission order.
        let tags: Vec<usize> = inner.outcomes.lock().unwrap().iter().map(|(t, _)| *t).collect();
        assert_eq!(tags, vec![0, 1, 2, 3]);
        pool.close().await;
    }

    #[tokio::test]
    async fn cancel_by_identity_targets_only_matching_task() {
        let hooks = TestHooks::default();
        let inner = Arc::clone(&hooks.inner);
        let pool = BackgroundWorker::new(fast_config(2), hooks);

        let id_a = Uuid::new_v4();
        let id_b = Uuid::new_v4();
        pool.push(TestPayload::new(1), Some(id_a), None).unwrap();
        pool.push(TestPayload::new(2), Some(id_b), None).unwrap();
        wait_until(|| inner.started.load(Ordering::SeqCst) == 2).await;

        pool.cancel(Some(id_a));
        wait_until(|| inner.stopped.load(Ordering::SeqCst) == 1).await;
        assert_eq!(*inner.outcomes.lock().unwrap(), vec![(1, TaskOutcome::Cancelled)]);

        // The unrelated task keeps running.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(inner.stopped.load(Ordering::SeqCst), 1);

        pool.cancel(None);
        wait_until(|| inner.stopped.load(Ordering::SeqCst) == 2).await;
        pool.close().await;
    }

    #[tokio::test]
    async fn timeout_stops_task_with_timed_out() {
        let hooks = TestHooks::default();
        let inner = Arc::clone(&hooks.inner);
        let pool = BackgroundWorker::new(fast_config(1), hooks);

        let pushed = Instant::now();
        pool.push(TestPayload::new(7), None, Some(Duration::from_millis(100)))
            .unwrap();

        wait_until(|| inner.stopped.load(Ordering::SeqCst) == 1).await;
        assert!(pushed.elapsed() >= Duration::from_millis(100));
        assert_eq!(*inner.outcomes.lock().unwrap(), vec![(7, TaskOutcome::TimedOut)]);
        pool.close().await;
    }

    #[tokio::test]
    async fn zero_timeout_never_expires() {
        let hooks = TestHooks::default();
        let inner = Arc::clone(&hooks.inner);
        let config = fast_config(1).with_default_timeout(Duration::from_millis(50));
        let pool = BackgroundWorker::new(config, hooks);

        let payload = TestPayload::new(3);
        pool.push(Arc::clone(&payload), None, Some(Duration::ZERO))
            .unwrap();
        wait_until(|| inner.started.load(Ordering::SeqCst) == 1).await;

        // Well past the pool default; the override disables expiry.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(inner.stopped.load(Ordering::SeqCst), 0);

        payload.done.store(true, Ordering::SeqCst);
        pool.request_probe();
        wait_until(|| inner.stopped.load(Ordering::SeqCst) == 1).await;
        assert_eq!(*inner.outcomes.lock().unwrap(), vec![(3, TaskOutcome::Finished)]);
        pool.close().await;
    }

    #[tokio::test]
    async fn close_releases_queued_tasks_without_starting_them() {
        let hooks = TestHooks::default();
        let inner = Arc::clone(&hooks.inner);
        let pool = BackgroundWorker::new(fast_config(1), hooks);

        pool.push(TestPayload::new(1), None, None).unwrap();
        wait_until(|| inner.started.load(Ordering::SeqCst) == 1).await;

        let queued = TestPayload::new(2);
        pool.push(Arc::clone(&queued), None, None).unwrap();
        assert_eq!(pool.pending_count(), 1);

        pool.close().await;

        // The running task was cancelled through its stop hook, the queued
        // one was released without ever starting.
        assert_eq!(inner.started.load(Ordering::SeqCst), 1);
        assert_eq!(inner.stopped.load(Ordering::SeqCst), 1);
        assert_eq!(*inner.outcomes.lock().unwrap(), vec![(1, TaskOutcome::Cancelled)]);
        assert_eq!(Arc::strong_count(&queued), 1);
    }

    #[tokio::test]
    async fn push_after_close_fails() {
        let pool = BackgroundWorker::new(fast_config(1), TestHooks::default());
        pool.close().await;
        let result = pool.push(TestPayload::new(1), None, None);
        assert!(matches!(result, Err(PoolError::Closed)));
    }

    #[tokio::test]
    async fn start_failure_releases_task_and_pool_survives() {
        let hooks = TestHooks::default();
        let inner = Arc::clone(&hooks.inner);
        inner.fail_next_start.store(true, Ordering::SeqCst);
        *inner.auto_complete_after.lock().unwrap() = Some(Duration::from_millis(10));
        let pool = BackgroundWorker::new(fast_config(1), hooks);

        let doomed = TestPayload::new(1);
        pool.push(Arc::clone(&doomed), None, None).unwrap();
        pool.push(TestPayload::new(2), None, None).unwrap();

        wait_until(|| inner.stopped.load(Ordering::SeqCst) == 1).await;
        assert_eq!(inner.start_attempts.load(Ordering::SeqCst), 2);
        // No stop hook for the failed task, and its payload was released.
        assert_eq!(*inner.outcomes.lock().unwrap(), vec![(2, TaskOutcome::Finished)]);
        wait_until(|| Arc::strong_count(&doomed) == 1).await;
        pool.close().await;
    }

    #[tokio::test]
    async fn push_after_idle_runner_exit_spawns_replacement() {
        let hooks = TestHooks::default();
        let inner = Arc::clone(&hooks.inner);
        *inner.auto_complete_after.lock().unwrap() = Some(Duration::from_millis(10));
        let config = fast_config(1).with_idle_timeout(Duration::from_millis(20));
        let pool = BackgroundWorker::new(config, hooks);

        // Repeatedly let the sole runner reap itself, then push again. The
        // runner count must read zero by the time a new push checks it, so
        // every iteration spawns a fresh runner instead of stranding the
        // task in the queue.
        for round in 1..=5 {
            pool.push(TestPayload::new(round), None, None).unwrap();
            wait_until(|| inner.stopped.load(Ordering::SeqCst) == round).await;
            tokio::time::sleep(Duration::from_millis(60)).await;
            assert_eq!(pool.shared.state.lock().unwrap().runners, 0);
        }

        assert_eq!(inner.started.load(Ordering::SeqCst), 5);
        pool.close().await;
    }

    #[tokio::test]
    async fn cancel_removes_matching_queued_task() {
        let hooks = TestHooks::default();
        let inner = Arc::clone(&hooks.inner);
        let pool = BackgroundWorker::new(fast_config(1), hooks);

        // Occupy the single runner.
        pool.push(TestPayload::new(1), None, None).unwrap();
        wait_until(|| inner.started.load(Ordering::SeqCst) == 1).await;

        let id = Uuid::new_v4();
        let queued = TestPayload::new(2);
        pool.push(Arc::clone(&queued), Some(id), None).unwrap();
        let survivor = TestPayload::new(3);
        pool.push(Arc::clone(&survivor), None, None).unwrap();

        pool.cancel(Some(id));
        assert_eq!(pool.pending_count(), 1);
        wait_until(|| Arc::strong_count(&queued) == 1).await;

        // Cancelling an unknown identity touches nothing.
        pool.cancel(Some(Uuid::new_v4()));
        assert_eq!(pool.pending_count(), 1);

        pool.close().await;
        assert_eq!(inner.started.load(Ordering::SeqCst), 1);
        assert_eq!(inner.stopped.load(Ordering::SeqCst), 1);
        assert_eq!(Arc::strong_count(&survivor), 1);
    }
}
