//! Preparser — asynchronous metadata extraction for media items.
//!
//! Adapts the generic background worker pool to media preparsing: eligible
//! items are scheduled on the pool, an input-processing job extracts their
//! metadata, and completed items are handed to the fetcher for art
//! retrieval. Every submission ends in exactly one terminal signal on the
//! item.

pub mod fetcher;
pub mod input;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::PreparserConfig;
use crate::error::Error;
use crate::item::{Item, ItemType, PreparseStatus};
use crate::preparser::fetcher::Fetcher;
use crate::preparser::input::{EventListener, InputEvent, InputJob, InputProcessor, InputState};
use crate::worker::pool::{BackgroundWorker, ProbeHint};
use crate::worker::task::{TaskHooks, TaskOutcome};

/// Scope options for one preparse request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparseOptions {
    /// Allow preparsing items hosted on the network. Off by default:
    /// network items are skipped unless the caller opts in.
    pub network_scope: bool,
}

impl PreparseOptions {
    /// Request network scope.
    pub fn with_network_scope(mut self) -> Self {
        self.network_scope = true;
        self
    }
}

/// Whether an item may enter the pool at all.
fn eligible(item_type: ItemType, network: bool, options: PreparseOptions) -> bool {
    match item_type {
        ItemType::Node | ItemType::File | ItemType::Directory | ItemType::Playlist => {
            !network || options.network_scope
        }
        _ => false,
    }
}

/// Pool payload: the item plus the options it was submitted with.
struct PreparseRequest {
    item: Arc<Item>,
    options: PreparseOptions,
}

/// Per-task context produced by the start hook.
///
/// `state` mirrors the last lifecycle event and `done` the terminal "dead"
/// event; the listener writes them from the input subsystem's thread while
/// the pool's probe loop reads them.
struct PreparseTask {
    request: Arc<PreparseRequest>,
    job: Box<dyn InputJob>,
    state: Arc<AtomicU8>,
    done: Arc<AtomicBool>,
}

/// Hook implementation wiring the pool to the input subsystem.
struct PreparseHooks {
    input: Arc<dyn InputProcessor>,
    fetcher: Option<Arc<dyn Fetcher>>,
}

#[async_trait]
impl TaskHooks for PreparseHooks {
    type Payload = PreparseRequest;
    type Handle = PreparseTask;

    async fn start(
        &self,
        request: &Arc<PreparseRequest>,
        hint: ProbeHint,
    ) -> Result<PreparseTask, Error> {
        let state = Arc::new(AtomicU8::new(InputState::Created.as_u8()));
        let done = Arc::new(AtomicBool::new(false));

        let listener: EventListener = {
            let state = Arc::clone(&state);
            let done = Arc::clone(&done);
            Arc::new(move |event| match event {
                InputEvent::StateChanged(new_state) => {
                    state.store(new_state.as_u8(), Ordering::SeqCst);
                }
                InputEvent::Dead => {
                    done.store(true, Ordering::SeqCst);
                    hint.request_probe();
                }
            })
        };

        let item = &request.item;
        let job = match self.input.create_job(Arc::clone(item), listener).await {
            Ok(job) => job,
            Err(error) => {
                tracing::warn!(item = %item.id(), %error, "Failed to create input job");
                item.signal_preparse_ended(PreparseStatus::Failed);
                return Err(error.into());
            }
        };

        if let Err(error) = job.start().await {
            tracing::warn!(item = %item.id(), %error, "Failed to start input job");
            item.signal_preparse_ended(PreparseStatus::Failed);
            return Err(error.into());
        }

        Ok(PreparseTask {
            request: Arc::clone(request),
            job,
            state,
            done,
        })
    }

    fn probe(&self, task: &PreparseTask) -> bool {
        task.done.load(Ordering::SeqCst)
    }

    async fn stop(&self, task: PreparseTask, outcome: TaskOutcome) {
        let item = Arc::clone(&task.request.item);
        let status = match InputState::from_u8(task.state.load(Ordering::SeqCst)) {
            InputState::Ended => PreparseStatus::Done,
            InputState::Error => PreparseStatus::Failed,
            // Cancelled or expired before a terminal state was observed.
            _ => PreparseStatus::Timeout,
        };
        tracing::debug!(item = %item.id(), ?outcome, ?status, "Preparse task stopping");

        task.job.stop().await;
        drop(task.job);

        if let Some(fetcher) = &self.fetcher {
            if fetcher
                .push(Arc::clone(&item), task.request.options, status)
                .await
            {
                // The fetcher signals the item's end-of-preparse itself.
                return;
            }
        }

        item.set_preparsed(true);
        item.signal_preparse_ended(status);
    }
}

/// Asynchronous media-metadata preparser.
pub struct Preparser {
    pool: BackgroundWorker<PreparseHooks>,
    deactivated: AtomicBool,
}

impl Preparser {
    /// Create a preparser on top of a fresh worker pool.
    ///
    /// Must be called inside a tokio runtime. `fetcher` is optional; without
    /// one the preparser signals items itself.
    pub fn new(
        config: PreparserConfig,
        input: Arc<dyn InputProcessor>,
        fetcher: Option<Arc<dyn Fetcher>>,
    ) -> Self {
        let hooks = PreparseHooks { input, fetcher };
        Self {
            pool: BackgroundWorker::new(config.worker, hooks),
            deactivated: AtomicBool::new(false),
        }
    }

    /// Submit an item for preparsing.
    ///
    /// Ineligible items (wrong type, or network-hosted without network
    /// scope) are signalled `Skipped` synchronously and never enter the
    /// pool. `timeout` of `None` uses the pool default, `Some(Duration::ZERO)`
    /// disables expiry. `id` is the handle for [`Preparser::cancel`].
    pub fn push(
        &self,
        item: Arc<Item>,
        options: PreparseOptions,
        timeout: Option<Duration>,
        id: Option<Uuid>,
    ) {
        if self.deactivated.load(Ordering::SeqCst) {
            tracing::debug!(item = %item.id(), "Preparser deactivated, rejecting push");
            return;
        }

        let (item_type, network) = item.classification();
        if !eligible(item_type, network, options) {
            tracing::debug!(item = %item.id(), ?item_type, network, "Item skipped");
            item.signal_preparse_ended(PreparseStatus::Skipped);
            return;
        }

        let request = Arc::new(PreparseRequest {
            item: Arc::clone(&item),
            options,
        });
        if let Err(error) = self.pool.push(request, id, timeout) {
            tracing::warn!(item = %item.id(), %error, "Failed to queue preparse task");
            item.signal_preparse_ended(PreparseStatus::Failed);
        }
    }

    /// Cancel by identity; `None` cancels all current and future-queued
    /// tasks.
    pub fn cancel(&self, id: Option<Uuid>) {
        self.pool.cancel(id);
    }

    /// Permanently stop accepting pushes and cancel everything in flight.
    pub fn deactivate(&self) {
        self.deactivated.store(true, Ordering::SeqCst);
        self.pool.cancel(None);
        tracing::info!("Preparser deactivated");
    }

    /// Hand an item straight to the fetcher, bypassing metadata extraction.
    pub async fn fetch(&self, item: Arc<Item>, options: PreparseOptions) {
        if let Some(fetcher) = &self.pool.hooks().fetcher {
            fetcher.push(item, options, PreparseStatus::Done).await;
        }
    }

    /// Shut down: cancel all tasks and wait until every started task has
    /// run its stop hook.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
