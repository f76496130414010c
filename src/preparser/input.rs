//! Boundary to the input-processing subsystem that performs the actual
//! demuxing and metadata extraction.
//!
//! The subsystem runs on its own threads and reports progress through an
//! event listener; only the contract the preparser relies on is defined
//! here.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::InputError;
use crate::item::Item;

/// Lifecycle state reported by an input job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InputState {
    /// Job created, nothing started yet.
    Created = 0,
    /// Probing/opening the item.
    Opening = 1,
    /// Actively extracting.
    Running = 2,
    /// Paused by the subsystem.
    Paused = 3,
    /// Extraction reached the end of the item.
    Ended = 4,
    /// Extraction aborted with an error.
    Error = 5,
}

impl InputState {
    pub(crate) fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Opening,
            2 => Self::Running,
            3 => Self::Paused,
            4 => Self::Ended,
            5 => Self::Error,
            _ => Self::Created,
        }
    }
}

/// Asynchronous event delivered by the input subsystem on its own thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// The job moved to a new lifecycle state.
    StateChanged(InputState),
    /// The job is dead; no further events will follow.
    Dead,
}

/// Listener receiving [`InputEvent`]s; must be callable from any thread.
pub type EventListener = Arc<dyn Fn(InputEvent) + Send + Sync>;

/// Factory for input jobs.
#[async_trait]
pub trait InputProcessor: Send + Sync + 'static {
    /// Create a metadata-extraction job for `item`. Events are delivered to
    /// `listener` until [`InputEvent::Dead`].
    async fn create_job(
        &self,
        item: Arc<Item>,
        listener: EventListener,
    ) -> Result<Box<dyn InputJob>, InputError>;
}

/// One running extraction job. Closed when dropped.
#[async_trait]
pub trait InputJob: Send + Sync {
    /// Begin extraction.
    async fn start(&self) -> Result<(), InputError>;

    /// Ask the job to wind down; idempotent.
    async fn stop(&self);
}
