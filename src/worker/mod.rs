//! Background worker pool — bounded-concurrency task scheduling.
//!
//! Core components:
//! - `task` — task records, `TaskHooks` seam, stop outcomes
//! - `pool` — `BackgroundWorker`: FIFO queue, runner slots, probe loop,
//!   timeout and cancellation handling

pub mod pool;
pub mod task;

pub use pool::{BackgroundWorker, ProbeHint};
pub use task::{TaskHooks, TaskOutcome};
