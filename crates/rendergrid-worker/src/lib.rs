//! rendergrid-worker — the render worker state machine.
//!
//! A worker owns a fixed number of slots. Each slot is either empty or
//! holds one in-flight render. All slot mutations happen inside a single
//! actor task that consumes one ordered event stream:
//!
//! ```text
//! WorkerHandle::submit ──┐
//!                        ├─► mpsc ─► actor ─┬─► first empty slot? occupy + start timer
//! timer (render done) ───┘                  │                  : failed += 1
//!                                           └─► done(i): clear slot, success += 1
//! ```
//!
//! Counters and slot occupancy are published by the actor for readers
//! (pool aggregation, display) that must not touch slot storage.

pub mod counters;
pub mod worker;

pub use counters::WorkerCounters;
pub use worker::{Worker, WorkerHandle, WorkerSnapshot};
