//! Worker: fixed render slots owned by a single actor task.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use rendergrid_core::Render;

use crate::counters::WorkerCounters;

/// Events consumed by the worker actor, in arrival order.
#[derive(Debug)]
enum WorkerEvent {
    /// A new render wants a slot.
    Submit(Render),
    /// The render in slot `i` has finished.
    Done(usize),
    /// Reply with the actor's current state.
    Snapshot(oneshot::Sender<WorkerSnapshot>),
}

/// Values the actor publishes for readers outside the task.
#[derive(Default)]
struct Published {
    failed: AtomicU64,
    success: AtomicU64,
    busy: AtomicUsize,
}

impl Published {
    fn counters(&self) -> WorkerCounters {
        WorkerCounters {
            failed: self.failed.load(Ordering::Relaxed),
            success: self.success.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of a worker, for display and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSnapshot {
    /// Cumulative counters since the worker was spawned.
    pub counters: WorkerCounters,
    /// Occupied slots.
    pub busy: usize,
    /// Render id per slot, `None` for an empty slot.
    pub slots: Vec<Option<u8>>,
}

impl WorkerSnapshot {
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// Cloneable submission endpoint for a worker.
///
/// Submitting is fire-and-forget: the outcome only shows up in the
/// worker's counters. Once the worker is gone, submissions are dropped.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    tx: mpsc::UnboundedSender<WorkerEvent>,
}

impl WorkerHandle {
    pub fn submit(&self, render: Render) {
        if self.tx.send(WorkerEvent::Submit(render)).is_err() {
            debug!(render = render.id(), "worker gone, render dropped");
        }
    }
}

/// A render worker.
///
/// Dropping the worker stops its actor. Renders still in flight are
/// abandoned: their timers fire into a closed mailbox and are never
/// counted.
pub struct Worker {
    slots: usize,
    handle: WorkerHandle,
    published: Arc<Published>,
    view: watch::Receiver<Vec<Option<u8>>>,
    /// Counters as of the previous `latest_stats` call.
    baseline: WorkerCounters,
    task: JoinHandle<()>,
}

impl Worker {
    /// Spawn a worker with `slots` empty slots.
    ///
    /// Must be called from within a tokio runtime. A worker with zero
    /// slots rejects everything.
    pub fn spawn(slots: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (view_tx, view) = watch::channel(vec![None; slots]);
        let published = Arc::new(Published::default());

        let actor = SlotActor {
            renders: vec![None; slots],
            busy: 0,
            counters: WorkerCounters::default(),
            mailbox: tx.downgrade(),
            published: published.clone(),
            view: view_tx,
        };
        let task = tokio::spawn(actor.run(rx));

        Self {
            slots,
            handle: WorkerHandle { tx },
            published,
            view,
            baseline: WorkerCounters::default(),
            task,
        }
    }

    /// Fixed slot capacity.
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Occupied slots, as last published by the actor.
    pub fn busy(&self) -> usize {
        self.published.busy.load(Ordering::Relaxed)
    }

    /// Cumulative counters, as last published by the actor.
    pub fn counters(&self) -> WorkerCounters {
        self.published.counters()
    }

    pub fn handle(&self) -> WorkerHandle {
        self.handle.clone()
    }

    pub fn submit(&self, render: Render) {
        self.handle.submit(render);
    }

    /// Counter increment since the previous call.
    ///
    /// The first call returns the full cumulative counters. Each call
    /// moves the baseline, so calling twice with no activity in between
    /// yields zero the second time.
    pub fn latest_stats(&mut self) -> WorkerCounters {
        let now = self.counters();
        let delta = now.since(self.baseline);
        self.baseline = now;
        delta
    }

    /// Display view. Never blocks and may lag the actor slightly.
    pub fn view(&self) -> WorkerSnapshot {
        WorkerSnapshot {
            counters: self.counters(),
            busy: self.busy(),
            slots: self.view.borrow().clone(),
        }
    }

    /// State as seen by the actor after every event queued before this
    /// call has been handled. `None` if the actor is no longer running.
    pub async fn settled(&self) -> Option<WorkerSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.handle.tx.send(WorkerEvent::Snapshot(reply)).ok()?;
        rx.await.ok()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("slots", &self.slots)
            .field("busy", &self.busy())
            .field("counters", &self.counters())
            .finish_non_exhaustive()
    }
}

/// The only owner of a worker's slot storage.
struct SlotActor {
    renders: Vec<Option<Render>>,
    busy: usize,
    counters: WorkerCounters,
    /// Weak so the mailbox closes once every handle is dropped.
    mailbox: mpsc::WeakUnboundedSender<WorkerEvent>,
    published: Arc<Published>,
    view: watch::Sender<Vec<Option<u8>>>,
}

impl SlotActor {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<WorkerEvent>) {
        while let Some(event) = rx.recv().await {
            match event {
                WorkerEvent::Submit(render) => self.start(render),
                WorkerEvent::Done(idx) => self.finish(idx),
                WorkerEvent::Snapshot(reply) => {
                    let _ = reply.send(self.snapshot());
                }
            }
        }
        trace!("worker mailbox closed");
    }

    fn start(&mut self, render: Render) {
        let Some(idx) = self.renders.iter().position(Option::is_none) else {
            self.counters.failed += 1;
            self.published
                .failed
                .store(self.counters.failed, Ordering::Relaxed);
            trace!(render = render.id(), "no free slot, render rejected");
            return;
        };

        let Some(tx) = self.mailbox.upgrade() else {
            return;
        };

        self.renders[idx] = Some(render);
        self.busy += 1;
        self.published.busy.store(self.busy, Ordering::Relaxed);
        self.view.send_modify(|slots| slots[idx] = Some(render.id()));

        let duration = render.duration();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = tx.send(WorkerEvent::Done(idx));
        });
        trace!(render = render.id(), slot = idx, ?duration, "render started");
    }

    fn finish(&mut self, idx: usize) {
        if self.renders[idx].take().is_none() {
            return;
        }
        self.busy -= 1;
        self.counters.success += 1;
        self.published.busy.store(self.busy, Ordering::Relaxed);
        self.published
            .success
            .store(self.counters.success, Ordering::Relaxed);
        self.view.send_modify(|slots| slots[idx] = None);
    }

    fn snapshot(&self) -> WorkerSnapshot {
        WorkerSnapshot {
            counters: self.counters,
            busy: self.busy,
            slots: self.renders.iter().map(|r| r.map(|r| r.id())).collect(),
        }
    }
}
