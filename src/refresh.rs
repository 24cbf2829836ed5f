//! Model rebuilding off the typing path.
//!
//! ```text
//!  Session ──ComputeRequest{seq,text}──▶ ModelHost ──build──▶ ModelSlot
//!     ▲                                                          │
//!     └──────────────── snapshot() (Arc<Model>) ◀────────────────┘
//! ```
//!
//! The session hands text snapshots to a [`ModelHost`] and reads whatever
//! model the [`ModelSlot`] holds. Every request carries a sequence number;
//! a result is published only if no newer request has been issued, so a
//! slow build can never overwrite a fresher one. The slot swaps whole
//! `Arc<Model>` values, so readers see a complete model or none at all.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

use crate::model::Model;

/// Work sent to a model host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComputeRequest {
    /// Build a model from the full document text.
    Predict { seq: u64, text: String },
}

impl ComputeRequest {
    pub fn seq(&self) -> u64 {
        match self {
            ComputeRequest::Predict { seq, .. } => *seq,
        }
    }
}

#[derive(Debug, Default)]
struct Published {
    seq: u64,
    model: Option<Arc<Model>>,
}

/// Latest finished model, shared between the session and its host.
#[derive(Debug, Clone, Default)]
pub struct ModelSlot {
    published: Arc<RwLock<Published>>,
    requested: Arc<AtomicU64>,
}

impl ModelSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the sequence number for a new request.
    pub fn next_seq(&self) -> u64 {
        self.requested.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Sequence number of the newest request issued so far.
    pub fn latest_requested(&self) -> u64 {
        self.requested.load(Ordering::SeqCst)
    }

    /// Whether a result for `seq` would still be current.
    pub fn is_current(&self, seq: u64) -> bool {
        seq >= self.latest_requested()
    }

    /// Store the result of request `seq`.
    ///
    /// Returns `false` and drops the result when a newer request exists or a
    /// newer result was already published. `None` clears the slot: the text
    /// had too few words for a model.
    pub fn publish(&self, seq: u64, model: Option<Model>) -> bool {
        if !self.is_current(seq) {
            debug!(seq, latest = self.latest_requested(), "discarding stale model");
            return false;
        }

        let mut published = self.published.write();
        if seq < published.seq {
            return false;
        }
        published.seq = seq;
        published.model = model.map(Arc::new);
        true
    }

    /// The current model, if any.
    pub fn snapshot(&self) -> Option<Arc<Model>> {
        self.published.read().model.clone()
    }

    /// Sequence number of the request whose result is published.
    pub fn published_seq(&self) -> u64 {
        self.published.read().seq
    }
}

fn build_and_publish(slot: &ModelSlot, seq: u64, text: &str) {
    let model = Model::from_text(text);
    let prefixes = model.as_ref().map_or(0, Model::len);
    if slot.publish(seq, model) {
        debug!(seq, prefixes, "model rebuilt");
    }
}

/// Where model builds run.
#[derive(Debug)]
pub enum ModelHost {
    /// Build on the caller's thread as soon as the request is submitted.
    Inline(ModelSlot),
    /// Build on a dedicated worker thread.
    Worker(WorkerHost),
}

impl ModelHost {
    pub fn inline(slot: ModelSlot) -> Self {
        ModelHost::Inline(slot)
    }

    /// Start a worker thread, falling back to inline builds if it can't spawn.
    pub fn worker(slot: ModelSlot) -> Self {
        match WorkerHost::spawn(slot.clone()) {
            Ok(worker) => ModelHost::Worker(worker),
            Err(err) => {
                warn!("failed to start model worker, building inline: {err}");
                ModelHost::Inline(slot)
            }
        }
    }

    pub fn slot(&self) -> &ModelSlot {
        match self {
            ModelHost::Inline(slot) => slot,
            ModelHost::Worker(worker) => &worker.slot,
        }
    }

    /// Request a rebuild from `text`. Returns the request's sequence number.
    pub fn submit(&mut self, text: String) -> u64 {
        let seq = self.slot().next_seq();
        let request = ComputeRequest::Predict { seq, text };

        match self {
            ModelHost::Inline(slot) => {
                let ComputeRequest::Predict { seq, text } = request;
                build_and_publish(slot, seq, &text);
            }
            ModelHost::Worker(worker) => {
                if let Err(mpsc::SendError(request)) = worker.send(request) {
                    warn!("model worker is gone, building inline");
                    let ComputeRequest::Predict { seq, text } = request;
                    build_and_publish(&worker.slot, seq, &text);
                }
            }
        }

        seq
    }
}

/// Handle to the background model builder.
///
/// Dropping the handle closes the request channel and joins the thread.
#[derive(Debug)]
pub struct WorkerHost {
    slot: ModelSlot,
    sender: Option<Sender<ComputeRequest>>,
    handle: Option<JoinHandle<()>>,
}

impl WorkerHost {
    pub fn spawn(slot: ModelSlot) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::channel();
        let worker_slot = slot.clone();
        let handle = thread::Builder::new()
            .name("noteassist-model".to_string())
            .spawn(move || run_worker(&worker_slot, &receiver))?;

        Ok(Self {
            slot,
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    fn send(&self, request: ComputeRequest) -> Result<(), mpsc::SendError<ComputeRequest>> {
        match &self.sender {
            Some(sender) => sender.send(request),
            None => Err(mpsc::SendError(request)),
        }
    }
}

impl Drop for WorkerHost {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("model worker panicked");
            }
        }
    }
}

fn run_worker(slot: &ModelSlot, receiver: &Receiver<ComputeRequest>) {
    while let Ok(mut request) = receiver.recv() {
        // Only the newest queued snapshot is worth building.
        while let Ok(newer) = receiver.try_recv() {
            request = newer;
        }

        if !slot.is_current(request.seq()) {
            continue;
        }

        let ComputeRequest::Predict { seq, text } = request;
        build_and_publish(slot, seq, &text);
    }
    debug!("model worker stopped");
}
