//! Chunked, restartable full-tree scan.
//!
//! Every request bumps a generation counter. A pass remembers the generation
//! it was started for; when a newer request arrives the pass is dropped and
//! a fresh one starts from the first root. The walk keeps its own stack of
//! handles so the store can be mutated between chunks.

use trellis_core::ElementId;
use trellis_graph::ElementStore;

/// Outcome of one scan step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// No scan requested.
    Idle,
    /// A chunk was checked and more elements remain.
    Yielded,
    /// The pass reached the end of the tree.
    Finished,
}

#[derive(Debug)]
struct Pass {
    generation: u64,
    stack: Vec<ElementId>,
    visited: usize,
}

/// Scan bookkeeping.
#[derive(Debug, Default)]
pub struct ScanState {
    requested: u64,
    completed: u64,
    pass: Option<Pass>,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a scan, superseding any pass in progress.
    pub fn request(&mut self) -> u64 {
        self.requested += 1;
        self.requested
    }

    /// Generation of the most recent request.
    pub fn generation(&self) -> u64 {
        self.requested
    }

    /// Whether the latest request has not been completed yet.
    pub fn is_pending(&self) -> bool {
        self.requested > self.completed
    }

    /// Whether a pass is mid-way through the tree.
    pub fn is_running(&self) -> bool {
        self.pass.is_some()
    }

    /// Make sure a pass for the latest generation exists.
    ///
    /// Returns `false` when nothing is pending.
    pub(crate) fn prepare(&mut self, store: &ElementStore) -> bool {
        if !self.is_pending() {
            return false;
        }
        let current = self.pass.as_ref().map(|pass| (pass.generation, pass.visited));
        if let Some((generation, visited)) = current {
            if generation == self.requested {
                return true;
            }
            tracing::debug!(
                superseded = generation,
                generation = self.requested,
                visited,
                "scan restarted"
            );
        }
        self.pass = Some(Pass {
            generation: self.requested,
            stack: store.roots().iter().rev().copied().collect(),
            visited: 0,
        });
        true
    }

    /// Next element of the current pass in depth-first containment order.
    pub(crate) fn next(&mut self, store: &ElementStore) -> Option<ElementId> {
        let pass = self.pass.as_mut()?;
        while let Some(id) = pass.stack.pop() {
            if !store.contains(id) {
                tracing::warn!(element = %id, "skipping removed element during scan");
                continue;
            }
            let children: Vec<ElementId> = store.child_elements(id).collect();
            pass.stack.extend(children.into_iter().rev());
            pass.visited += 1;
            return Some(id);
        }
        None
    }

    /// Close the current pass; returns the number of elements it visited.
    pub(crate) fn finish(&mut self) -> usize {
        match self.pass.take() {
            Some(pass) => {
                self.completed = pass.generation;
                pass.visited
            }
            None => 0,
        }
    }
}
