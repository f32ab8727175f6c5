/*!
 * Scheduler Queues
 * The four named process queues and the relocation primitive
 */

use crate::core::types::Pid;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Queue a process can be a member of
///
/// `Current` is the single executing slot, modeled as a queue of size <= 1
/// for uniformity with the relocation primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueId {
    Ready,
    Waiting,
    Current,
    Terminated,
}

/// Result of a relocation attempt
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocateOutcome {
    /// Removed from the source and appended to the destination tail
    Moved,
    /// Source queue was empty or did not contain the pid; nothing changed
    NotFound,
    /// Destination already holds the pid; the move was skipped entirely
    AlreadyQueued,
}

/// The complete queue membership state of the simulation
///
/// Every queue-membership change anywhere in the crate goes through
/// [`QueueSet::relocate`], which preserves the invariant that a process
/// belongs to exactly one queue at a time.
#[derive(Debug, Default)]
pub struct QueueSet {
    ready: VecDeque<Pid>,
    waiting: VecDeque<Pid>,
    current: VecDeque<Pid>,
    terminated: VecDeque<Pid>,
    // pid -> queue tag index for O(1) membership lookups
    locations: DashMap<Pid, QueueId>,
}

impl QueueSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a pid into a queue during initial population
    pub fn admit(&mut self, pid: Pid, queue: QueueId) -> RelocateOutcome {
        if self.locations.contains_key(&pid) {
            return RelocateOutcome::AlreadyQueued;
        }
        self.queue_mut(queue).push_back(pid);
        self.locations.insert(pid, queue);
        RelocateOutcome::Moved
    }

    /// Move `pid` from the head-searched `from` queue to the tail of `to`
    ///
    /// Relative order of all other members of both queues is preserved.
    /// An empty or non-containing source is a silent no-op (`NotFound`);
    /// a pid already present at the destination is left where it is.
    pub fn relocate(&mut self, pid: Pid, from: QueueId, to: QueueId) -> RelocateOutcome {
        let Some(pos) = self.queue(from).iter().position(|&p| p == pid) else {
            return RelocateOutcome::NotFound;
        };
        if from == to || self.queue(to).contains(&pid) {
            return RelocateOutcome::AlreadyQueued;
        }
        debug_assert!(
            to != QueueId::Current || self.current.is_empty(),
            "current slot holds at most one process"
        );
        self.queue_mut(from).remove(pos);
        self.queue_mut(to).push_back(pid);
        self.locations.insert(pid, to);
        RelocateOutcome::Moved
    }

    /// Head of a queue without removing it
    #[must_use]
    pub fn head(&self, queue: QueueId) -> Option<Pid> {
        self.queue(queue).front().copied()
    }

    /// The single executing process, if any
    #[must_use]
    pub fn current(&self) -> Option<Pid> {
        self.current.front().copied()
    }

    #[must_use]
    pub fn len(&self, queue: QueueId) -> usize {
        self.queue(queue).len()
    }

    #[must_use]
    pub fn is_empty(&self, queue: QueueId) -> bool {
        self.queue(queue).is_empty()
    }

    /// Which queue a pid currently belongs to
    #[must_use]
    pub fn location(&self, pid: Pid) -> Option<QueueId> {
        self.locations.get(&pid).map(|loc| *loc)
    }

    pub fn iter(&self, queue: QueueId) -> impl Iterator<Item = Pid> + '_ {
        self.queue(queue).iter().copied()
    }

    /// Owned snapshot of a queue in order
    #[must_use]
    pub fn snapshot(&self, queue: QueueId) -> Vec<Pid> {
        self.queue(queue).iter().copied().collect()
    }

    /// Stable in-place reorder of a queue (used once, for priority load order)
    pub fn sort_by_key<K: Ord, F: FnMut(Pid) -> K>(&mut self, queue: QueueId, mut key: F) {
        self.queue_mut(queue).make_contiguous().sort_by_key(|&p| key(p));
    }

    fn queue(&self, queue: QueueId) -> &VecDeque<Pid> {
        match queue {
            QueueId::Ready => &self.ready,
            QueueId::Waiting => &self.waiting,
            QueueId::Current => &self.current,
            QueueId::Terminated => &self.terminated,
        }
    }

    fn queue_mut(&mut self, queue: QueueId) -> &mut VecDeque<Pid> {
        match queue {
            QueueId::Ready => &mut self.ready,
            QueueId::Waiting => &mut self.waiting,
            QueueId::Current => &mut self.current,
            QueueId::Terminated => &mut self.terminated,
        }
    }
}
