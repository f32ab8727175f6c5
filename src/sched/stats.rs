/*!
 * Lock-Free Run Statistics
 * Atomic counters updated from the dispatch hot path
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic run statistics
///
/// All updates use relaxed ordering; the snapshot needs no synchronization.
#[derive(Debug, Default)]
pub struct AtomicRunStats {
    instructions_executed: AtomicU64,
    context_switches: AtomicU64,
    preemptions: AtomicU64,
    blocks: AtomicU64,
    wakeups: AtomicU64,
    deadlocks_resolved: AtomicU64,
    invalid_releases: AtomicU64,
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
}

impl AtomicRunStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn inc_instructions(&self) {
        self.instructions_executed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_context_switches(&self) {
        self.context_switches.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_preemptions(&self) {
        self.preemptions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_blocks(&self) {
        self.blocks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_wakeups(&self, count: u64) {
        self.wakeups.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_deadlocks_resolved(&self) {
        self.deadlocks_resolved.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_invalid_releases(&self) {
        self.invalid_releases.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_messages_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_messages_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Consistent-enough snapshot for reporting
    #[must_use]
    pub fn snapshot(&self) -> RunStats {
        RunStats {
            instructions_executed: self.instructions_executed.load(Ordering::Relaxed),
            context_switches: self.context_switches.load(Ordering::Relaxed),
            preemptions: self.preemptions.load(Ordering::Relaxed),
            blocks: self.blocks.load(Ordering::Relaxed),
            wakeups: self.wakeups.load(Ordering::Relaxed),
            deadlocks_resolved: self.deadlocks_resolved.load(Ordering::Relaxed),
            invalid_releases: self.invalid_releases.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the run counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunStats {
    pub instructions_executed: u64,
    pub context_switches: u64,
    pub preemptions: u64,
    pub blocks: u64,
    pub wakeups: u64,
    pub deadlocks_resolved: u64,
    pub invalid_releases: u64,
    pub messages_sent: u64,
    pub messages_received: u64,
}
