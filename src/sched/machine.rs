/*!
 * Scheduler Machine
 * The dispatch loop over the queues, ledger, and mailbox set
 */

use super::policy::Policy;
use super::stats::AtomicRunStats;
use crate::core::errors::SimError;
use crate::core::types::{Pid, SimResult};
use crate::deadlock::{self, Verdict};
use crate::ipc::mailbox::MailboxSet;
use crate::loader::SystemImage;
use crate::process::queues::{QueueId, QueueSet, RelocateOutcome};
use crate::process::table::ProcessTable;
use crate::process::types::{Instruction, ProcessState};
use crate::resource::ledger::{AcquireOutcome, ReleaseOutcome, ResourceLedger};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Terminal status of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every process terminated; the terminated queue holds all of them in
    /// finish order
    Completed,
    /// A subset of waiting processes can never proceed; the whole run halts
    Blocked { stuck: Vec<Pid> },
}

/// The explicit scheduler context: owns all four queues, the process table,
/// the resource ledger, and the mailbox set
///
/// Single-threaded and cooperative; exactly one process is current at a
/// time and every mutation is synchronous.
#[derive(Debug)]
pub(crate) struct Machine {
    pub(crate) table: ProcessTable,
    pub(crate) queues: QueueSet,
    pub(crate) ledger: ResourceLedger,
    pub(crate) mailboxes: MailboxSet,
    pub(crate) policy: Policy,
}

impl Machine {
    pub(crate) fn new(image: SystemImage, policy: Policy) -> Self {
        let (table, ledger, mailboxes) = image.into_parts();
        let mut machine = Self {
            table,
            queues: QueueSet::new(),
            ledger,
            mailboxes,
            policy,
        };
        let pids: Vec<Pid> = machine.table.pids().collect();
        for pid in pids {
            let _ = machine.queues.admit(pid, QueueId::Ready);
            machine.set_state(pid, ProcessState::Ready);
        }
        if machine.policy == Policy::Priority {
            // Priority order is fixed once at load; ties keep arrival order
            let table = &machine.table;
            machine.queues.sort_by_key(QueueId::Ready, |pid| {
                table.get(pid).map(|p| p.priority).unwrap_or(u8::MAX)
            });
        }
        machine
    }

    /// Drive every process to completion or a halt
    pub(crate) fn run(&mut self, stats: &AtomicRunStats) -> SimResult<RunOutcome> {
        loop {
            if self.queues.current().is_none() && !self.queues.is_empty(QueueId::Ready) {
                self.promote_next(stats);
            }
            if self.queues.current().is_some() {
                self.dispatch(stats)?;
                self.epilogue(stats);
                continue;
            }
            // No process is runnable
            if self.queues.is_empty(QueueId::Waiting) {
                info!(
                    "run complete: {} process(es) terminated",
                    self.queues.len(QueueId::Terminated)
                );
                return Ok(RunOutcome::Completed);
            }
            match deadlock::detect(&self.table, &self.queues, &self.ledger) {
                Verdict::Deadlock => {
                    info!("deadlock detected; attempting recovery");
                    self.recover(stats);
                }
                Verdict::Blocked { stuck } => {
                    warn!("blocked but not deadlocked: {:?}; halting run", stuck);
                    return Ok(RunOutcome::Blocked { stuck });
                }
                Verdict::Clear => {
                    // Unreachable when invoked under the empty-ready guard
                    debug!("spurious deadlock check");
                }
            }
        }
    }

    /// One dispatch episode of the current process
    fn dispatch(&mut self, stats: &AtomicRunStats) -> SimResult<()> {
        match self.policy {
            Policy::RoundRobin { quantum } => self.dispatch_round_robin(quantum, stats),
            Policy::Priority => self.dispatch_run_to_block(stats),
        }
    }

    /// Execute up to `quantum` instructions; a mid-quantum block promotes
    /// the next ready process with a fresh, uncharged budget
    fn dispatch_round_robin(&mut self, quantum: u32, stats: &AtomicRunStats) -> SimResult<()> {
        let mut budget = quantum;
        while budget > 0 {
            let Some(pid) = self.queues.current() else {
                break;
            };
            if self.pcb(pid)?.is_finished() {
                break;
            }
            if self.step(pid, stats)? {
                self.block_current(pid, stats);
                budget = quantum;
                continue;
            }
            budget -= 1;
        }
        Ok(())
    }

    /// Run the current process until it blocks or exhausts its trace
    fn dispatch_run_to_block(&mut self, stats: &AtomicRunStats) -> SimResult<()> {
        loop {
            let Some(pid) = self.queues.current() else {
                break;
            };
            if self.pcb(pid)?.is_finished() {
                break;
            }
            if self.step(pid, stats)? {
                self.block_current(pid, stats);
            }
        }
        Ok(())
    }

    /// Execute one instruction of `pid`; true means the process blocked
    fn step(&mut self, pid: Pid, stats: &AtomicRunStats) -> SimResult<bool> {
        let Some(instruction) = self.pcb(pid)?.next_instruction().cloned() else {
            return Ok(false);
        };
        match instruction {
            Instruction::Request { resource } => {
                match self.ledger.acquire(&resource, pid)? {
                    AcquireOutcome::Acquired => {
                        self.consume(pid, stats)?;
                        Ok(false)
                    }
                    AcquireOutcome::Unavailable => {
                        // Cursor untouched: the request is retried on wake
                        debug!("process {} req {}: waiting", pid, resource);
                        stats.inc_blocks();
                        Ok(true)
                    }
                }
            }
            Instruction::Release { resource } => {
                match self.ledger.release(&resource, pid)? {
                    ReleaseOutcome::Released => {
                        self.consume(pid, stats)?;
                        let woken = self.wake_requesters(&resource);
                        stats.add_wakeups(woken);
                    }
                    ReleaseOutcome::NotHeld => {
                        // Invalid release is silently consumed
                        self.consume(pid, stats)?;
                        stats.inc_invalid_releases();
                    }
                }
                Ok(false)
            }
            Instruction::Send { mailbox, message } => {
                self.mailboxes.send(&mailbox, message, pid)?;
                self.consume(pid, stats)?;
                stats.inc_messages_sent();
                Ok(false)
            }
            Instruction::Receive { mailbox } => {
                let message = self.mailboxes.receive(&mailbox, pid)?;
                self.consume(pid, stats)?;
                if message.is_some() {
                    stats.inc_messages_received();
                }
                Ok(false)
            }
        }
    }

    /// Advance the cursor past the consumed instruction
    fn consume(&mut self, pid: Pid, stats: &AtomicRunStats) -> SimResult<()> {
        self.table
            .get_mut(pid)
            .ok_or(SimError::ProcessNotFound(pid))?
            .advance();
        stats.inc_instructions();
        Ok(())
    }

    /// Park the blocked current process and hand the CPU to the ready head
    fn block_current(&mut self, pid: Pid, stats: &AtomicRunStats) {
        self.set_state(pid, ProcessState::Waiting);
        let _moved = self.queues.relocate(pid, QueueId::Current, QueueId::Waiting);
        if !self.queues.is_empty(QueueId::Ready) {
            self.promote_next(stats);
        }
    }

    /// Promote the ready head into the current slot
    fn promote_next(&mut self, stats: &AtomicRunStats) -> Option<Pid> {
        let pid = self.queues.head(QueueId::Ready)?;
        let outcome = self.queues.relocate(pid, QueueId::Ready, QueueId::Current);
        if outcome != RelocateOutcome::Moved {
            warn!("failed to promote process {}: {:?}", pid, outcome);
            return None;
        }
        self.set_state(pid, ProcessState::Running);
        stats.inc_context_switches();
        debug!("process {} promoted to current", pid);
        Some(pid)
    }

    /// Shared per-episode epilogue: retire a finished process, or cycle an
    /// unfinished one to the ready tail when others are waiting their turn
    fn epilogue(&mut self, stats: &AtomicRunStats) {
        let Some(pid) = self.queues.current() else {
            return;
        };
        let finished = self
            .table
            .get(pid)
            .map(|p| p.is_finished())
            .unwrap_or(false);
        if finished {
            self.set_state(pid, ProcessState::Terminated);
            let _moved = self
                .queues
                .relocate(pid, QueueId::Current, QueueId::Terminated);
            info!("process {} terminated", pid);
            self.promote_next(stats);
        } else if !self.queues.is_empty(QueueId::Ready) {
            self.set_state(pid, ProcessState::Ready);
            let _moved = self.queues.relocate(pid, QueueId::Current, QueueId::Ready);
            stats.inc_preemptions();
            self.promote_next(stats);
        }
        // else: the sole runnable process keeps the CPU
    }

    /// Move every waiting process whose next instruction requests `resource`
    /// to the ready tail, in waiting-queue (arrival) order
    pub(crate) fn wake_requesters(&mut self, resource: &str) -> u64 {
        let requesters: Vec<Pid> = self
            .queues
            .snapshot(QueueId::Waiting)
            .into_iter()
            .filter(|&pid| {
                matches!(
                    self.table.get(pid).and_then(|p| p.next_instruction()),
                    Some(Instruction::Request { resource: wanted }) if wanted.as_str() == resource
                )
            })
            .collect();
        let woken = requesters.len() as u64;
        for pid in requesters {
            self.set_state(pid, ProcessState::Ready);
            let _moved = self.queues.relocate(pid, QueueId::Waiting, QueueId::Ready);
            debug!("process {} woken by release of {}", pid, resource);
        }
        woken
    }

    /// Resolve a detected deadlock and resume execution
    fn recover(&mut self, stats: &AtomicRunStats) {
        let Some(freed) = deadlock::resolve(&self.table, &self.queues, &mut self.ledger) else {
            warn!("deadlock recovery found nothing to free");
            return;
        };
        stats.inc_deadlocks_resolved();
        let woken = self.wake_requesters(&freed);
        stats.add_wakeups(woken);
        self.promote_next(stats);
    }

    fn set_state(&mut self, pid: Pid, state: ProcessState) {
        if let Some(pcb) = self.table.get_mut(pid) {
            pcb.state = state;
        }
    }

    fn pcb(&self, pid: Pid) -> SimResult<&crate::process::types::Pcb> {
        self.table.get(pid).ok_or(SimError::ProcessNotFound(pid))
    }
}
