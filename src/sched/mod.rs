/*!
 * Scheduler
 * Drives loaded processes to completion under a scheduling discipline
 */

use crate::core::types::{Pid, SimResult};
use crate::loader::SystemImage;
use crate::process::queues::QueueId;
use crate::process::types::ProcessInfo;
use log::info;
use parking_lot::RwLock;
use std::sync::Arc;

mod machine;
mod policy;
mod stats;

use machine::Machine;

pub use machine::RunOutcome;
pub use policy::Policy;
pub use stats::{AtomicRunStats, RunStats};

/// Process scheduling simulator
///
/// Owns the scheduler context (queues, process table, resource ledger,
/// mailbox set) behind a single lock, plus lock-free run statistics.
/// Cloning shares the same simulation. The read-only snapshot methods are
/// for reporting; nothing outside the dispatch loop mutates the context.
pub struct Simulator {
    machine: Arc<RwLock<Machine>>,
    stats: Arc<AtomicRunStats>,
}

impl Simulator {
    /// Build a simulator over loaded processes, resources, and mailboxes
    pub fn new(image: SystemImage, policy: Policy) -> Self {
        info!("simulator initialized: policy={}", policy);
        Self {
            machine: Arc::new(RwLock::new(Machine::new(image, policy))),
            stats: Arc::new(AtomicRunStats::new()),
        }
    }

    /// Run the simulation to its terminal state
    ///
    /// Returns `Ok` for both completion and the blocked halt; only a
    /// malformed trace that slipped past the loader is an `Err`.
    pub fn run(&self) -> SimResult<RunOutcome> {
        self.machine.write().run(&self.stats)
    }

    #[must_use]
    pub fn policy(&self) -> Policy {
        self.machine.read().policy
    }

    /// Pids in the ready queue, head first
    #[must_use]
    pub fn ready(&self) -> Vec<Pid> {
        self.machine.read().queues.snapshot(QueueId::Ready)
    }

    /// Pids in the waiting queue, head first
    #[must_use]
    pub fn waiting(&self) -> Vec<Pid> {
        self.machine.read().queues.snapshot(QueueId::Waiting)
    }

    /// Pids in the terminated queue, in finish order
    #[must_use]
    pub fn terminated(&self) -> Vec<Pid> {
        self.machine.read().queues.snapshot(QueueId::Terminated)
    }

    /// The currently executing pid, if any
    #[must_use]
    pub fn current(&self) -> Option<Pid> {
        self.machine.read().queues.current()
    }

    /// Number of loaded processes
    #[must_use]
    pub fn process_count(&self) -> usize {
        self.machine.read().table.len()
    }

    /// All pids in load order
    #[must_use]
    pub fn pids(&self) -> Vec<Pid> {
        self.machine.read().table.pids().collect()
    }

    /// Snapshot of one process
    #[must_use]
    pub fn process_info(&self, pid: Pid) -> Option<ProcessInfo> {
        self.machine.read().table.get(pid).map(|p| p.info())
    }

    /// Snapshots of every process in load order
    #[must_use]
    pub fn all_process_info(&self) -> Vec<ProcessInfo> {
        self.machine.read().table.iter().map(|p| p.info()).collect()
    }

    /// Resource names currently in the free pool
    #[must_use]
    pub fn available_resources(&self) -> Vec<String> {
        self.machine.read().ledger.available()
    }

    /// All resource names in the system
    #[must_use]
    pub fn resource_names(&self) -> Vec<String> {
        self.machine
            .read()
            .ledger
            .iter()
            .map(|r| r.name().to_string())
            .collect()
    }

    /// Resource names held by a process
    #[must_use]
    pub fn held_by(&self, pid: Pid) -> Vec<String> {
        self.machine.read().ledger.held_by(pid)
    }

    /// Pending message of a mailbox; `None` when the mailbox does not exist
    #[must_use]
    pub fn mailbox(&self, name: &str) -> Option<Option<String>> {
        self.machine
            .read()
            .mailboxes
            .peek(name)
            .map(|slot| slot.map(str::to_string))
    }

    /// All mailbox names in the system
    #[must_use]
    pub fn mailbox_names(&self) -> Vec<String> {
        self.machine
            .read()
            .mailboxes
            .iter()
            .map(|m| m.name().to_string())
            .collect()
    }

    /// Snapshot of the run counters
    #[must_use]
    pub fn stats(&self) -> RunStats {
        self.stats.snapshot()
    }
}

impl Clone for Simulator {
    fn clone(&self) -> Self {
        Self {
            machine: Arc::clone(&self.machine),
            stats: Arc::clone(&self.stats),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::types::{Instruction, ProcessState};

    fn image(processes: Vec<(&str, u8, Vec<Instruction>)>) -> SystemImage {
        let mut builder = SystemImage::builder();
        for name in ["R1", "R2"] {
            builder.resource(name);
        }
        builder.mailbox("M1");
        for (name, priority, trace) in processes {
            builder.process(name, priority);
            for instruction in trace {
                builder.instruction(name, instruction);
            }
        }
        builder.build().expect("valid image")
    }

    #[test]
    fn single_process_runs_to_completion() {
        let sim = Simulator::new(
            image(vec![(
                "P1",
                1,
                vec![
                    Instruction::request("R1"),
                    Instruction::send("M1", "done"),
                    Instruction::release("R1"),
                ],
            )]),
            Policy::round_robin(2),
        );
        assert_eq!(sim.run().unwrap(), RunOutcome::Completed);
        assert_eq!(sim.terminated(), vec![0]);
        assert_eq!(sim.current(), None);
        let info = sim.process_info(0).unwrap();
        assert_eq!(info.state, ProcessState::Terminated);
        assert_eq!(info.remaining, 0);
        assert_eq!(sim.stats().instructions_executed, 3);
    }

    #[test]
    fn round_robin_interleaves_in_load_order() {
        let trace = || {
            vec![
                Instruction::send("M1", "a"),
                Instruction::send("M1", "b"),
            ]
        };
        let sim = Simulator::new(
            image(vec![("P1", 1, trace()), ("P2", 1, trace())]),
            Policy::round_robin(1),
        );
        assert_eq!(sim.run().unwrap(), RunOutcome::Completed);
        // Each quantum is one instruction; both finish after two turns each
        assert_eq!(sim.terminated(), vec![0, 1]);
        assert!(sim.stats().preemptions >= 2);
    }

    #[test]
    fn priority_orders_initial_ready_queue() {
        let trace = || vec![Instruction::send("M1", "x")];
        let sim = Simulator::new(
            image(vec![
                ("A", 3, trace()),
                ("B", 1, trace()),
                ("C", 2, trace()),
            ]),
            Policy::Priority,
        );
        assert_eq!(sim.run().unwrap(), RunOutcome::Completed);
        // Finish order follows ascending priority value: B, C, A
        assert_eq!(sim.terminated(), vec![1, 2, 0]);
    }

    #[test]
    fn clone_shares_the_same_simulation() {
        let sim = Simulator::new(
            image(vec![("P1", 1, vec![Instruction::send("M1", "x")])]),
            Policy::round_robin(1),
        );
        let observer = sim.clone();
        assert_eq!(sim.run().unwrap(), RunOutcome::Completed);
        assert_eq!(observer.terminated(), vec![0]);
        assert_eq!(observer.stats().instructions_executed, 1);
    }
}
