/*!
 * Process Table
 * Index-addressed arena of process control blocks
 */

use super::types::{Instruction, Pcb};
use crate::core::types::{Pid, Priority};

/// Arena holding every loaded process, indexed by pid
///
/// Slots are never removed: terminated processes keep their slot so that
/// reporting can walk the full population after the run.
#[derive(Debug, Clone, Default)]
pub struct ProcessTable {
    slots: Vec<Pcb>,
}

impl ProcessTable {
    #[must_use]
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Insert a new process and return its pid (the slot index)
    pub fn insert(&mut self, name: String, priority: Priority, trace: Vec<Instruction>) -> Pid {
        let pid = self.slots.len() as Pid;
        self.slots.push(Pcb::new(pid, name, priority, trace));
        pid
    }

    #[inline]
    #[must_use]
    pub fn get(&self, pid: Pid) -> Option<&Pcb> {
        self.slots.get(pid as usize)
    }

    #[inline]
    pub fn get_mut(&mut self, pid: Pid) -> Option<&mut Pcb> {
        self.slots.get_mut(pid as usize)
    }

    #[must_use]
    pub fn pid_of(&self, name: &str) -> Option<Pid> {
        self.slots.iter().find(|p| p.name == name).map(|p| p.pid)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pcb> {
        self.slots.iter()
    }

    /// All pids in arrival (load) order
    pub fn pids(&self) -> impl Iterator<Item = Pid> + '_ {
        self.slots.iter().map(|p| p.pid)
    }
}
