/*!
 * Process Types
 * Process records, lifecycle states, and instruction traces
 */

use crate::core::types::{Pid, Priority};
use serde::{Deserialize, Serialize};

/// Process lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Process structure has been loaded but not handed to the scheduler
    New,
    /// Process is eligible to run, not currently executing
    Ready,
    /// Process is currently executing
    Running,
    /// Process is blocked on an unavailable resource
    Waiting,
    /// Process has consumed its whole instruction trace
    Terminated,
}

impl ProcessState {
    #[inline]
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        matches!(self, ProcessState::Terminated)
    }
}

/// One step of a pre-declared instruction trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    /// Acquire a named resource; blocks the process while it is held elsewhere
    Request { resource: String },
    /// Return a held resource to the shared pool
    Release { resource: String },
    /// Overwrite the single pending slot of a named mailbox
    Send { mailbox: String, message: String },
    /// Drain the pending slot of a named mailbox (empty yields nothing, never blocks)
    Receive { mailbox: String },
}

impl Instruction {
    pub fn request(resource: impl Into<String>) -> Self {
        Instruction::Request {
            resource: resource.into(),
        }
    }

    pub fn release(resource: impl Into<String>) -> Self {
        Instruction::Release {
            resource: resource.into(),
        }
    }

    pub fn send(mailbox: impl Into<String>, message: impl Into<String>) -> Self {
        Instruction::Send {
            mailbox: mailbox.into(),
            message: message.into(),
        }
    }

    pub fn receive(mailbox: impl Into<String>) -> Self {
        Instruction::Receive {
            mailbox: mailbox.into(),
        }
    }
}

/// Process control block
///
/// The trace is append-only and consumed front-to-back through a cursor;
/// the cursor only ever advances. Held resources are not stored here: the
/// resource ledger tags each resource slot with its owning pid, so a
/// resource can never appear in two held sets at once.
#[derive(Debug, Clone)]
pub struct Pcb {
    pub pid: Pid,
    pub name: String,
    pub state: ProcessState,
    pub priority: Priority,
    trace: Vec<Instruction>,
    cursor: usize,
}

impl Pcb {
    pub fn new(pid: Pid, name: String, priority: Priority, trace: Vec<Instruction>) -> Self {
        Self {
            pid,
            name,
            state: ProcessState::New,
            priority,
            trace,
            cursor: 0,
        }
    }

    /// Next instruction to execute, if any remains
    #[inline]
    #[must_use]
    pub fn next_instruction(&self) -> Option<&Instruction> {
        self.trace.get(self.cursor)
    }

    /// Consume the instruction under the cursor
    #[inline]
    pub fn advance(&mut self) {
        if self.cursor < self.trace.len() {
            self.cursor += 1;
        }
    }

    /// True once the whole trace has been consumed
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.trace.len()
    }

    #[inline]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    #[must_use]
    pub fn trace_len(&self) -> usize {
        self.trace.len()
    }

    /// Snapshot for external reporting
    #[must_use]
    pub fn info(&self) -> ProcessInfo {
        ProcessInfo {
            pid: self.pid,
            name: self.name.clone(),
            state: self.state,
            priority: self.priority,
            executed: self.cursor,
            remaining: self.trace.len() - self.cursor,
        }
    }
}

/// Read-only process metadata exposed for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessInfo {
    pub pid: Pid,
    pub name: String,
    pub state: ProcessState,
    pub priority: Priority,
    pub executed: usize,
    pub remaining: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_advances_and_saturates() {
        let mut pcb = Pcb::new(0, "P1".into(), 1, vec![Instruction::request("R1")]);
        assert!(!pcb.is_finished());
        assert_eq!(
            pcb.next_instruction(),
            Some(&Instruction::request("R1"))
        );

        pcb.advance();
        assert!(pcb.is_finished());
        assert_eq!(pcb.next_instruction(), None);

        // Advancing past the end stays at the end
        pcb.advance();
        assert_eq!(pcb.cursor(), 1);
    }

    #[test]
    fn info_reports_progress() {
        let mut pcb = Pcb::new(
            2,
            "P3".into(),
            4,
            vec![Instruction::send("M1", "hi"), Instruction::receive("M1")],
        );
        pcb.advance();
        let info = pcb.info();
        assert_eq!(info.executed, 1);
        assert_eq!(info.remaining, 1);
        assert_eq!(info.state, ProcessState::New);
    }
}
