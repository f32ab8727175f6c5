/*!
 * schedsim
 * Single-host process scheduler simulation: synthetic processes with
 * pre-declared instruction traces driven to completion under round-robin
 * or priority scheduling, with resource arbitration, single-slot
 * mailboxes, and deadlock detection and recovery.
 */

pub mod core;
pub mod deadlock;
pub mod ipc;
pub mod loader;
pub mod monitoring;
pub mod process;
pub mod resource;
pub mod sched;

// Re-exports
pub use crate::core::errors::{LoadError, SimError};
pub use crate::core::types::{Pid, Priority, SimResult};
pub use deadlock::Verdict;
pub use ipc::{Mailbox, MailboxSet};
pub use loader::{load_trace_file, parse_trace, SystemImage, SystemImageBuilder};
pub use monitoring::init_tracing;
pub use process::{Instruction, ProcessInfo, ProcessState, QueueId, RelocateOutcome};
pub use resource::{AcquireOutcome, ReleaseOutcome, ResourceLedger};
pub use sched::{Policy, RunOutcome, RunStats, Simulator};
