/*!
 * Process Module
 * Process records, the process table, and queue membership
 */

pub mod queues;
pub mod table;
pub mod types;

// Re-export for convenience
pub use queues::{QueueId, QueueSet, RelocateOutcome};
pub use table::ProcessTable;
pub use types::{Instruction, Pcb, ProcessInfo, ProcessState};
