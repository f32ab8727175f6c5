/*!
 * Core Types
 * Common types used across the simulator
 */

/// Process ID type
///
/// Pids are assigned sequentially at load time and double as slot indices
/// into the process table.
pub type Pid = u32;

/// Priority level (lower value = more urgent)
pub type Priority = u8;

/// Common result type for simulator operations
pub type SimResult<T> = Result<T, super::errors::SimError>;
