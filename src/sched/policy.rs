/*!
 * Scheduling Policy
 * Round-robin and priority disciplines
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scheduling discipline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum Policy {
    /// Round-robin with a fixed instruction quantum
    RoundRobin { quantum: u32 },
    /// Run-to-block; the initial ready order is a stable ascending sort by
    /// priority value (lower first, ties by arrival) and is never re-sorted
    Priority,
}

impl Policy {
    /// Round-robin with the quantum clamped to at least one instruction
    #[must_use]
    pub fn round_robin(quantum: u32) -> Self {
        Policy::RoundRobin {
            quantum: quantum.max(1),
        }
    }

    #[must_use]
    pub const fn is_preemptive(&self) -> bool {
        matches!(self, Policy::RoundRobin { .. })
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::RoundRobin { quantum } => write!(f, "round-robin (quantum {quantum})"),
            Policy::Priority => write!(f, "priority"),
        }
    }
}
