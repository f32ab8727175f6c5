/*!
 * Resource Ledger
 * Tracks resource availability and ownership
 */

use crate::core::errors::SimError;
use crate::core::types::{Pid, SimResult};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Result of an acquire attempt
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// Resource relocated from the free pool into the caller's held set
    Acquired,
    /// Resource exists but is held elsewhere; caller should transition to Waiting
    Unavailable,
}

/// Result of a release attempt
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Resource relocated from the caller's held set back to the free pool
    Released,
    /// Caller does not hold the resource; the instruction is still consumed
    NotHeld,
}

/// One resource slot in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    name: String,
    available: bool,
    owner: Option<Pid>,
}

impl Resource {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available
    }

    #[must_use]
    pub fn owner(&self) -> Option<Pid> {
        self.owner
    }
}

/// Arena of resource slots
///
/// A resource is a member of exactly one of the free pool or one process's
/// held set; both are views over the owner tag, so relocation is a tag flip
/// and duplication is impossible by construction. Lookups are linear scans
/// by name, matching the small populations this simulates.
#[derive(Debug, Clone, Default)]
pub struct ResourceLedger {
    slots: Vec<Resource>,
}

impl ResourceLedger {
    #[must_use]
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Register a resource into the free pool; false if the name is taken
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.find(&name).is_some() {
            return false;
        }
        self.slots.push(Resource {
            name,
            available: true,
            owner: None,
        });
        true
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|r| r.name == name)
    }

    /// Try to move the named resource from the free pool into `pid`'s held set
    pub fn acquire(&mut self, name: &str, pid: Pid) -> SimResult<AcquireOutcome> {
        let slot = self.find(name).ok_or_else(|| SimError::UnknownResource {
            pid,
            resource: name.to_string(),
        })?;
        let resource = &mut self.slots[slot];
        if !resource.available {
            return Ok(AcquireOutcome::Unavailable);
        }
        resource.available = false;
        resource.owner = Some(pid);
        debug!("resource {} acquired by process {}", name, pid);
        Ok(AcquireOutcome::Acquired)
    }

    /// Try to move the named resource from `pid`'s held set back to the pool
    ///
    /// Releasing a resource the process does not hold is a no-op failure;
    /// the caller still consumes the instruction.
    pub fn release(&mut self, name: &str, pid: Pid) -> SimResult<ReleaseOutcome> {
        let slot = self.find(name).ok_or_else(|| SimError::UnknownResource {
            pid,
            resource: name.to_string(),
        })?;
        let resource = &mut self.slots[slot];
        if resource.owner != Some(pid) {
            warn!("process {} rel {}: nothing to release", pid, name);
            return Ok(ReleaseOutcome::NotHeld);
        }
        resource.owner = None;
        resource.available = true;
        debug!("resource {} released by process {}", name, pid);
        Ok(ReleaseOutcome::Released)
    }

    /// Abnormal release used by deadlock recovery
    ///
    /// Clears whichever owner holds the resource and returns it; the former
    /// holder's instruction cursor is untouched.
    pub fn force_release(&mut self, name: &str) -> Option<Pid> {
        let slot = self.find(name)?;
        let resource = &mut self.slots[slot];
        let former = resource.owner.take()?;
        resource.available = true;
        warn!(
            "resource {} force-released from process {}",
            name, former
        );
        Some(former)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Owning pid of a resource, if held
    #[must_use]
    pub fn owner_of(&self, name: &str) -> Option<Pid> {
        self.find(name).and_then(|slot| self.slots[slot].owner)
    }

    /// Names currently in the free pool, in arena order
    #[must_use]
    pub fn available(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter(|r| r.available)
            .map(|r| r.name.clone())
            .collect()
    }

    /// Names currently in `pid`'s held set, in arena order
    #[must_use]
    pub fn held_by(&self, pid: Pid) -> Vec<String> {
        self.slots
            .iter()
            .filter(|r| r.owner == Some(pid))
            .map(|r| r.name.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.slots.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> ResourceLedger {
        let mut ledger = ResourceLedger::new();
        assert!(ledger.insert("R1"));
        assert!(ledger.insert("R2"));
        ledger
    }

    #[test]
    fn acquire_moves_resource_out_of_pool() {
        let mut ledger = ledger();
        assert_eq!(ledger.acquire("R1", 0), Ok(AcquireOutcome::Acquired));
        assert_eq!(ledger.acquire("R1", 1), Ok(AcquireOutcome::Unavailable));
        assert_eq!(ledger.available(), vec!["R2".to_string()]);
        assert_eq!(ledger.held_by(0), vec!["R1".to_string()]);
        assert_eq!(ledger.owner_of("R1"), Some(0));
    }

    #[test]
    fn release_requires_ownership() {
        let mut ledger = ledger();
        assert_eq!(ledger.acquire("R1", 0), Ok(AcquireOutcome::Acquired));
        assert_eq!(ledger.release("R1", 1), Ok(ReleaseOutcome::NotHeld));
        assert_eq!(ledger.owner_of("R1"), Some(0));
        assert_eq!(ledger.release("R1", 0), Ok(ReleaseOutcome::Released));
        assert!(ledger.available().contains(&"R1".to_string()));
    }

    #[test]
    fn unknown_resource_fails_fast() {
        let mut ledger = ledger();
        assert_eq!(
            ledger.acquire("R9", 3),
            Err(SimError::UnknownResource {
                pid: 3,
                resource: "R9".into()
            })
        );
    }

    #[test]
    fn force_release_reports_former_holder() {
        let mut ledger = ledger();
        assert_eq!(ledger.acquire("R2", 5), Ok(AcquireOutcome::Acquired));
        assert_eq!(ledger.force_release("R2"), Some(5));
        assert_eq!(ledger.force_release("R2"), None);
        assert!(ledger.available().contains(&"R2".to_string()));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut ledger = ledger();
        assert!(!ledger.insert("R1"));
        assert_eq!(ledger.len(), 2);
    }
}
