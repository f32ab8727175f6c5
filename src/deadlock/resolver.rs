/*!
 * Deadlock Resolver
 * Breaks a detected cycle by force-releasing one contested resource
 */

use super::detector::waits_for;
use crate::process::queues::{QueueId, QueueSet};
use crate::process::table::ProcessTable;
use crate::resource::ledger::ResourceLedger;
use log::{info, warn};

/// Force-release the resource the head of the waiting queue is blocked on
///
/// The holder must itself be in the waiting set (guaranteed when the
/// detector reported deadlock). The holder's instruction cursor is left
/// untouched; this is an abnormal release. Returns the freed resource name
/// so the caller can wake its requesters and promote a new current process.
pub fn resolve(
    table: &ProcessTable,
    queues: &QueueSet,
    ledger: &mut ResourceLedger,
) -> Option<String> {
    let head = queues.head(QueueId::Waiting)?;
    let Some(resource) = waits_for(table, head) else {
        warn!("waiting head {} is not blocked on a request", head);
        return None;
    };
    let Some(holder) = ledger.owner_of(&resource) else {
        warn!("contested resource {} has no holder", resource);
        return None;
    };
    if queues.location(holder) != Some(QueueId::Waiting) {
        // Holder escaped the waiting set; this is a blocked state, not a
        // recoverable deadlock
        warn!(
            "holder {} of resource {} is outside the waiting set",
            holder, resource
        );
        return None;
    }
    ledger.force_release(&resource);
    info!(
        "deadlock recovery: freed {} from process {}",
        resource, holder
    );
    Some(resource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::types::Instruction;
    use crate::resource::ledger::AcquireOutcome;

    #[test]
    fn resolve_frees_the_heads_contested_resource() {
        let mut table = ProcessTable::new();
        let mut queues = QueueSet::new();
        let mut ledger = ResourceLedger::new();
        assert!(ledger.insert("R1"));
        assert!(ledger.insert("R2"));

        let p1 = table.insert("P1".into(), 1, vec![Instruction::request("R2")]);
        let p2 = table.insert("P2".into(), 1, vec![Instruction::request("R1")]);
        assert_eq!(ledger.acquire("R1", p1), Ok(AcquireOutcome::Acquired));
        assert_eq!(ledger.acquire("R2", p2), Ok(AcquireOutcome::Acquired));
        let _ = queues.admit(p1, QueueId::Waiting);
        let _ = queues.admit(p2, QueueId::Waiting);

        // Waiting head P1 requests R2, held by P2
        assert_eq!(resolve(&table, &queues, &mut ledger), Some("R2".into()));
        assert_eq!(ledger.owner_of("R2"), None);
        // P2 kept R1 and its cursor
        assert_eq!(ledger.owner_of("R1"), Some(p1));
        assert_eq!(table.get(p2).map(|p| p.cursor()), Some(0));
    }

    #[test]
    fn resolve_refuses_holder_outside_waiting_set() {
        let mut table = ProcessTable::new();
        let mut queues = QueueSet::new();
        let mut ledger = ResourceLedger::new();
        assert!(ledger.insert("R1"));

        let p1 = table.insert("P1".into(), 1, vec![Instruction::request("R1")]);
        let outsider = table.insert("P2".into(), 1, vec![]);
        assert_eq!(ledger.acquire("R1", outsider), Ok(AcquireOutcome::Acquired));
        let _ = queues.admit(p1, QueueId::Waiting);
        let _ = queues.admit(outsider, QueueId::Terminated);

        assert_eq!(resolve(&table, &queues, &mut ledger), None);
        assert_eq!(ledger.owner_of("R1"), Some(outsider));
    }
}
