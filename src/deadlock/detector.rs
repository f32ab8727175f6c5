/*!
 * Deadlock Detector
 * Classifies the waiting set via wait-for chain reachability
 */

use crate::core::types::Pid;
use crate::process::queues::{QueueId, QueueSet};
use crate::process::table::ProcessTable;
use crate::process::types::Instruction;
use crate::resource::ledger::ResourceLedger;
use ahash::{AHashMap, AHashSet};
use log::debug;
use serde::{Deserialize, Serialize};

/// Classification of the waiting set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// Every waiting process participates in a completed wait-for cycle
    Deadlock,
    /// At least one waiting process depends on a holder outside the waiting
    /// set; no recovery can be made from inside it
    Blocked { stuck: Vec<Pid> },
    /// Nothing to classify (spurious invocation)
    Clear,
}

/// Resource name the process is blocked requesting, if any
pub(crate) fn waits_for(table: &ProcessTable, pid: Pid) -> Option<String> {
    match table.get(pid)?.next_instruction()? {
        Instruction::Request { resource } => Some(resource.clone()),
        _ => None,
    }
}

/// Run deadlock detection over the waiting queue
///
/// Only meaningful when the ready queue is empty, the waiting queue is
/// non-empty, and no process is executing; any other state yields `Clear`.
///
/// For each waiting process the successor is the waiting process holding the
/// resource it requests, or none when that resource is held outside the
/// waiting set (or free). Each origin's chain is walked with a visited set,
/// bounded by the waiting population: a chain that exits the waiting set
/// marks its origin blocked, a chain that closes on itself marks every
/// visited process as cycle-linked.
pub fn detect(table: &ProcessTable, queues: &QueueSet, ledger: &ResourceLedger) -> Verdict {
    let waiting = queues.snapshot(QueueId::Waiting);
    if waiting.is_empty() || queues.current().is_some() {
        return Verdict::Clear;
    }

    debug!("deadlock check over {} waiting process(es)", waiting.len());

    let index: AHashMap<Pid, usize> = waiting
        .iter()
        .enumerate()
        .map(|(i, &pid)| (pid, i))
        .collect();

    // successor[i] = waiting-queue index of the holder of what i waits for
    let successor: Vec<Option<usize>> = waiting
        .iter()
        .map(|&pid| {
            let resource = waits_for(table, pid)?;
            let holder = ledger.owner_of(&resource)?;
            index.get(&holder).copied()
        })
        .collect();

    let mut blocked: Vec<Pid> = Vec::new();
    let mut linked: AHashSet<usize> = AHashSet::new();

    for origin in 0..waiting.len() {
        let mut visited: AHashSet<usize> = AHashSet::new();
        let mut at = origin;
        loop {
            match successor[at] {
                None => {
                    // Dependency resolves outside the waiting set
                    blocked.push(waiting[origin]);
                    break;
                }
                Some(next) => {
                    if !visited.insert(at) {
                        // Chain completed a cycle; everyone on it is linked
                        linked.extend(visited.iter().copied());
                        break;
                    }
                    at = next;
                }
            }
        }
    }

    if !blocked.is_empty() {
        return Verdict::Blocked { stuck: blocked };
    }
    if linked.len() == waiting.len() {
        return Verdict::Deadlock;
    }
    Verdict::Clear
}
