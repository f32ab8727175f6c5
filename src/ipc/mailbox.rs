/*!
 * Mailbox Exchange
 * Single-slot named message stores for send/receive instructions
 */

use crate::core::errors::SimError;
use crate::core::types::{Pid, SimResult};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// A named mailbox holding at most one pending message
///
/// A send overwrites the pending slot; a second send before any receive
/// silently replaces the first. This is the documented exchange semantics,
/// not a queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mailbox {
    name: String,
    slot: Option<String>,
}

impl Mailbox {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn pending(&self) -> Option<&str> {
        self.slot.as_deref()
    }
}

/// The set of mailboxes created at load time
///
/// Lookups are linear scans by name; mailboxes are never created or
/// destroyed mid-run, only mutated in place.
#[derive(Debug, Clone, Default)]
pub struct MailboxSet {
    boxes: Vec<Mailbox>,
}

impl MailboxSet {
    #[must_use]
    pub fn new() -> Self {
        Self { boxes: Vec::new() }
    }

    /// Register a mailbox; false if the name is taken
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.find(&name).is_some() {
            return false;
        }
        self.boxes.push(Mailbox { name, slot: None });
        true
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.boxes.iter().position(|m| m.name == name)
    }

    /// Overwrite the pending slot of the named mailbox
    pub fn send(&mut self, name: &str, message: String, pid: Pid) -> SimResult<()> {
        let slot = self.find(name).ok_or_else(|| SimError::UnknownMailbox {
            pid,
            mailbox: name.to_string(),
        })?;
        let mailbox = &mut self.boxes[slot];
        if let Some(dropped) = mailbox.slot.replace(message) {
            warn!(
                "mailbox {}: pending message '{}' overwritten before any receive",
                name, dropped
            );
        }
        debug!("process {} sent message to mailbox {}", pid, name);
        Ok(())
    }

    /// Drain and clear the pending slot; empty mailboxes yield `None` immediately
    pub fn receive(&mut self, name: &str, pid: Pid) -> SimResult<Option<String>> {
        let slot = self.find(name).ok_or_else(|| SimError::UnknownMailbox {
            pid,
            mailbox: name.to_string(),
        })?;
        let message = self.boxes[slot].slot.take();
        debug!(
            "process {} received from mailbox {}: {:?}",
            pid, name, message
        );
        Ok(message)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Pending message of a mailbox without draining it
    #[must_use]
    pub fn peek(&self, name: &str) -> Option<Option<&str>> {
        self.find(name).map(|slot| self.boxes[slot].pending())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mailbox> {
        self.boxes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}
