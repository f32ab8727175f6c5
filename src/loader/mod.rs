/*!
 * Loader
 * Parses process-list trace files and builds the initial system image
 */

use crate::core::errors::LoadError;
use crate::core::types::Priority;
use crate::ipc::mailbox::MailboxSet;
use crate::process::table::ProcessTable;
use crate::process::types::Instruction;
use crate::resource::ledger::ResourceLedger;
use log::{debug, info};
use std::fs;
use std::path::Path;

/// The fully-populated initial collections handed to the scheduler:
/// processes with their instruction traces, a free resource pool, and an
/// empty mailbox set
#[derive(Debug)]
pub struct SystemImage {
    table: ProcessTable,
    ledger: ResourceLedger,
    mailboxes: MailboxSet,
}

impl SystemImage {
    #[must_use]
    pub fn builder() -> SystemImageBuilder {
        SystemImageBuilder::default()
    }

    pub(crate) fn into_parts(self) -> (ProcessTable, ResourceLedger, MailboxSet) {
        (self.table, self.ledger, self.mailboxes)
    }

    #[must_use]
    pub fn process_count(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.ledger.len()
    }

    #[must_use]
    pub fn mailbox_count(&self) -> usize {
        self.mailboxes.len()
    }
}

/// Incremental builder for a [`SystemImage`]
///
/// Declarations are collected in call order and validated at [`build`]:
/// duplicate names are rejected and every instruction reference must
/// resolve to a declared process, resource, or mailbox, so malformed
/// traces fail at load time rather than mid-run.
///
/// [`build`]: SystemImageBuilder::build
#[derive(Debug, Default)]
pub struct SystemImageBuilder {
    processes: Vec<(String, Priority)>,
    instructions: Vec<(String, Instruction)>,
    resources: Vec<String>,
    mailboxes: Vec<String>,
}

impl SystemImageBuilder {
    /// Declare a process; instructions attach by name
    pub fn process(&mut self, name: impl Into<String>, priority: Priority) -> &mut Self {
        self.processes.push((name.into(), priority));
        self
    }

    /// Append an instruction to a declared process's trace
    pub fn instruction(&mut self, process: impl Into<String>, instruction: Instruction) -> &mut Self {
        self.instructions.push((process.into(), instruction));
        self
    }

    /// Declare a resource (initially in the free pool)
    pub fn resource(&mut self, name: impl Into<String>) -> &mut Self {
        self.resources.push(name.into());
        self
    }

    /// Declare a mailbox (initially empty)
    pub fn mailbox(&mut self, name: impl Into<String>) -> &mut Self {
        self.mailboxes.push(name.into());
        self
    }

    /// Validate the declarations and produce the system image
    pub fn build(&mut self) -> Result<SystemImage, LoadError> {
        if self.processes.is_empty() {
            return Err(LoadError::Empty);
        }

        let mut ledger = ResourceLedger::new();
        for name in &self.resources {
            if !ledger.insert(name.clone()) {
                return Err(LoadError::Duplicate {
                    kind: "resource".into(),
                    name: name.clone(),
                });
            }
        }

        let mut mailboxes = MailboxSet::new();
        for name in &self.mailboxes {
            if !mailboxes.insert(name.clone()) {
                return Err(LoadError::Duplicate {
                    kind: "mailbox".into(),
                    name: name.clone(),
                });
            }
        }

        let mut table = ProcessTable::new();
        for (name, priority) in &self.processes {
            if table.pid_of(name).is_some() {
                return Err(LoadError::Duplicate {
                    kind: "process".into(),
                    name: name.clone(),
                });
            }
            let trace: Vec<Instruction> = self
                .instructions
                .iter()
                .filter(|(owner, _)| owner == name)
                .map(|(_, instruction)| instruction.clone())
                .collect();
            for instruction in &trace {
                validate_reference(instruction, &ledger, &mailboxes)?;
            }
            let pid = table.insert(name.clone(), *priority, trace);
            debug!("loaded process {} as pid {}", name, pid);
        }

        // Every instruction must belong to a declared process
        for (owner, _) in &self.instructions {
            if table.pid_of(owner).is_none() {
                return Err(LoadError::UnknownName {
                    kind: "process".into(),
                    name: owner.clone(),
                });
            }
        }

        info!(
            "loaded {} process(es), {} resource(s), {} mailbox(es)",
            table.len(),
            ledger.len(),
            mailboxes.len()
        );
        Ok(SystemImage {
            table,
            ledger,
            mailboxes,
        })
    }
}

fn validate_reference(
    instruction: &Instruction,
    ledger: &ResourceLedger,
    mailboxes: &MailboxSet,
) -> Result<(), LoadError> {
    match instruction {
        Instruction::Request { resource } | Instruction::Release { resource } => {
            if !ledger.contains(resource) {
                return Err(LoadError::UnknownName {
                    kind: "resource".into(),
                    name: resource.clone(),
                });
            }
        }
        Instruction::Send { mailbox, .. } | Instruction::Receive { mailbox } => {
            if !mailboxes.contains(mailbox) {
                return Err(LoadError::UnknownName {
                    kind: "mailbox".into(),
                    name: mailbox.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Parse the line-oriented process-list format
///
/// ```text
/// # declarations
/// process P1 1
/// resource R1
/// mailbox M1
/// # instructions
/// P1 req R1
/// P1 rel R1
/// P1 send M1 message text
/// P1 recv M1
/// ```
pub fn parse_trace(text: &str) -> Result<SystemImage, LoadError> {
    let mut builder = SystemImage::builder();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut fields = trimmed.split_whitespace();
        let head = fields.next().ok_or_else(|| LoadError::Parse {
            line,
            reason: "empty statement".into(),
        })?;
        match head {
            "process" => {
                let name = next_field(&mut fields, line, "process name")?;
                let priority_text = next_field(&mut fields, line, "priority")?;
                let priority: Priority =
                    priority_text.parse().map_err(|_| LoadError::Parse {
                        line,
                        reason: format!("invalid priority '{priority_text}'"),
                    })?;
                builder.process(name, priority);
            }
            "resource" => {
                let name = next_field(&mut fields, line, "resource name")?;
                builder.resource(name);
            }
            "mailbox" => {
                let name = next_field(&mut fields, line, "mailbox name")?;
                builder.mailbox(name);
            }
            process => {
                let op = next_field(&mut fields, line, "instruction")?;
                let target = next_field(&mut fields, line, "target name")?;
                let instruction = match op.as_str() {
                    "req" => Instruction::request(target),
                    "rel" => Instruction::release(target),
                    "send" => {
                        let message: Vec<&str> = fields.by_ref().collect();
                        Instruction::send(target, message.join(" "))
                    }
                    "recv" => Instruction::receive(target),
                    other => {
                        return Err(LoadError::Parse {
                            line,
                            reason: format!("unknown instruction '{other}'"),
                        })
                    }
                };
                builder.instruction(process, instruction);
            }
        }
        if let Some(extra) = fields.next() {
            return Err(LoadError::Parse {
                line,
                reason: format!("trailing tokens starting at '{extra}'"),
            });
        }
    }
    builder.build()
}

/// Load and parse a process-list file
pub fn load_trace_file(path: impl AsRef<Path>) -> Result<SystemImage, LoadError> {
    let text = fs::read_to_string(path)?;
    parse_trace(&text)
}

fn next_field<'a>(
    fields: &mut impl Iterator<Item = &'a str>,
    line: usize,
    what: &str,
) -> Result<String, LoadError> {
    fields
        .next()
        .map(str::to_string)
        .ok_or_else(|| LoadError::Parse {
            line,
            reason: format!("missing {what}"),
        })
}
