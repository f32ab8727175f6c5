/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::types::Pid;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Runtime simulation errors
///
/// Resource contention and invalid releases are not errors; they are normal
/// control-flow outcomes resolved inside the dispatch step. Only malformed
/// traces that slipped past the loader surface here.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SimError {
    #[error("process {pid} references unknown resource '{resource}'")]
    #[diagnostic(
        code(sim::unknown_resource),
        help("The instruction trace names a resource that was never loaded. Fix the trace file.")
    )]
    UnknownResource { pid: Pid, resource: String },

    #[error("process {pid} references unknown mailbox '{mailbox}'")]
    #[diagnostic(
        code(sim::unknown_mailbox),
        help("The instruction trace names a mailbox that was never loaded. Fix the trace file.")
    )]
    UnknownMailbox { pid: Pid, mailbox: String },

    #[error("process {0} not found in process table")]
    #[diagnostic(
        code(sim::process_not_found),
        help("A queue referenced a pid with no table slot. This is an internal invariant violation.")
    )]
    ProcessNotFound(Pid),
}

/// Trace-file loading errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum LoadError {
    #[error("failed to read trace file: {0}")]
    #[diagnostic(code(load::io), help("Check that the file exists and is readable."))]
    Io(String),

    #[error("parse error at line {line}: {reason}")]
    #[diagnostic(
        code(load::parse),
        help("Expected 'process <name> <priority>', 'resource <name>', 'mailbox <name>', or '<process> req|rel|send|recv ...'.")
    )]
    Parse { line: usize, reason: String },

    #[error("duplicate {kind} name '{name}'")]
    #[diagnostic(
        code(load::duplicate),
        help("Process, resource, and mailbox names must each be unique.")
    )]
    Duplicate { kind: String, name: String },

    #[error("instruction references unknown {kind} '{name}'")]
    #[diagnostic(
        code(load::unknown_name),
        help("Every name used in an instruction must be declared before the run starts.")
    )]
    UnknownName { kind: String, name: String },

    #[error("trace declares no processes")]
    #[diagnostic(code(load::empty), help("At least one process is required to run."))]
    Empty,
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Io(err.to_string())
    }
}
