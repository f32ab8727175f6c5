/*!
 * Loader Tests
 * Trace-file parsing and end-to-end runs from files on disk
 */

use pretty_assertions::assert_eq;
use schedsim::{load_trace_file, LoadError, Policy, RunOutcome, Simulator};
use std::io::Write;
use tempfile::NamedTempFile;

fn trace_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write trace");
    file
}

#[test]
fn loads_a_trace_file_from_disk() {
    let file = trace_file(
        "# two workers sharing a printer\n\
         process writer 1\n\
         process reader 2\n\
         resource printer\n\
         mailbox inbox\n\
         writer req printer\n\
         writer send inbox draft ready\n\
         writer rel printer\n\
         reader recv inbox\n",
    );
    let image = load_trace_file(file.path()).expect("valid file");
    assert_eq!(image.process_count(), 2);
    assert_eq!(image.resource_count(), 1);
    assert_eq!(image.mailbox_count(), 1);
}

#[test]
fn missing_file_reports_io_error() {
    let err = load_trace_file("/nonexistent/process.list").unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

#[test]
fn parse_errors_carry_the_offending_line() {
    let file = trace_file("process P1 1\nresource R1\nP1 req\n");
    let err = load_trace_file(file.path()).unwrap_err();
    assert!(matches!(err, LoadError::Parse { line: 3, .. }));
}

#[test]
fn loaded_image_runs_to_completion() {
    let file = trace_file(
        "process writer 1\n\
         process reader 1\n\
         resource printer\n\
         mailbox inbox\n\
         writer req printer\n\
         writer send inbox draft ready\n\
         writer rel printer\n\
         reader recv inbox\n",
    );
    let image = load_trace_file(file.path()).expect("valid file");
    let sim = Simulator::new(image, Policy::round_robin(2));
    assert_eq!(sim.run().unwrap(), RunOutcome::Completed);
    assert_eq!(sim.terminated().len(), 2);
    assert_eq!(sim.stats().messages_sent, 1);
    // Message content survives the trip through the parser with its spaces
    assert_eq!(sim.stats().messages_received, 1);
}

#[test]
fn bundled_sample_trace_loads_and_completes() {
    let image = load_trace_file("data/process.list").expect("sample trace");
    let sim = Simulator::new(image, Policy::round_robin(3));
    assert_eq!(sim.run().unwrap(), RunOutcome::Completed);
}
