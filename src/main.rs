/*!
 * schedsim - Main Entry Point
 *
 * Loads a process-list trace file, runs it to completion under the chosen
 * scheduling discipline, and reports the terminal state of the system.
 */

use schedsim::{init_tracing, load_trace_file, Policy, RunOutcome, Simulator};
use std::process::ExitCode;
use tracing::{error, info};

struct Args {
    trace_path: String,
    policy: Policy,
    json: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut trace_path = None;
    let mut policy_word = "round-robin".to_string();
    let mut quantum: u32 = 1;
    let mut json = false;

    let mut positional = 0;
    for arg in std::env::args().skip(1) {
        if arg == "--json" {
            json = true;
            continue;
        }
        match positional {
            0 => trace_path = Some(arg),
            1 => policy_word = arg,
            2 => {
                quantum = arg
                    .parse()
                    .map_err(|_| format!("invalid quantum '{arg}'"))?;
            }
            _ => return Err(format!("unexpected argument '{arg}'")),
        }
        positional += 1;
    }

    let trace_path = trace_path.ok_or_else(|| {
        "usage: schedsim <trace-file> [round-robin|priority] [quantum] [--json]".to_string()
    })?;
    let policy = match policy_word.as_str() {
        "round-robin" | "rr" => Policy::round_robin(quantum),
        "priority" => Policy::Priority,
        other => return Err(format!("unknown policy '{other}'")),
    };
    Ok(Args {
        trace_path,
        policy,
        json,
    })
}

fn report(sim: &Simulator, outcome: &RunOutcome, json: bool) {
    if json {
        let body = serde_json::json!({
            "outcome": outcome,
            "terminated": sim
                .terminated()
                .into_iter()
                .filter_map(|pid| sim.process_info(pid))
                .collect::<Vec<_>>(),
            "waiting": sim.waiting(),
            "mailboxes": sim
                .mailbox_names()
                .into_iter()
                .map(|name| {
                    let pending = sim.mailbox(&name).flatten();
                    serde_json::json!({ "name": name, "pending": pending })
                })
                .collect::<Vec<_>>(),
            "available_resources": sim.available_resources(),
            "stats": sim.stats(),
        });
        println!("{body:#}");
        return;
    }

    println!("terminated (finish order):");
    for pid in sim.terminated() {
        if let Some(info) = sim.process_info(pid) {
            println!("  {} (pid {}, priority {})", info.name, info.pid, info.priority);
        }
    }
    if let RunOutcome::Blocked { stuck } = outcome {
        println!("stuck in waiting:");
        for pid in stuck {
            if let Some(info) = sim.process_info(*pid) {
                println!("  {} (pid {}, {} instruction(s) left)", info.name, info.pid, info.remaining);
            }
        }
    }
    println!("mailboxes:");
    for name in sim.mailbox_names() {
        match sim.mailbox(&name).flatten() {
            Some(message) => println!("  {name}: '{message}'"),
            None => println!("  {name}: (empty)"),
        }
    }
    println!("free resources: {}", sim.available_resources().join(" "));
    let stats = sim.stats();
    println!(
        "stats: {} instruction(s), {} context switch(es), {} preemption(s), {} block(s), {} wakeup(s), {} deadlock(s) resolved, {} invalid release(s), {} sent, {} received",
        stats.instructions_executed,
        stats.context_switches,
        stats.preemptions,
        stats.blocks,
        stats.wakeups,
        stats.deadlocks_resolved,
        stats.invalid_releases,
        stats.messages_sent,
        stats.messages_received,
    );
}

fn main() -> ExitCode {
    init_tracing();

    let args = match parse_args() {
        Ok(args) => args,
        Err(reason) => {
            error!("{reason}");
            return ExitCode::from(2);
        }
    };

    info!(path = %args.trace_path, policy = %args.policy, "loading trace");
    let image = match load_trace_file(&args.trace_path) {
        Ok(image) => image,
        Err(err) => {
            error!("load failed: {err}");
            return ExitCode::from(2);
        }
    };
    info!(
        processes = image.process_count(),
        resources = image.resource_count(),
        mailboxes = image.mailbox_count(),
        "trace loaded"
    );

    let sim = Simulator::new(image, args.policy);
    match sim.run() {
        Ok(outcome) => {
            report(&sim, &outcome, args.json);
            match outcome {
                RunOutcome::Completed => ExitCode::SUCCESS,
                RunOutcome::Blocked { .. } => ExitCode::from(1),
            }
        }
        Err(err) => {
            error!("run failed: {err}");
            ExitCode::from(2)
        }
    }
}
