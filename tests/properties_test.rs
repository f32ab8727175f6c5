/*!
 * Property Tests
 * Structural invariants that must hold for any well-formed trace
 */

use proptest::prelude::*;
use schedsim::{
    Instruction, Policy, ProcessState, RunOutcome, Simulator, SystemImage,
};

const RESOURCES: [&str; 2] = ["R1", "R2"];
const MAILBOXES: [&str; 1] = ["M1"];

fn arb_instruction() -> impl Strategy<Value = Instruction> {
    prop_oneof![
        proptest::sample::select(&RESOURCES[..]).prop_map(|r| Instruction::request(r)),
        proptest::sample::select(&RESOURCES[..]).prop_map(|r| Instruction::release(r)),
        proptest::sample::select(&MAILBOXES[..])
            .prop_map(|mailbox| Instruction::send(mailbox, "token")),
        proptest::sample::select(&MAILBOXES[..]).prop_map(|m| Instruction::receive(m)),
    ]
}

fn arb_trace() -> impl Strategy<Value = Vec<Instruction>> {
    proptest::collection::vec(arb_instruction(), 0..8)
}

fn arb_policy() -> impl Strategy<Value = Policy> {
    prop_oneof![
        (1u32..5).prop_map(Policy::round_robin),
        Just(Policy::Priority),
    ]
}

fn build_image(traces: &[(u8, Vec<Instruction>)]) -> SystemImage {
    let mut builder = SystemImage::builder();
    for name in RESOURCES {
        builder.resource(name);
    }
    for name in MAILBOXES {
        builder.mailbox(name);
    }
    for (index, (priority, trace)) in traces.iter().enumerate() {
        let name = format!("P{index}");
        builder.process(&name, *priority);
        for instruction in trace {
            builder.instruction(&name, instruction.clone());
        }
    }
    builder.build().expect("generated image is well-formed")
}

proptest! {
    /// After any run, every process sits in exactly one terminal bucket and
    /// the buckets partition the pid space.
    #[test]
    fn queues_partition_the_pid_space(
        traces in proptest::collection::vec((0u8..4, arb_trace()), 1..4),
        policy in arb_policy(),
    ) {
        let sim = Simulator::new(build_image(&traces), policy);
        sim.run().expect("well-formed image never errors");

        let mut seen: Vec<u32> = sim.terminated();
        seen.extend(sim.waiting());
        seen.extend(sim.ready());
        seen.extend(sim.current());
        seen.sort_unstable();
        let mut all = sim.pids();
        all.sort_unstable();
        prop_assert_eq!(seen, all);
    }

    /// Free plus held resources always account for every declared resource,
    /// and an instruction cursor never runs past its trace.
    #[test]
    fn resources_are_conserved_and_cursors_bounded(
        traces in proptest::collection::vec((0u8..4, arb_trace()), 1..4),
        policy in arb_policy(),
    ) {
        let sim = Simulator::new(build_image(&traces), policy);
        sim.run().expect("well-formed image never errors");

        let held: usize = sim.pids().iter().map(|&pid| sim.held_by(pid).len()).sum();
        prop_assert_eq!(
            sim.available_resources().len() + held,
            sim.resource_names().len()
        );

        for pid in sim.pids() {
            let info = sim.process_info(pid).expect("pid from table");
            prop_assert_eq!(
                info.executed + info.remaining,
                traces[pid as usize].1.len()
            );
            if info.state == ProcessState::Terminated {
                prop_assert_eq!(info.remaining, 0);
            }
        }
    }

    /// A completed run leaves no process waiting; a blocked run names at
    /// least one waiting process and leaves it with work remaining.
    #[test]
    fn outcome_matches_final_queue_shape(
        traces in proptest::collection::vec((0u8..4, arb_trace()), 1..4),
        policy in arb_policy(),
    ) {
        let sim = Simulator::new(build_image(&traces), policy);
        match sim.run().expect("well-formed image never errors") {
            RunOutcome::Completed => {
                prop_assert!(sim.waiting().is_empty());
                prop_assert_eq!(sim.terminated().len(), traces.len());
            }
            RunOutcome::Blocked { stuck } => {
                prop_assert!(!stuck.is_empty());
                for pid in stuck {
                    let info = sim.process_info(pid).expect("pid from table");
                    prop_assert_eq!(info.state, ProcessState::Waiting);
                    prop_assert!(info.remaining > 0);
                }
            }
        }
    }

    /// Scheduling is deterministic: the same image and policy always produce
    /// the same outcome, finish order, and instruction count.
    #[test]
    fn runs_are_deterministic(
        traces in proptest::collection::vec((0u8..4, arb_trace()), 1..4),
        policy in arb_policy(),
    ) {
        let first = Simulator::new(build_image(&traces), policy);
        let second = Simulator::new(build_image(&traces), policy);
        let first_outcome = first.run().expect("well-formed image never errors");
        let second_outcome = second.run().expect("well-formed image never errors");
        prop_assert_eq!(first_outcome, second_outcome);
        prop_assert_eq!(first.terminated(), second.terminated());
        prop_assert_eq!(
            first.stats().instructions_executed,
            second.stats().instructions_executed
        );
    }
}
