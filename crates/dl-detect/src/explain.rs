//! Human-readable deadlock reports.
//!
//! The report walks the cycle process by process, then checks the four
//! necessary conditions for deadlock against the current graph and suggests
//! how the scenario could have avoided the cycle.

use std::fmt::Write;

use dl_core::{NodeRef, ProcessId};
use dl_graph::AllocationGraph;

use crate::Detection;

/// `"P1 → R2 → P2 → R1 → P1"`, using display names.
///
/// Returns an empty string for an empty cycle.
pub fn describe_cycle(graph: &AllocationGraph, cycle: &[NodeRef]) -> String {
    let Some(&first) = cycle.first() else {
        return String::new();
    };
    cycle
        .iter()
        .chain(std::iter::once(&first))
        .map(|&node| name_of(graph, node))
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Multi-line explanation of `detection`.
///
/// For a deadlock-free graph this is a single line saying so.
pub fn explain(graph: &AllocationGraph, detection: &Detection) -> String {
    if !detection.is_deadlocked {
        return "No circular wait: every waiting process can eventually be served.".to_owned();
    }

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, graph, detection);
    out
}

fn write_report(out: &mut String, graph: &AllocationGraph, detection: &Detection) -> std::fmt::Result {
    let cycle_str = describe_cycle(graph, &detection.cycle);
    writeln!(out, "Deadlock detected: circular wait {cycle_str}")?;
    writeln!(out)?;
    writeln!(out, "Each process holds a resource the next one needs:")?;

    let pairs: Vec<(ProcessId, NodeRef)> = detection
        .cycle
        .chunks_exact(2)
        .filter_map(|pair| Some((pair[0].as_process()?, pair[1])))
        .collect();

    for (i, &(process, wanted)) in pairs.iter().enumerate() {
        let next = pairs[(i + 1) % pairs.len()].0;
        let Ok(p) = graph.process(process) else { continue };

        let holds: Vec<String> = graph
            .holdings_of(process)
            .map(|(r, n)| format!("{}({n})", name_of(graph, NodeRef::Resource(r))))
            .collect();
        let holds = if holds.is_empty() { "nothing".to_owned() } else { holds.join(", ") };

        writeln!(out)?;
        writeln!(out, "  {} [priority {}, {}]", p.name, p.priority, p.state)?;
        writeln!(out, "    holds: {holds}")?;
        writeln!(
            out,
            "    waits: {} (held by {})",
            name_of(graph, wanted),
            name_of(graph, NodeRef::Process(next)),
        )?;
    }

    // ── The four necessary conditions ─────────────────────────────────────
    let mutual_exclusion = pairs.iter().all(|&(process, wanted)| match wanted {
        NodeRef::Resource(r) => graph.available(r).is_ok_and(|free| free < graph.requested(process, r)),
        NodeRef::Process(_) => false,
    });
    let hold_and_wait = detection
        .processes()
        .all(|p| graph.holdings_of(p).next().is_some() && graph.is_waiting(p));

    writeln!(out)?;
    writeln!(out, "Necessary conditions:")?;
    writeln!(out, "  1. mutual exclusion: {}", mark(mutual_exclusion))?;
    writeln!(out, "     no resource on the cycle has enough free instances for its waiter")?;
    writeln!(out, "  2. hold and wait:    {}", mark(hold_and_wait))?;
    writeln!(out, "     every process on the cycle holds something while it waits")?;
    writeln!(out, "  3. no preemption:    {}", mark(true))?;
    writeln!(out, "     resources are only returned by the process holding them")?;
    writeln!(out, "  4. circular wait:    {}", mark(true))?;
    writeln!(out, "     {cycle_str}")?;

    // ── Remedies ──────────────────────────────────────────────────────────
    let first = pairs
        .first()
        .map_or("a process", |&(p, _)| name_of(graph, NodeRef::Process(p)));
    writeln!(out)?;
    writeln!(out, "Ways out:")?;
    writeln!(out, "  - release (or terminate) what {first} holds to break the cycle")?;
    writeln!(out, "  - add instances to the resources on the cycle")?;
    writeln!(out, "  - have every process request resources in one global order")?;
    Ok(())
}

fn mark(holds: bool) -> &'static str {
    if holds { "yes" } else { "no" }
}

fn name_of(graph: &AllocationGraph, node: NodeRef) -> &str {
    match node {
        NodeRef::Process(p) => graph.process(p).map_or("?", |p| p.name.as_str()),
        NodeRef::Resource(r) => graph.resource(r).map_or("?", |r| r.name.as_str()),
    }
}
