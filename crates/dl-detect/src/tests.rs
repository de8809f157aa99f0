//! Unit tests for dl-detect.

use dl_core::{NodeRef, Priority, ProcessId, ResourceId};
use dl_graph::AllocationGraph;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn p(i: u32) -> NodeRef {
    NodeRef::Process(ProcessId(i))
}

fn r(i: u32) -> NodeRef {
    NodeRef::Resource(ResourceId(i))
}

/// `n` processes P1..Pn and `n` single-instance resources R1..Rn.
fn graph_with(n: u32) -> AllocationGraph {
    let mut g = AllocationGraph::new();
    for i in 1..=n {
        g.spawn_process(format!("P{i}"), Priority::Medium, 1);
    }
    for i in 1..=n {
        g.add_resource(format!("R{i}"), 1).unwrap();
    }
    g
}

/// P_i holds R_i and requests R_{i+1}, wrapping: an n-process ring.
fn ring(n: u32) -> AllocationGraph {
    let mut g = graph_with(n);
    for i in 0..n {
        g.allocate(ProcessId(i), ResourceId(i), 1).unwrap();
    }
    for i in 0..n {
        g.request(ProcessId(i), ResourceId((i + 1) % n), 1).unwrap();
    }
    g
}

/// A and B each hold one of R's instances, C holds S; A and B want S, C
/// wants `c_wants` of R.  R has `r_total` instances.
fn shared_pool(r_total: u32, c_wants: u32) -> AllocationGraph {
    let mut g = AllocationGraph::new();
    let a = g.spawn_process("A", Priority::Low, 1);
    let b = g.spawn_process("B", Priority::Low, 1);
    let c = g.spawn_process("C", Priority::Low, 1);
    let res = g.add_resource("R", r_total).unwrap();
    let s = g.add_resource("S", 1).unwrap();
    g.allocate(a, res, 1).unwrap();
    g.allocate(b, res, 1).unwrap();
    g.allocate(c, s, 1).unwrap();
    g.request(a, s, 1).unwrap();
    g.request(b, s, 1).unwrap();
    g.request(c, res, c_wants).unwrap();
    g
}

// ── Wait-for graph ────────────────────────────────────────────────────────────

#[cfg(test)]
mod wait_for {
    use super::*;
    use crate::{WaitEdge, WaitForGraph};

    #[test]
    fn waiter_points_at_holder() {
        let mut g = graph_with(2);
        g.allocate(ProcessId(0), ResourceId(0), 1).unwrap();
        g.request(ProcessId(1), ResourceId(0), 1).unwrap();

        let wfg = WaitForGraph::build(&g);
        let edges: Vec<WaitEdge> = wfg.edges().collect();
        assert_eq!(
            edges,
            vec![WaitEdge { waiter: ProcessId(1), holder: ProcessId(0), resource: ResourceId(0) }]
        );
    }

    #[test]
    fn satisfiable_request_adds_no_edge() {
        let mut g = AllocationGraph::new();
        let a = g.spawn_process("A", Priority::Low, 1);
        let b = g.spawn_process("B", Priority::Low, 1);
        let res = g.add_resource("R", 2).unwrap();
        g.allocate(a, res, 1).unwrap();
        // One instance is still free, so B is not really waiting on A.
        g.request(b, res, 1).unwrap();
        assert!(WaitForGraph::build(&g).is_empty());
    }

    #[test]
    fn multi_instance_resource_links_every_holder() {
        let mut g = AllocationGraph::new();
        let a = g.spawn_process("A", Priority::Low, 1);
        let b = g.spawn_process("B", Priority::Low, 1);
        let c = g.spawn_process("C", Priority::Low, 1);
        let res = g.add_resource("R", 2).unwrap();
        g.allocate(a, res, 1).unwrap();
        g.allocate(b, res, 1).unwrap();
        g.request(c, res, 1).unwrap();

        let wfg = WaitForGraph::build(&g);
        let holders: Vec<ProcessId> = wfg.successors(c).iter().map(|&(h, _)| h).collect();
        assert_eq!(holders, vec![a, b]);
    }
}

// ── Detection ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod detection {
    use super::*;
    use crate::detect;

    #[test]
    fn two_process_cycle() {
        // P1 holds R1 and requests R2; P2 holds R2 and requests R1.
        let d = detect(&ring(2));
        assert!(d.is_deadlocked);
        assert_eq!(d.cycle, vec![p(0), r(1), p(1), r(0)]);
    }

    #[test]
    fn three_process_cycle() {
        let d = detect(&ring(3));
        assert!(d.is_deadlocked);
        assert_eq!(d.cycle, vec![p(0), r(1), p(1), r(2), p(2), r(0)]);
        assert_eq!(d.processes().count(), 3);
        assert_eq!(d.resources().count(), 3);
    }

    #[test]
    fn chain_without_cycle() {
        // P1 holds R1, P2 requests R1 only.
        let mut g = graph_with(2);
        g.allocate(ProcessId(0), ResourceId(0), 1).unwrap();
        g.request(ProcessId(1), ResourceId(0), 1).unwrap();
        let d = detect(&g);
        assert!(!d.is_deadlocked);
        assert!(d.cycle.is_empty());
    }

    #[test]
    fn cycle_not_reachable_from_first_root() {
        // P1 waits on P2 (a dead end); P3 and P4 form the cycle.
        let mut g = graph_with(4);
        g.allocate(ProcessId(1), ResourceId(0), 1).unwrap();
        g.request(ProcessId(0), ResourceId(0), 1).unwrap();
        g.allocate(ProcessId(2), ResourceId(2), 1).unwrap();
        g.allocate(ProcessId(3), ResourceId(3), 1).unwrap();
        g.request(ProcessId(2), ResourceId(3), 1).unwrap();
        g.request(ProcessId(3), ResourceId(2), 1).unwrap();

        let d = detect(&g);
        assert!(d.is_deadlocked);
        assert_eq!(d.cycle, vec![p(2), r(3), p(3), r(2)]);
    }

    #[test]
    fn cycle_reported_from_back_edge_target() {
        // P1 → P2 → P3 → P2: P1 is on the path but not on the cycle.
        let mut g = graph_with(3);
        g.allocate(ProcessId(1), ResourceId(1), 1).unwrap();
        g.allocate(ProcessId(2), ResourceId(2), 1).unwrap();
        g.request(ProcessId(0), ResourceId(1), 1).unwrap();
        g.request(ProcessId(1), ResourceId(2), 1).unwrap();
        g.request(ProcessId(2), ResourceId(1), 1).unwrap();

        let d = detect(&g);
        assert_eq!(d.cycle, vec![p(1), r(2), p(2), r(1)]);
    }

    #[test]
    fn holder_outside_the_cycle_can_still_free_the_waiter() {
        // R1 has two instances held by P1 and P3; P1 and P2 wait on each
        // other, but P3 is not waiting and will hand back its R1.
        let mut g = AllocationGraph::new();
        let p1 = g.spawn_process("P1", Priority::Medium, 1);
        let p2 = g.spawn_process("P2", Priority::Medium, 1);
        let p3 = g.spawn_process("P3", Priority::Medium, 1);
        let r1 = g.add_resource("R1", 2).unwrap();
        let r2 = g.add_resource("R2", 1).unwrap();
        g.allocate(p1, r1, 1).unwrap();
        g.allocate(p3, r1, 1).unwrap();
        g.allocate(p2, r2, 1).unwrap();
        g.request(p1, r2, 1).unwrap();
        g.request(p2, r1, 1).unwrap();

        let d = detect(&g);
        assert!(!d.is_deadlocked);
        assert!(d.cycle.is_empty());
    }

    #[test]
    fn multi_instance_deadlock_is_still_found() {
        let d = detect(&shared_pool(2, 1));
        assert!(d.is_deadlocked);
        assert_eq!(d.cycle, vec![p(0), r(1), p(2), r(0)]);
    }

    #[test]
    fn free_instances_short_of_the_request_still_deadlock() {
        // One R instance is free but C needs two.
        let d = detect(&shared_pool(3, 2));
        assert!(d.is_deadlocked);
        assert_eq!(d.cycle, vec![p(0), r(1), p(2), r(0)]);
    }

    #[test]
    fn detection_is_deterministic_and_read_only() {
        let g = ring(3);
        let before = g.clone();
        let first = detect(&g);
        let second = detect(&g);
        assert_eq!(first, second);
        assert_eq!(g, before);
    }

    #[test]
    fn release_breaks_the_cycle() {
        let mut g = ring(2);
        // P2 gives up R2: P1's request is granted, P2 is no longer waited on.
        g.release(ProcessId(1), ResourceId(1), 1).unwrap();
        assert!(!detect(&g).is_deadlocked);
    }
}

// ── Reduction ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod reduce {
    use super::*;
    use crate::stuck_processes;

    #[test]
    fn ring_leaves_everyone_stuck() {
        assert_eq!(stuck_processes(&ring(3)), vec![ProcessId(0), ProcessId(1), ProcessId(2)]);
    }

    #[test]
    fn waiter_on_a_finishing_holder_is_not_stuck() {
        let mut g = graph_with(2);
        g.allocate(ProcessId(0), ResourceId(0), 1).unwrap();
        g.request(ProcessId(1), ResourceId(0), 1).unwrap();
        assert!(stuck_processes(&g).is_empty());
    }

    #[test]
    fn process_waiting_on_a_ring_is_stuck_too() {
        // P3 waits for R1 inside the P1/P2 ring but is not on it.
        let mut g = ring(2);
        g.spawn_process("P3", Priority::Low, 1);
        g.request(ProcessId(2), ResourceId(0), 1).unwrap();
        assert_eq!(stuck_processes(&g), vec![ProcessId(0), ProcessId(1), ProcessId(2)]);
        assert_eq!(crate::detect(&g).cycle, vec![p(0), r(1), p(1), r(0)]);
    }

    #[test]
    fn finished_processes_are_never_stuck() {
        let mut g = ring(2);
        g.terminate(ProcessId(1)).unwrap();
        assert!(stuck_processes(&g).is_empty());
    }
}

// ── Explanations ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod explain {
    use super::*;
    use crate::{Detection, describe_cycle, detect, explain};

    #[test]
    fn cycle_description_wraps_around() {
        let g = ring(2);
        let d = detect(&g);
        assert_eq!(describe_cycle(&g, &d.cycle), "P1 → R2 → P2 → R1 → P1");
        assert_eq!(describe_cycle(&g, &[]), "");
    }

    #[test]
    fn report_names_holdings_and_conditions() {
        let g = ring(2);
        let text = explain(&g, &detect(&g));
        assert!(text.contains("circular wait P1 → R2 → P2 → R1 → P1"));
        assert!(text.contains("holds: R1(1)"));
        assert!(text.contains("waits: R2 (held by P2)"));
        assert!(text.contains("1. mutual exclusion: yes"));
        assert!(text.contains("2. hold and wait:    yes"));
        assert!(text.contains("release (or terminate) what P1 holds"));
    }

    #[test]
    fn mutual_exclusion_counts_against_the_waiters_need() {
        // One R instance is free, but C is waiting for two.
        let g = shared_pool(3, 2);
        let text = explain(&g, &detect(&g));
        assert!(text.contains("1. mutual exclusion: yes"));
    }

    #[test]
    fn no_deadlock_report_is_one_line() {
        let g = graph_with(1);
        let text = explain(&g, &Detection::none());
        assert_eq!(text.lines().count(), 1);
    }
}
