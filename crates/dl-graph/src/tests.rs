//! Unit tests for dl-graph.

use dl_core::{Priority, ProcessId, ResourceId};

use crate::AllocationGraph;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Two processes, one single-instance resource and one 3-instance resource.
fn small_graph() -> (AllocationGraph, [ProcessId; 2], [ResourceId; 2]) {
    let mut g = AllocationGraph::new();
    let p1 = g.spawn_process("P1", Priority::Medium, 4);
    let p2 = g.spawn_process("P2", Priority::High, 2);
    let r1 = g.add_resource("R1", 1).unwrap();
    let r2 = g.add_resource("R2", 3).unwrap();
    (g, [p1, p2], [r1, r2])
}

// ── Construction ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod construction {
    use super::*;
    use crate::GraphError;
    use dl_core::CoreError;

    #[test]
    fn ids_are_dense_and_ordered() {
        let (g, [p1, p2], [r1, r2]) = small_graph();
        assert_eq!((p1, p2), (ProcessId(0), ProcessId(1)));
        assert_eq!((r1, r2), (ResourceId(0), ResourceId(1)));
        assert_eq!(g.process(p2).unwrap().name, "P2");
        assert_eq!(g.resource(r2).unwrap().total, 3);
    }

    #[test]
    fn zero_instance_resource_rejected() {
        let mut g = AllocationGraph::new();
        assert_eq!(g.add_resource("R0", 0), Err(GraphError::Core(CoreError::ZeroCount)));
        assert!(g.resources().is_empty());
    }

    #[test]
    fn unknown_ids_are_errors() {
        let (mut g, [p1, _], _) = small_graph();
        assert!(matches!(
            g.allocate(p1, ResourceId(9), 1),
            Err(GraphError::Core(CoreError::ResourceNotFound(ResourceId(9))))
        ));
        assert!(matches!(
            g.request(ProcessId(9), ResourceId(0), 1),
            Err(GraphError::Core(CoreError::ProcessNotFound(ProcessId(9))))
        ));
    }
}

// ── allocate ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod allocate {
    use super::*;
    use crate::GraphError;

    #[test]
    fn grants_when_free() {
        let (mut g, [p1, _], [_, r2]) = small_graph();
        let grant = g.allocate(p1, r2, 2).unwrap();
        assert_eq!(grant.count, 2);
        assert_eq!(g.held(p1, r2), 2);
        assert_eq!(g.available(r2).unwrap(), 1);
    }

    #[test]
    fn insufficient_stock_leaves_graph_unchanged() {
        let (mut g, [p1, p2], [r1, _]) = small_graph();
        g.allocate(p1, r1, 1).unwrap();
        let before = g.clone();
        let err = g.allocate(p2, r1, 1).unwrap_err();
        assert_eq!(
            err,
            GraphError::InsufficientResource { process: p2, resource: r1, requested: 1, available: 0 }
        );
        assert_eq!(g, before);
    }

    #[test]
    fn more_than_total_never_partially_granted() {
        let (mut g, [p1, _], [_, r2]) = small_graph();
        let err = g.allocate(p1, r2, 4).unwrap_err();
        assert!(matches!(err, GraphError::InsufficientResource { requested: 4, available: 3, .. }));
        assert_eq!(g.held(p1, r2), 0);
        assert_eq!(g.available(r2).unwrap(), 3);
    }

    #[test]
    fn zero_count_rejected() {
        let (mut g, [p1, _], [r1, _]) = small_graph();
        assert!(g.allocate(p1, r1, 0).is_err());
    }
}

// ── request ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod request {
    use super::*;
    use crate::GraphError;

    #[test]
    fn records_intent_without_touching_stock() {
        let (mut g, [p1, _], [_, r2]) = small_graph();
        g.request(p1, r2, 2).unwrap();
        assert_eq!(g.requested(p1, r2), 2);
        assert_eq!(g.available(r2).unwrap(), 3);
        assert!(g.is_waiting(p1));
    }

    #[test]
    fn repeated_request_keeps_fifo_position() {
        let (mut g, [p1, p2], [_, r2]) = small_graph();
        g.request(p1, r2, 1).unwrap();
        g.request(p2, r2, 1).unwrap();
        g.request(p1, r2, 1).unwrap();
        let order: Vec<_> = g.pending().iter().map(|r| (r.process, r.count)).collect();
        assert_eq!(order, vec![(p1, 2), (p2, 1)]);
    }

    #[test]
    fn claim_beyond_total_rejected() {
        let (mut g, [p1, _], [_, r2]) = small_graph();
        g.allocate(p1, r2, 2).unwrap();
        let err = g.request(p1, r2, 2).unwrap_err();
        assert_eq!(
            err,
            GraphError::ExceedsCapacity { process: p1, resource: r2, claimed: 4, total: 3 }
        );
        assert_eq!(g.requested(p1, r2), 0);
    }
}

// ── release ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod release {
    use super::*;
    use crate::{Grant, GraphError};

    #[test]
    fn over_release_is_rejected_without_mutation() {
        let (mut g, [p1, p2], [r1, _]) = small_graph();
        g.allocate(p1, r1, 1).unwrap();
        let before = g.clone();
        assert!(matches!(
            g.release(p2, r1, 1),
            Err(GraphError::OverRelease { held: 0, requested: 1, .. })
        ));
        assert!(matches!(
            g.release(p1, r1, 2),
            Err(GraphError::OverRelease { held: 1, requested: 2, .. })
        ));
        assert_eq!(g, before);
    }

    #[test]
    fn release_then_grant_waiting_process() {
        let (mut g, [p1, p2], [r1, _]) = small_graph();
        g.allocate(p1, r1, 1).unwrap();
        g.request(p2, r1, 1).unwrap();

        let grants = g.release(p1, r1, 1).unwrap();
        assert_eq!(grants, vec![Grant { process: p2, resource: r1, count: 1 }]);
        assert_eq!(g.held(p2, r1), 1);
        assert!(!g.is_waiting(p2));
        assert_eq!(g.available(r1).unwrap(), 0);
    }

    #[test]
    fn regrant_is_fifo_not_priority() {
        let mut g = AllocationGraph::new();
        let holder = g.spawn_process("H", Priority::Low, 1);
        let low = g.spawn_process("L", Priority::Low, 1);
        let critical = g.spawn_process("C", Priority::Critical, 1);
        let r = g.add_resource("R", 1).unwrap();
        g.allocate(holder, r, 1).unwrap();
        g.request(low, r, 1).unwrap();
        g.request(critical, r, 1).unwrap();

        let grants = g.release(holder, r, 1).unwrap();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].process, low);
        assert!(g.is_waiting(critical));
    }

    #[test]
    fn only_fully_satisfiable_requests_are_granted() {
        let (mut g, [p1, p2], [_, r2]) = small_graph();
        let p3 = g.spawn_process("P3", Priority::Low, 1);
        g.allocate(p1, r2, 3).unwrap();
        g.request(p2, r2, 3).unwrap();
        g.request(p3, r2, 1).unwrap();

        // One instance freed: P2 (first in line) needs 3, P3 needs 1.
        let grants = g.release(p1, r2, 1).unwrap();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].process, p3);
        assert_eq!(g.requested(p2, r2), 3);
        assert_eq!(g.held(p2, r2), 0);
    }
}

// ── terminate ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod terminate {
    use super::*;
    use dl_core::ProcessState;

    #[test]
    fn terminate_frees_holdings_and_drops_requests() {
        let (mut g, [p1, p2], [r1, r2]) = small_graph();
        g.allocate(p1, r1, 1).unwrap();
        g.request(p1, r2, 1).unwrap();
        g.request(p2, r1, 1).unwrap();

        let grants = g.terminate(p1).unwrap();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].process, p2);
        assert_eq!(g.process(p1).unwrap().state, ProcessState::Finished);
        assert!(!g.is_waiting(p1));
        assert_eq!(g.holdings_of(p1).count(), 0);
        g.check_invariants().unwrap();
    }

    #[test]
    fn finished_process_cannot_act() {
        let (mut g, [p1, _], [r1, _]) = small_graph();
        g.terminate(p1).unwrap();
        assert!(g.allocate(p1, r1, 1).is_err());
        assert!(g.terminate(p1).is_err());
    }
}

// ── Edges ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod edges {
    use super::*;
    use crate::{Edge, EdgeKind};
    use dl_core::NodeRef;

    #[test]
    fn edges_of_process_are_its_requests() {
        let (mut g, [p1, p2], [r1, r2]) = small_graph();
        g.allocate(p2, r1, 1).unwrap();
        g.request(p1, r1, 1).unwrap();
        g.request(p2, r2, 1).unwrap();
        g.request(p1, r2, 2).unwrap();

        let out: Vec<Edge> = g.edges_of(NodeRef::Process(p1)).collect();
        assert_eq!(out, vec![Edge::requested(p1, r1, 1), Edge::requested(p1, r2, 2)]);
    }

    #[test]
    fn edges_of_resource_are_its_holders() {
        let (mut g, [p1, p2], [_, r2]) = small_graph();
        g.allocate(p2, r2, 1).unwrap();
        g.allocate(p1, r2, 2).unwrap();

        let out: Vec<Edge> = g.edges_of(NodeRef::Resource(r2)).collect();
        assert_eq!(out, vec![Edge::held(r2, p2, 1), Edge::held(r2, p1, 2)]);
        assert!(out.iter().all(|e| e.kind == EdgeKind::Held));
    }

    #[test]
    fn edges_of_is_restartable() {
        let (mut g, [p1, _], [r1, _]) = small_graph();
        g.allocate(p1, r1, 1).unwrap();
        let it = g.edges_of(NodeRef::Resource(r1));
        assert_eq!(it.clone().count(), 1);
        assert_eq!(it.count(), 1);
        assert_eq!(g.edges_of(NodeRef::Resource(r1)).count(), 1);
    }

    #[test]
    fn unknown_node_has_no_edges() {
        let (g, _, _) = small_graph();
        assert_eq!(g.edges_of(NodeRef::Process(ProcessId(99))).count(), 0);
        assert_eq!(g.edges_of(NodeRef::Resource(ResourceId(99))).count(), 0);
    }

    #[test]
    fn all_edges_held_first() {
        let (mut g, [p1, p2], [r1, _]) = small_graph();
        g.allocate(p1, r1, 1).unwrap();
        g.request(p2, r1, 1).unwrap();
        let kinds: Vec<EdgeKind> = g.edges().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EdgeKind::Held, EdgeKind::Requested]);
        let e = g.edges().last().unwrap();
        assert_eq!((e.process(), e.resource()), (p2, r1));
    }
}
