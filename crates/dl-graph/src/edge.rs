//! Edge values and the lazy per-node edge iterator.

use std::slice;

use dl_core::{Holding, NodeRef, ProcessId, ResourceId};

use crate::PendingRequest;

/// Direction/meaning of an allocation-graph edge.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EdgeKind {
    /// Resource → process: the process holds `count` instances.
    Held,
    /// Process → resource: the process is waiting for `count` instances.
    Requested,
}

/// One directed edge of the allocation graph.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub kind:  EdgeKind,
    pub from:  NodeRef,
    pub to:    NodeRef,
    pub count: u32,
}

impl Edge {
    pub fn held(resource: ResourceId, process: ProcessId, count: u32) -> Self {
        Self {
            kind: EdgeKind::Held,
            from: NodeRef::Resource(resource),
            to:   NodeRef::Process(process),
            count,
        }
    }

    pub fn requested(process: ProcessId, resource: ResourceId, count: u32) -> Self {
        Self {
            kind: EdgeKind::Requested,
            from: NodeRef::Process(process),
            to:   NodeRef::Resource(resource),
            count,
        }
    }

    /// The process end of the edge, whichever direction it points.
    pub fn process(&self) -> ProcessId {
        match (self.from, self.to) {
            (NodeRef::Process(p), _) | (_, NodeRef::Process(p)) => p,
            _ => unreachable!("allocation edges always join a process and a resource"),
        }
    }

    /// The resource end of the edge, whichever direction it points.
    pub fn resource(&self) -> ResourceId {
        match (self.from, self.to) {
            (NodeRef::Resource(r), _) | (_, NodeRef::Resource(r)) => r,
            _ => unreachable!("allocation edges always join a process and a resource"),
        }
    }
}

/// Outgoing edges of one node, produced lazily.
///
/// Returned by [`AllocationGraph::edges_of`][crate::AllocationGraph::edges_of].
/// The sequence is finite and borrows the graph; call `edges_of` again (or
/// `clone()` the iterator) to restart it.
#[derive(Clone, Debug)]
pub enum EdgesOf<'a> {
    /// Requested edges of a process, in FIFO order.
    Requests {
        process: ProcessId,
        iter:    slice::Iter<'a, PendingRequest>,
    },
    /// Held edges of a resource, in first-acquired order.
    Holds {
        resource: ResourceId,
        iter:     slice::Iter<'a, Holding>,
    },
    /// Unknown node.
    Empty,
}

impl Iterator for EdgesOf<'_> {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        match self {
            EdgesOf::Requests { process, iter } => {
                let process = *process;
                iter.find(|req| req.process == process)
                    .map(|req| Edge::requested(process, req.resource, req.count))
            }
            EdgesOf::Holds { resource, iter } => {
                iter.next().map(|h| Edge::held(*resource, h.process, h.count))
            }
            EdgesOf::Empty => None,
        }
    }
}
