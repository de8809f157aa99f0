//! The derived process → process wait-for graph.

use dl_core::{ProcessId, ResourceId};
use dl_graph::AllocationGraph;

/// "`waiter` cannot proceed until `holder` gives back some of `resource`."
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaitEdge {
    pub waiter:   ProcessId,
    pub holder:   ProcessId,
    pub resource: ResourceId,
}

/// Adjacency lists indexed by `ProcessId`.
///
/// Each list holds `(holder, resource)` pairs in the order they were
/// discovered: waiter's requests in FIFO order, then each resource's holders
/// in first-acquired order.  A holder appears at most once per waiter,
/// tagged with the first resource that linked them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WaitForGraph {
    adjacency: Vec<Vec<(ProcessId, ResourceId)>>,
}

impl WaitForGraph {
    pub fn build(graph: &AllocationGraph) -> Self {
        let mut adjacency = vec![Vec::new(); graph.processes().len()];

        for process in graph.processes() {
            let out: &mut Vec<(ProcessId, ResourceId)> = &mut adjacency[process.id.index()];
            for req in graph.pending_of(process.id) {
                let res = &graph.resources()[req.resource.index()];
                if res.available() >= req.count {
                    continue;
                }
                for holding in &res.holders {
                    let holder = holding.process;
                    if holder != process.id && !out.iter().any(|&(h, _)| h == holder) {
                        out.push((holder, req.resource));
                    }
                }
            }
        }

        Self { adjacency }
    }

    /// Drop every edge whose waiter or holder fails `keep`.
    pub fn retain(&mut self, keep: impl Fn(ProcessId) -> bool) {
        for (i, succ) in self.adjacency.iter_mut().enumerate() {
            if keep(ProcessId(i as u32)) {
                succ.retain(|&(holder, _)| keep(holder));
            } else {
                succ.clear();
            }
        }
    }

    /// Number of vertices (processes, including finished ones).
    pub fn process_count(&self) -> usize {
        self.adjacency.len()
    }

    /// `(holder, resource)` pairs `process` is waiting on.
    pub fn successors(&self, process: ProcessId) -> &[(ProcessId, ResourceId)] {
        self.adjacency
            .get(process.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every wait-for edge, waiter order.
    pub fn edges(&self) -> impl Iterator<Item = WaitEdge> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(i, succ)| {
            succ.iter().map(move |&(holder, resource)| WaitEdge {
                waiter: ProcessId(i as u32),
                holder,
                resource,
            })
        })
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.iter().all(Vec::is_empty)
    }
}
