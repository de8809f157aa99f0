//! Cycle search over the wait-for graph.

use dl_core::{NodeRef, ProcessId, ResourceId};
use dl_graph::AllocationGraph;

use crate::WaitForGraph;
use crate::reduce::stuck_mask;

/// Outcome of one detection pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Detection {
    pub is_deadlocked: bool,
    /// Alternating `[P, R, P, R, …]`: each process waits for the resource
    /// that follows it, which is held by the next process (wrapping around).
    /// Empty when `is_deadlocked` is false.
    pub cycle: Vec<NodeRef>,
}

impl Detection {
    pub fn none() -> Self {
        Self::default()
    }

    fn from_cycle(cycle: Vec<NodeRef>) -> Self {
        Self { is_deadlocked: true, cycle }
    }

    /// Processes on the cycle, in cycle order.
    pub fn processes(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.cycle.iter().filter_map(|n| n.as_process())
    }

    /// Resources on the cycle, in cycle order.
    pub fn resources(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.cycle.iter().filter_map(|n| n.as_resource())
    }
}

/// Build the wait-for graph for `graph` and search it for a cycle.
///
/// With multi-instance resources a cycle in the wait-for graph is not
/// enough: a holder outside the cycle may still finish and free what a
/// waiter needs.  Only processes left over by graph reduction keep their
/// edges, so any cycle reported is one that can never resolve.
pub fn detect(graph: &AllocationGraph) -> Detection {
    let stuck = stuck_mask(graph);
    if !stuck.contains(&true) {
        return Detection::none();
    }
    let mut wfg = WaitForGraph::build(graph);
    wfg.retain(|p| stuck.get(p.index()).copied().unwrap_or(false));
    find_cycle(&wfg)
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Color {
    White,
    Grey,
    Black,
}

/// One DFS stack entry.  `next` is the index of the next successor to try,
/// so after descending, `next - 1` is the edge that was followed.
struct Frame {
    node: ProcessId,
    next: usize,
}

/// Depth-first search with white/grey/black marking.
///
/// Iterative so that long wait chains cannot overflow the call stack.
/// Returns the first cycle found; roots and successors are visited in a
/// fixed order, so identical graphs always yield identical cycles.
pub fn find_cycle(wfg: &WaitForGraph) -> Detection {
    let n = wfg.process_count();
    let mut color = vec![Color::White; n];
    let mut stack: Vec<Frame> = Vec::new();

    for root in 0..n {
        if color[root] != Color::White {
            continue;
        }
        color[root] = Color::Grey;
        stack.push(Frame { node: ProcessId(root as u32), next: 0 });

        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            match wfg.successors(node).get(frame.next) {
                Some(&(succ, _)) => {
                    frame.next += 1;
                    match color[succ.index()] {
                        Color::White => {
                            color[succ.index()] = Color::Grey;
                            stack.push(Frame { node: succ, next: 0 });
                        }
                        Color::Grey => {
                            return Detection::from_cycle(cycle_from(&stack, succ, wfg));
                        }
                        Color::Black => {}
                    }
                }
                None => {
                    color[node.index()] = Color::Black;
                    stack.pop();
                }
            }
        }
    }

    Detection::none()
}

/// Expand the grey path `start ..= top of stack` into alternating ids.
fn cycle_from(stack: &[Frame], start: ProcessId, wfg: &WaitForGraph) -> Vec<NodeRef> {
    // Grey nodes are exactly the ones on the stack.
    let pos = stack.iter().position(|f| f.node == start).unwrap_or(0);
    stack[pos..]
        .iter()
        .flat_map(|f| {
            let (_, via) = wfg.successors(f.node)[f.next - 1];
            [NodeRef::Process(f.node), NodeRef::Resource(via)]
        })
        .collect()
}
