//! Graph reduction: which processes could still run to the end.

use dl_core::{Process, ProcessId, Resource};
use dl_graph::AllocationGraph;

/// Processes that cannot finish in any order, id order.
///
/// Starts with `work` = the free stock of every resource.  Any live process
/// whose pending requests all fit in `work` is assumed to finish and hand
/// back everything it holds; this repeats until nothing changes.  Whatever
/// is left over is stuck.
pub fn stuck_processes(graph: &AllocationGraph) -> Vec<ProcessId> {
    stuck_mask(graph)
        .iter()
        .enumerate()
        .filter(|&(_, &stuck)| stuck)
        .map(|(i, _)| ProcessId(i as u32))
        .collect()
}

/// `stuck[p.index()]` for every process.
pub(crate) fn stuck_mask(graph: &AllocationGraph) -> Vec<bool> {
    let mut work: Vec<u32> = graph.resources().iter().map(Resource::available).collect();
    let mut done: Vec<bool> = graph.processes().iter().map(Process::is_finished).collect();

    loop {
        let mut progressed = false;
        for process in graph.processes() {
            let i = process.id.index();
            if done[i] {
                continue;
            }
            let fits = graph
                .pending_of(process.id)
                .all(|req| work.get(req.resource.index()).is_some_and(|&w| w >= req.count));
            if !fits {
                continue;
            }
            for (resource, count) in graph.holdings_of(process.id) {
                if let Some(w) = work.get_mut(resource.index()) {
                    *w += count;
                }
            }
            done[i] = true;
            progressed = true;
        }
        if !progressed {
            break;
        }
    }

    done.into_iter().map(|d| !d).collect()
}
