//! `AllocationGraph`: processes, resources, and the pending-request queue.

use log::debug;

use dl_core::{CoreError, NodeRef, Priority, Process, ProcessId, ProcessState, Resource, ResourceId};

use crate::{Edge, EdgesOf, GraphError, GraphResult};

// ── Queue entries ─────────────────────────────────────────────────────────────

/// A Requested edge waiting in the FIFO queue.
///
/// `seq` is assigned when the (process, resource) pair first starts waiting;
/// later requests for the same pair add to `count` and keep the original
/// position.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingRequest {
    pub seq:      u64,
    pub process:  ProcessId,
    pub resource: ResourceId,
    pub count:    u32,
}

/// Instances handed to a process, either directly by `allocate` or by the
/// re-grant pass after a release.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grant {
    pub process:  ProcessId,
    pub resource: ResourceId,
    pub count:    u32,
}

// ── AllocationGraph ───────────────────────────────────────────────────────────

/// The live allocation state of one scenario.
///
/// `processes[i].id == ProcessId(i)` and `resources[i].id == ResourceId(i)`
/// always hold; nothing is ever removed, a terminated process just moves to
/// [`ProcessState::Finished`].
///
/// Every mutating method validates its inputs completely before touching any
/// field, so an `Err` return means the graph is unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllocationGraph {
    processes: Vec<Process>,
    resources: Vec<Resource>,
    /// Ascending `seq`.
    pending:   Vec<PendingRequest>,
    next_seq:  u64,
}

impl AllocationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Construction ──────────────────────────────────────────────────────

    /// Add a process in the `Ready` state and return its id.
    pub fn spawn_process(
        &mut self,
        name:        impl Into<String>,
        priority:    Priority,
        burst_ticks: u32,
    ) -> ProcessId {
        let id = ProcessId(self.processes.len() as u32);
        self.processes.push(Process::new(id, name, priority, burst_ticks));
        id
    }

    /// Add a resource with `total` free instances and return its id.
    pub fn add_resource(&mut self, name: impl Into<String>, total: u32) -> GraphResult<ResourceId> {
        if total == 0 {
            return Err(CoreError::ZeroCount.into());
        }
        let id = ResourceId(self.resources.len() as u32);
        self.resources.push(Resource::new(id, name, total));
        Ok(id)
    }

    // ── Read access ───────────────────────────────────────────────────────

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Every Requested edge in FIFO order.
    pub fn pending(&self) -> &[PendingRequest] {
        &self.pending
    }

    pub fn process(&self, id: ProcessId) -> GraphResult<&Process> {
        self.processes
            .get(id.index())
            .ok_or(GraphError::Core(CoreError::ProcessNotFound(id)))
    }

    pub fn resource(&self, id: ResourceId) -> GraphResult<&Resource> {
        self.resources
            .get(id.index())
            .ok_or(GraphError::Core(CoreError::ResourceNotFound(id)))
    }

    /// Free instances of `resource`.
    pub fn available(&self, resource: ResourceId) -> GraphResult<u32> {
        self.resource(resource).map(Resource::available)
    }

    /// Instances of `resource` held by `process`; 0 for unknown ids.
    pub fn held(&self, process: ProcessId, resource: ResourceId) -> u32 {
        self.resources
            .get(resource.index())
            .map_or(0, |r| r.held_by(process))
    }

    /// Instances of `resource` that `process` is waiting for; 0 if none.
    pub fn requested(&self, process: ProcessId, resource: ResourceId) -> u32 {
        self.pending
            .iter()
            .find(|req| req.process == process && req.resource == resource)
            .map_or(0, |req| req.count)
    }

    /// Pending requests of one process, FIFO order.
    pub fn pending_of(&self, process: ProcessId) -> impl Iterator<Item = &PendingRequest> + '_ {
        self.pending.iter().filter(move |req| req.process == process)
    }

    /// `(resource, count)` for every resource `process` holds, resource order.
    pub fn holdings_of(&self, process: ProcessId) -> impl Iterator<Item = (ResourceId, u32)> + '_ {
        self.resources.iter().filter_map(move |r| {
            let n = r.held_by(process);
            (n > 0).then_some((r.id, n))
        })
    }

    /// `true` if `process` has at least one pending request.
    pub fn is_waiting(&self, process: ProcessId) -> bool {
        self.pending.iter().any(|req| req.process == process)
    }

    // ── Edges ─────────────────────────────────────────────────────────────

    /// Outgoing edges of `node`: a process's Requested edges or a resource's
    /// Held edges.  Unknown nodes yield nothing.
    pub fn edges_of(&self, node: NodeRef) -> EdgesOf<'_> {
        match node {
            NodeRef::Process(p) if p.index() < self.processes.len() => EdgesOf::Requests {
                process: p,
                iter:    self.pending.iter(),
            },
            NodeRef::Resource(r) => match self.resources.get(r.index()) {
                Some(res) => EdgesOf::Holds { resource: r, iter: res.holders.iter() },
                None => EdgesOf::Empty,
            },
            NodeRef::Process(_) => EdgesOf::Empty,
        }
    }

    /// Every edge: Held edges in resource order, then Requested edges in
    /// FIFO order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.resources
            .iter()
            .flat_map(|r| self.edges_of(NodeRef::Resource(r.id)))
            .chain(
                self.pending
                    .iter()
                    .map(|req| Edge::requested(req.process, req.resource, req.count)),
            )
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Overwrite a process's logical state.
    pub fn set_state(&mut self, process: ProcessId, state: ProcessState) -> GraphResult<()> {
        let p = self
            .processes
            .get_mut(process.index())
            .ok_or(GraphError::Core(CoreError::ProcessNotFound(process)))?;
        p.state = state;
        Ok(())
    }

    /// Grant `count` instances immediately, or fail without side effects.
    ///
    /// Never grants partially: if fewer than `count` instances are free
    /// (including when `count` exceeds the resource's total) the result is
    /// [`GraphError::InsufficientResource`].
    pub fn allocate(&mut self, process: ProcessId, resource: ResourceId, count: u32) -> GraphResult<Grant> {
        self.check_live(process, resource, count)?;
        let res = &self.resources[resource.index()];
        let available = res.available();
        if count > available {
            return Err(GraphError::InsufficientResource {
                process,
                resource,
                requested: count,
                available,
            });
        }
        self.check_claim(process, resource, count)?;

        self.resources[resource.index()].grant(process, count);
        debug!("{process} allocated {count} of {resource}");
        Ok(Grant { process, resource, count })
    }

    /// Record that `process` is waiting for `count` more instances.
    ///
    /// Availability is not touched.  Fails only with
    /// [`GraphError::ExceedsCapacity`] when the pair's held + requested total
    /// would exceed the resource's total, since such a request could never be
    /// satisfied.
    pub fn request(&mut self, process: ProcessId, resource: ResourceId, count: u32) -> GraphResult<()> {
        self.check_live(process, resource, count)?;
        self.check_claim(process, resource, count)?;

        match self
            .pending
            .iter_mut()
            .find(|req| req.process == process && req.resource == resource)
        {
            Some(req) => req.count += count,
            None => {
                self.pending.push(PendingRequest {
                    seq: self.next_seq,
                    process,
                    resource,
                    count,
                });
                self.next_seq += 1;
            }
        }
        debug!("{process} waits for {count} of {resource}");
        Ok(())
    }

    /// Return `count` instances and hand freed stock to waiting processes.
    ///
    /// Pending requests for `resource` are scanned in FIFO order and every
    /// one that can now be fully satisfied is granted.  Returns those grants.
    pub fn release(&mut self, process: ProcessId, resource: ResourceId, count: u32) -> GraphResult<Vec<Grant>> {
        self.check_live(process, resource, count)?;
        let res = &mut self.resources[resource.index()];
        let held = res.held_by(process);
        if !res.take_back(process, count) {
            return Err(GraphError::OverRelease {
                process,
                resource,
                requested: count,
                held,
            });
        }
        debug!("{process} released {count} of {resource}");
        Ok(self.regrant(resource))
    }

    /// Finish `process`: drop its pending requests, release everything it
    /// holds (re-granting per resource, resource order) and mark it
    /// `Finished`.
    pub fn terminate(&mut self, process: ProcessId) -> GraphResult<Vec<Grant>> {
        let p = self.process(process)?;
        if p.is_finished() {
            return Err(CoreError::ProcessFinished(process).into());
        }

        self.pending.retain(|req| req.process != process);

        let held: Vec<(ResourceId, u32)> = self.holdings_of(process).collect();
        for &(resource, count) in &held {
            self.resources[resource.index()].take_back(process, count);
        }
        let grants = held
            .into_iter()
            .flat_map(|(resource, _)| self.regrant(resource))
            .collect();

        self.processes[process.index()].state = ProcessState::Finished;
        debug!("{process} terminated");
        Ok(grants)
    }

    // ── Invariants ────────────────────────────────────────────────────────

    /// Verify the capacity invariants listed in the crate docs.
    pub fn check_invariants(&self) -> GraphResult<()> {
        for r in &self.resources {
            let held = r.held_total();
            if held > r.total {
                return Err(GraphError::InvariantViolated(format!(
                    "{} holds {held} of {} instances",
                    r.id, r.total
                )));
            }
            for h in &r.holders {
                let claimed = h.count + self.requested(h.process, r.id);
                if claimed > r.total {
                    return Err(GraphError::InvariantViolated(format!(
                        "{} claims {claimed} of {} ({} instances)",
                        h.process, r.id, r.total
                    )));
                }
            }
        }
        for req in &self.pending {
            let total = self.resources[req.resource.index()].total;
            if req.count == 0 || req.count + self.held(req.process, req.resource) > total {
                return Err(GraphError::InvariantViolated(format!(
                    "{} has an invalid request for {} of {}",
                    req.process, req.count, req.resource
                )));
            }
        }
        for p in self.processes.iter().filter(|p| p.is_finished()) {
            if self.holdings_of(p.id).next().is_some() || self.is_waiting(p.id) {
                return Err(GraphError::InvariantViolated(format!(
                    "finished {} still holds or requests resources",
                    p.id
                )));
            }
        }
        Ok(())
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn check_live(&self, process: ProcessId, resource: ResourceId, count: u32) -> GraphResult<()> {
        if self.process(process)?.is_finished() {
            return Err(CoreError::ProcessFinished(process).into());
        }
        self.resource(resource)?;
        if count == 0 {
            return Err(CoreError::ZeroCount.into());
        }
        Ok(())
    }

    fn check_claim(&self, process: ProcessId, resource: ResourceId, count: u32) -> GraphResult<()> {
        let total = self.resources[resource.index()].total;
        let claimed = self.held(process, resource) + self.requested(process, resource) + count;
        if claimed > total {
            return Err(GraphError::ExceedsCapacity { process, resource, claimed, total });
        }
        Ok(())
    }

    /// Grant every pending request for `resource` that fits, FIFO order.
    fn regrant(&mut self, resource: ResourceId) -> Vec<Grant> {
        let mut grants = Vec::new();
        let res = &mut self.resources[resource.index()];
        self.pending.retain(|req| {
            if req.resource != resource || req.count > res.available() {
                return true;
            }
            res.grant(req.process, req.count);
            grants.push(Grant {
                process:  req.process,
                resource: req.resource,
                count:    req.count,
            });
            false
        });
        for g in &grants {
            debug!("{} granted {} of {} after release", g.process, g.count, g.resource);
        }
        grants
    }
}
