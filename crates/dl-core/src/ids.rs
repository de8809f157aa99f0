//! Strongly typed identifier wrappers.
//!
//! Ids are dense: the n-th process spawned in a scenario is `ProcessId(n)`,
//! and likewise for resources.  That lets the allocation graph index its
//! `Vec`s directly with `id.index()` and makes "insertion order" and "id
//! order" the same thing, which the deadlock detector relies on for
//! deterministic output.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a process in the allocation graph.
    pub struct ProcessId(u32);
}

typed_id! {
    /// Index of a resource type in the allocation graph.
    pub struct ResourceId(u32);
}

// ── NodeRef ───────────────────────────────────────────────────────────────────

/// A vertex of the bipartite allocation graph.
///
/// Edges and deadlock cycles are expressed as sequences of `NodeRef`s so the
/// presentation layer can draw them without knowing which side of the graph
/// each end lives on.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "id", rename_all = "snake_case"))]
pub enum NodeRef {
    Process(ProcessId),
    Resource(ResourceId),
}

impl NodeRef {
    pub fn as_process(self) -> Option<ProcessId> {
        match self {
            NodeRef::Process(p) => Some(p),
            NodeRef::Resource(_) => None,
        }
    }

    pub fn as_resource(self) -> Option<ResourceId> {
        match self {
            NodeRef::Resource(r) => Some(r),
            NodeRef::Process(_) => None,
        }
    }
}

impl From<ProcessId> for NodeRef {
    fn from(p: ProcessId) -> Self {
        NodeRef::Process(p)
    }
}

impl From<ResourceId> for NodeRef {
    fn from(r: ResourceId) -> Self {
        NodeRef::Resource(r)
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Process(p) => p.fmt(f),
            NodeRef::Resource(r) => r.fmt(f),
        }
    }
}
