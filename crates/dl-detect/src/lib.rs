//! `dl-detect`: circular-wait deadlock detection.
//!
//! # Algorithm
//!
//! ```text
//! ① Wait-for graph   : edge A → B (tagged R) when A waits for R, R does not
//!                      have enough free instances for A, and B holds R.
//! ② Reduction        : starting from the free stock, let every process whose
//!                      requests fit finish and return its holdings; only
//!                      the processes left over keep their wait-for edges.
//! ③ DFS              : white/grey/black colouring, roots in ProcessId order,
//!                      successors in insertion order.
//! ④ Cycle            : first back edge to a grey node v: the stack from v to
//!                      the current node, expanded to [P, R, P, R, …].
//! ```
//!
//! Everything here takes `&AllocationGraph`; detection never mutates.
//!
//! | Module        | Contents                                   |
//! |---------------|--------------------------------------------|
//! | [`wait_for`]  | `WaitForGraph`, `WaitEdge`                 |
//! | [`detector`]  | `detect`, `find_cycle`, `Detection`        |
//! | [`reduce`]    | `stuck_processes`                          |
//! | [`explain`]   | `explain`, `describe_cycle`                |

pub mod detector;
pub mod explain;
pub mod reduce;
pub mod wait_for;

#[cfg(test)]
mod tests;

pub use detector::{Detection, detect, find_cycle};
pub use explain::{describe_cycle, explain};
pub use reduce::stuck_processes;
pub use wait_for::{WaitEdge, WaitForGraph};
