//! Plain data row types written by output backends.

/// One applied scenario step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepLogRow {
    /// 1-based: the number of steps applied including this one.
    pub step:        usize,
    /// `StepOutcome::kind`, e.g. `granted` or `waiting`.
    pub outcome:     String,
    /// Display name; empty when the step has no process.
    pub process:     String,
    /// Display name; empty when the step has no resource.
    pub resource:    String,
    pub status:      String,
    pub state:       String,
    pub deadlocked:  bool,
    /// `"P1 → R2 → P2 → R1"`; empty unless deadlocked.
    pub cycle:       String,
    pub explanation: String,
}

/// Usage of one resource after a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUsageRow {
    pub step:      usize,
    pub resource:  String,
    pub total:     u32,
    pub held:      u32,
    pub available: u32,
    /// Sum of pending request counts for this resource.
    pub requested: u32,
}
