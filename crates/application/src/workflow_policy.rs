/// Workflow rules the store is not able to decide on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowPolicy {
    /// Allows at most one Active sprint per project.
    pub enforce_single_active_sprint: bool,
    /// Rejects dependency edges that would close a cycle.
    pub reject_dependency_cycles: bool,
}

impl Default for WorkflowPolicy {
    fn default() -> Self {
        Self {
            enforce_single_active_sprint: true,
            reject_dependency_cycles: true,
        }
    }
}
