use std::fmt;

/// Controller state machine:
///
/// ```text
/// Init → Starting → Running → ShuttingDown → Stopped
///            └──────────┴──→ Failed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Init,
    /// Opening the resource and binding the listener.
    Starting,
    /// Listener accepting connections.
    Running,
    /// Listener stopped accepting, in-flight requests draining.
    ShuttingDown,
    /// Drain finished and the resource was released.
    Stopped,
    /// Terminal fatal state.
    Failed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::Starting => "starting",
            Phase::Running => "running",
            Phase::ShuttingDown => "shutting_down",
            Phase::Stopped => "stopped",
            Phase::Failed => "failed",
        }
    }

    /// True once the controller can no longer change phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Stopped | Phase::Failed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
