use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of a single solver invocation.
///
/// Each run flows through: IDLE → WRITING_INPUT → SPAWNED → POLLING → FINISHED,
/// dropping to FAILED from any step that cannot continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayState {
    Idle,
    WritingInput,
    Spawned,
    Polling,
    /// The solver ran to completion; its own verdict may still be a failure.
    Finished,
    Failed,
}

impl GatewayState {
    pub fn is_terminal(self) -> bool {
        matches!(self, GatewayState::Finished | GatewayState::Failed)
    }
}

impl fmt::Display for GatewayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayState::Idle => write!(f, "IDLE"),
            GatewayState::WritingInput => write!(f, "WRITING_INPUT"),
            GatewayState::Spawned => write!(f, "SPAWNED"),
            GatewayState::Polling => write!(f, "POLLING"),
            GatewayState::Finished => write!(f, "FINISHED"),
            GatewayState::Failed => write!(f, "FAILED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_display() {
        assert_eq!(GatewayState::Idle.to_string(), "IDLE");
        assert_eq!(GatewayState::WritingInput.to_string(), "WRITING_INPUT");
        assert_eq!(GatewayState::Spawned.to_string(), "SPAWNED");
        assert_eq!(GatewayState::Polling.to_string(), "POLLING");
        assert_eq!(GatewayState::Finished.to_string(), "FINISHED");
        assert_eq!(GatewayState::Failed.to_string(), "FAILED");
    }

    #[test]
    fn only_finished_and_failed_are_terminal() {
        assert!(GatewayState::Finished.is_terminal());
        assert!(GatewayState::Failed.is_terminal());
        assert!(!GatewayState::Polling.is_terminal());
        assert!(!GatewayState::Idle.is_terminal());
    }
}
