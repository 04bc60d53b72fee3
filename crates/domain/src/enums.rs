use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a liquidity pool currently has issued shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolStatus {
    Active,
    Inactive,
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolStatus::Active => f.write_str("Active"),
            PoolStatus::Inactive => f.write_str("Inactive"),
        }
    }
}

/// Lifecycle of a single aggregation run.
///
/// `Idle -> Fetching -> Rendered | Failed`. There is no retry edge; a new run
/// starts from `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Fetching,
    Rendered,
    Failed(String),
}

impl RunState {
    /// Moves `Idle` to `Fetching`. Other states are left untouched.
    pub fn start(&mut self) -> bool {
        if *self == RunState::Idle {
            *self = RunState::Fetching;
            true
        } else {
            false
        }
    }

    /// Moves `Fetching` to `Rendered`.
    pub fn succeed(&mut self) -> bool {
        if *self == RunState::Fetching {
            *self = RunState::Rendered;
            true
        } else {
            false
        }
    }

    /// Moves `Fetching` to `Failed`.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if *self == RunState::Fetching {
            *self = RunState::Failed(message.into());
            true
        } else {
            false
        }
    }

    /// Returns true once the run reached `Rendered` or `Failed`.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, RunState::Rendered | RunState::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_state_success_path() {
        let mut state = RunState::default();
        assert!(!state.succeed());
        assert!(state.start());
        assert!(state.succeed());
        assert_eq!(state, RunState::Rendered);
        assert!(state.is_finished());
    }

    #[test]
    fn test_pool_status_wire_names() {
        assert_eq!(serde_json::to_value(PoolStatus::Active).unwrap(), "active");
        let status: PoolStatus = serde_json::from_str(r#""inactive""#).unwrap();
        assert_eq!(status, PoolStatus::Inactive);
        assert_eq!(status.to_string(), "Inactive");
    }

    #[test]
    fn test_run_state_failure_is_terminal() {
        let mut state = RunState::default();
        state.start();
        assert!(state.fail("horizon down"));
        assert!(!state.start());
        assert!(!state.succeed());
        assert_eq!(state, RunState::Failed("horizon down".to_string()));
    }
}
