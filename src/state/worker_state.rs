/// Worker state definitions for tracking task progress
///
/// Every worker walks each task it leases through the same cycle:
///
/// ```text
/// Idle -> Delaying -> Fetching -> Extracting -> Reporting -> Idle
///                        |                        ^
///                        +------- (failure) ------+
/// ```
///
/// Any state may fall back to `Idle` when a task is interrupted.
use crate::KumoError;
use std::fmt;

/// Represents what a worker is currently doing with its task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkerState {
    /// Waiting for a task from the frontier
    #[default]
    Idle,

    /// Sleeping for the politeness delay before a fetch
    Delaying,

    /// Waiting on the fetcher
    Fetching,

    /// Extracting page data and admitting discovered links
    Extracting,

    /// Updating statistics and handing results to the sink
    Reporting,
}

impl WorkerState {
    /// Returns true if a worker in this state holds a task
    pub fn is_busy(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Returns true if moving from this state to `next` is part of the cycle
    pub fn can_transition_to(&self, next: WorkerState) -> bool {
        matches!(
            (self, next),
            (_, Self::Idle)
                | (Self::Idle, Self::Delaying)
                | (Self::Delaying, Self::Fetching)
                | (Self::Fetching, Self::Extracting)
                | (Self::Fetching, Self::Reporting)
                | (Self::Extracting, Self::Reporting)
        )
    }

    /// Moves to `next`, rejecting transitions outside the cycle
    ///
    /// # Returns
    ///
    /// * `Ok(WorkerState)` - The new state
    /// * `Err(KumoError::InvalidTransition)` - The transition is not allowed
    pub fn transition(self, next: WorkerState) -> Result<WorkerState, KumoError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(KumoError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Delaying => "delaying",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Reporting => "reporting",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_cycle() {
        let state = WorkerState::Idle
            .transition(WorkerState::Delaying)
            .and_then(|s| s.transition(WorkerState::Fetching))
            .and_then(|s| s.transition(WorkerState::Extracting))
            .and_then(|s| s.transition(WorkerState::Reporting))
            .and_then(|s| s.transition(WorkerState::Idle))
            .unwrap();
        assert_eq!(state, WorkerState::Idle);
    }

    #[test]
    fn test_failure_skips_extracting() {
        assert!(WorkerState::Fetching.can_transition_to(WorkerState::Reporting));
    }

    #[test]
    fn test_interrupt_from_any_state() {
        for state in [
            WorkerState::Idle,
            WorkerState::Delaying,
            WorkerState::Fetching,
            WorkerState::Extracting,
            WorkerState::Reporting,
        ] {
            assert!(state.can_transition_to(WorkerState::Idle), "{}", state);
        }
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!WorkerState::Idle.can_transition_to(WorkerState::Fetching));
        assert!(!WorkerState::Delaying.can_transition_to(WorkerState::Extracting));
        assert!(!WorkerState::Reporting.can_transition_to(WorkerState::Fetching));
        assert!(!WorkerState::Extracting.can_transition_to(WorkerState::Delaying));

        let err = WorkerState::Idle
            .transition(WorkerState::Reporting)
            .unwrap_err();
        assert!(matches!(
            err,
            KumoError::InvalidTransition {
                from: WorkerState::Idle,
                to: WorkerState::Reporting
            }
        ));
    }

    #[test]
    fn test_is_busy() {
        assert!(!WorkerState::Idle.is_busy());
        assert!(WorkerState::Delaying.is_busy());
        assert!(WorkerState::Reporting.is_busy());
    }

    #[test]
    fn test_display() {
        assert_eq!(WorkerState::Idle.to_string(), "idle");
        assert_eq!(format!("{}", WorkerState::Extracting), "extracting");
    }
}
